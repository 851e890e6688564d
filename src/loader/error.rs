//! Errors raised while loading the source dataset.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file format: {} (expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Spreadsheet error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet is empty (no header row): {0}")]
    EmptySheet(String),

    #[error("Required column missing: {0}")]
    MissingColumn(&'static str),
}

pub type Result<T> = std::result::Result<T, LoadError>;
