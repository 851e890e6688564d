//! Dataset loading.
//!
//! Reads the source file once, normalizes every row and hands back an
//! immutable [`Dataset`] that the rest of the program borrows.

pub mod error;
pub mod normalize;
pub mod reader;

pub use error::LoadError;

use crate::models::Dataset;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Options for loading a dataset.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Worksheet name or 0-based index (spreadsheets only).
    pub sheet: Option<String>,
    /// Whether to show a spinner while reading.
    pub show_progress: bool,
}

/// Load and normalize the dataset at `path`.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    info!("Loading dataset: {}", path.display());

    let spinner = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Reading {}", path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = reader::read_table(path, options.sheet.as_deref())
        .and_then(|table| normalize::normalize(&table));

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let (rows, stats) = result?;

    if stats.undated > 0 {
        warn!(
            "{} rows have no usable order date and are excluded from date-range filters",
            stats.undated
        );
    }

    info!("Loaded {} rows from {}", rows.len(), path.display());

    Ok(Dataset::new(path.to_path_buf(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_dataset() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,order_date,category,after_discount,cogs,sku_id,sku_name").unwrap();
        writeln!(file, "1,2023-01-05,A,100,40,P1,Pen").unwrap();
        writeln!(file, "2,2023-02-10,A,50,10,P2,Pad").unwrap();
        writeln!(file, "3,2023-01-20,B,200,150,P3,Bag").unwrap();
        file.flush().unwrap();

        let dataset = load_dataset(file.path(), &LoadOptions::default()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.source, file.path());
        assert_eq!(dataset.rows[2].category, "B");
        assert_eq!(dataset.rows[2].net_profit(), 50.0);
    }

    #[test]
    fn test_load_csv_with_latin1_byte() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,order_date,category,after_discount,cogs,sku_id,sku_name").unwrap();
        file.write_all(b"1,2023-01-05,Caf\xE9,100,40,P1,Pen\n").unwrap();
        file.flush().unwrap();

        let dataset = load_dataset(file.path(), &LoadOptions::default()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows[0].category, "Caf\u{FFFD}");
        assert_eq!(dataset.rows[0].net_profit(), 60.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_dataset(Path::new("does-not-exist.xlsx"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert!(err.to_string().contains("does-not-exist.xlsx"));
    }
}
