//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// SalesDash - sales performance dashboards from spreadsheet exports
///
/// Loads a sales dataset, filters it by order date and category, and
/// renders KPI totals, a per-category summary, a monthly trend and the
/// top products as Markdown or JSON.
///
/// Examples:
///   salesdash --data sales.xlsx
///   salesdash --data sales.csv --start 2022-01-01 --end 2022-06-30
///   salesdash --category "Beauty & Grooming,Books" --top-n 5 --format json
///   salesdash --list-categories
///   salesdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset to load (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
    ///
    /// Defaults to the path in .salesdash.toml.
    #[arg(short, long, value_name = "FILE", env = "SALESDASH_DATA")]
    pub data: Option<PathBuf>,

    /// Worksheet name or 0-based index (spreadsheets only)
    #[arg(long, value_name = "SHEET")]
    pub sheet: Option<String>,

    /// First order date to include (YYYY-MM-DD, inclusive)
    ///
    /// Defaults to the earliest order date in the dataset.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last order date to include (YYYY-MM-DD, inclusive)
    ///
    /// Defaults to the latest order date in the dataset.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Categories to include (comma-separated)
    ///
    /// Example: --category "Books,Beauty & Grooming". All categories when omitted.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub category: Option<Vec<String>>,

    /// Show the top N categories by sales
    #[arg(short = 'n', long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Number of products in the top products table
    #[arg(long, value_name = "N")]
    pub product_limit: Option<usize>,

    /// Currency prefix for rendered amounts (e.g. "Rp", "$")
    #[arg(long, value_name = "PREFIX")]
    pub currency: Option<String>,

    /// Omit the monthly trend section
    #[arg(long)]
    pub no_trend: bool,

    /// Omit the top products section
    #[arg(long)]
    pub no_products: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .salesdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no spinner)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the categories found in the dataset and exit
    #[arg(long)]
    pub list_categories: bool,

    /// Generate a default .salesdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(format!(
                    "Start date {} is after end date {}",
                    start, end
                ));
            }
        }

        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        if self.product_limit == Some(0) {
            return Err("Product limit must be at least 1".to_string());
        }

        if let Some(ref categories) = self.category {
            if categories.iter().any(|c| c.trim().is_empty()) {
                return Err("Category names must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args::parse_from(["salesdash", "--data", "sales.csv"])
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_filters() {
        let args = Args::parse_from([
            "salesdash",
            "--start",
            "2023-01-01",
            "--end",
            "2023-03-31",
            "--category",
            "Books,Beauty & Grooming",
            "-n",
            "5",
            "--format",
            "json",
        ]);

        assert_eq!(args.start, Some(day("2023-01-01")));
        assert_eq!(args.end, Some(day("2023-03-31")));
        assert_eq!(
            args.category,
            Some(vec!["Books".to_string(), "Beauty & Grooming".to_string()])
        );
        assert_eq!(args.top_n, Some(5));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_invalid_date_rejected_by_parser() {
        let result = Args::try_parse_from(["salesdash", "--start", "01/13/2023"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_inverted_range() {
        let mut args = make_args();
        args.start = Some(day("2023-05-01"));
        args.end = Some(day("2023-04-01"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_top_n() {
        let mut args = make_args();
        args.top_n = Some(0);
        assert!(args.validate().is_err());

        args.top_n = Some(1);
        args.product_limit = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
