//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.salesdash.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".salesdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Default filter settings.
    #[serde(default)]
    pub filters: FiltersConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the dataset (spreadsheet or CSV).
    #[serde(default = "default_data_path")]
    pub path: String,

    /// Worksheet name or 0-based index.
    #[serde(default)]
    pub sheet: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            sheet: None,
        }
    }
}

fn default_data_path() -> String {
    "Copy of finalProj_df.xlsx".to_string()
}

/// Default filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Number of categories shown, ranked by sales.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Number of products in the product ranking.
    #[serde(default = "default_product_limit")]
    pub product_limit: usize,

    /// Categories selected by default. Empty selects all.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            product_limit: default_product_limit(),
            categories: Vec::new(),
        }
    }
}

fn default_top_n() -> usize {
    12
}

fn default_product_limit() -> usize {
    crate::analysis::DEFAULT_PRODUCT_LIMIT
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dashboard title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Prefix for currency values (e.g. "Rp", "$"). May be empty.
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,

    /// Include the monthly trend section.
    #[serde(default = "default_true")]
    pub include_trend: bool,

    /// Include the top products section.
    #[serde(default = "default_true")]
    pub include_products: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            currency_prefix: default_currency_prefix(),
            include_trend: true,
            include_products: true,
        }
    }
}

fn default_title() -> String {
    "Campaign Performance Dashboard".to_string()
}

fn default_currency_prefix() -> String {
    "Rp".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.display().to_string();
        }
        if let Some(ref sheet) = args.sheet {
            self.data.sheet = Some(sheet.clone());
        }

        if let Some(top_n) = args.top_n {
            self.filters.top_n = top_n;
        }
        if let Some(limit) = args.product_limit {
            self.filters.product_limit = limit;
        }
        if let Some(ref categories) = args.category {
            self.filters.categories = categories.clone();
        }

        if let Some(ref currency) = args.currency {
            self.report.currency_prefix = currency.clone();
        }
        if args.no_trend {
            self.report.include_trend = false;
        }
        if args.no_products {
            self.report.include_products = false;
        }
    }

    /// Check values that serde cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.filters.top_n == 0 {
            anyhow::bail!("filters.top_n must be at least 1");
        }
        if self.filters.product_limit == 0 {
            anyhow::bail!("filters.product_limit must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
