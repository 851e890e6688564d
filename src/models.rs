//! Data models for the sales dashboard.
//!
//! This module contains the core data structures used throughout
//! the application: normalized transaction rows, the filter selection,
//! and the summaries produced by the aggregation pipeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Category label used when a row has none.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A single normalized sales record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Row identifier (unique per row).
    pub id: String,
    /// Order timestamp, `None` when missing or unparseable.
    pub order_date: Option<NaiveDateTime>,
    /// Category label, `"Unknown"` when absent.
    pub category: String,
    /// Net sales value after discount.
    pub sales_value: f64,
    /// Cost of goods sold.
    pub cogs: f64,
    /// Product (SKU) identifier.
    pub product_id: String,
    /// Product (SKU) name.
    pub product_name: String,
}

impl TransactionRow {
    /// Net profit, always derived from sales value and cost.
    pub fn net_profit(&self) -> f64 {
        self.sales_value - self.cogs
    }

    /// Calendar date of the order, if known.
    pub fn order_day(&self) -> Option<NaiveDate> {
        self.order_date.map(|dt| dt.date())
    }
}

/// The immutable dataset loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Where the rows were read from.
    pub source: PathBuf,
    /// Normalized rows in source order.
    pub rows: Vec<TransactionRow>,
}

impl Dataset {
    pub fn new(source: PathBuf, rows: Vec<TransactionRow>) -> Self {
        Self { source, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// User-selected date range and category subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive lower bound on the order date.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound on the order date.
    pub end: Option<NaiveDate>,
    /// Selected categories. Empty means no restriction.
    pub categories: BTreeSet<String>,
}

impl FilterSpec {
    /// Whether the row's order date falls inside the range.
    ///
    /// Rows without a date only pass when no bound is set.
    pub fn matches_date(&self, row: &TransactionRow) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }

        let Some(day) = row.order_day() else {
            return false;
        };

        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }

    /// Whether the row's category is selected.
    pub fn matches_category(&self, row: &TransactionRow) -> bool {
        category_selected(&self.categories, &row.category)
    }

    /// Both date and category restrictions.
    pub fn matches(&self, row: &TransactionRow) -> bool {
        self.matches_date(row) && self.matches_category(row)
    }
}

/// Membership test where an empty selection admits everything.
pub fn category_selected(selection: &BTreeSet<String>, category: &str) -> bool {
    selection.is_empty() || selection.contains(category)
}

/// Aggregated metrics for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub sales_value: f64,
    pub net_profit: f64,
    pub transactions: usize,
    /// Average order value; 0 when there are no transactions.
    pub aov: f64,
}

/// Dataset-wide totals after filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Mean of the per-category AOVs (not total sales / transactions).
    pub avg_aov: f64,
    pub transactions: usize,
}

/// Aggregated metrics for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub product_name: String,
    pub sales_value: f64,
    pub transactions: usize,
}

/// One month of the sales/profit trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// Last day of the month.
    pub month: NaiveDate,
    pub sales_value: f64,
    pub net_profit: f64,
}

/// Metadata about a generated dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetadata {
    /// Dashboard title.
    pub title: String,
    /// Path of the source dataset.
    pub source: String,
    /// When the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Rows in the source dataset.
    pub rows_loaded: usize,
    /// Effective date range shown.
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Currency prefix used for rendering.
    pub currency_prefix: String,
}

/// Everything needed to render a dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub metadata: DashboardMetadata,
    pub filter: FilterSpec,
    pub totals: Totals,
    /// Category summary, already truncated to top-N.
    pub categories: Vec<CategorySummary>,
    /// Monthly trend; `None` when the section is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Vec<MonthlyPoint>>,
    /// Top products; `None` when the section is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductSummary>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: Option<&str>, category: &str) -> TransactionRow {
        TransactionRow {
            id: "1".to_string(),
            order_date: date.map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .unwrap()
                    .and_hms_opt(15, 30, 0)
                    .unwrap()
            }),
            category: category.to_string(),
            sales_value: 100.0,
            cogs: 40.0,
            product_id: "P1".to_string(),
            product_name: "Widget".to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_net_profit_is_derived() {
        let mut r = row(None, "A");
        assert_eq!(r.net_profit(), 60.0);
        r.cogs = 0.0;
        assert_eq!(r.net_profit(), 100.0);
    }

    #[test]
    fn test_date_bounds_are_inclusive_by_day() {
        let filter = FilterSpec {
            start: Some(day("2023-01-05")),
            end: Some(day("2023-01-05")),
            categories: BTreeSet::new(),
        };
        // 15:30 on the end date is still inside the range
        assert!(filter.matches_date(&row(Some("2023-01-05"), "A")));
        assert!(!filter.matches_date(&row(Some("2023-01-06"), "A")));
        assert!(!filter.matches_date(&row(Some("2023-01-04"), "A")));
    }

    #[test]
    fn test_undated_rows() {
        let open = FilterSpec::default();
        assert!(open.matches_date(&row(None, "A")));

        let bounded = FilterSpec {
            start: Some(day("2023-01-01")),
            ..FilterSpec::default()
        };
        assert!(!bounded.matches_date(&row(None, "A")));
    }

    #[test]
    fn test_category_selection() {
        let mut filter = FilterSpec::default();
        assert!(filter.matches_category(&row(None, "A")));

        filter.categories.insert("B".to_string());
        assert!(!filter.matches_category(&row(None, "A")));
        assert!(filter.matches_category(&row(None, "B")));
    }
}
