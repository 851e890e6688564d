//! One-time normalization of raw rows into [`TransactionRow`]s.
//!
//! All cell-level defaulting happens here so the aggregation pipeline can
//! assume clean inputs:
//!   - missing category        -> "Unknown"
//!   - missing/non-numeric cost  -> 0
//!   - missing/non-numeric sales -> 0
//!   - unparseable order date  -> None
//!   - missing id              -> 1-based data row number

use super::error::{LoadError, Result};
use super::reader::{RawTable, RawValue};
use crate::models::{TransactionRow, UNKNOWN_CATEGORY};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// Source column names.
pub mod columns {
    pub const ID: &str = "id";
    pub const ORDER_DATE: &str = "order_date";
    pub const CATEGORY: &str = "category";
    pub const SALES: &str = "after_discount";
    pub const COGS: &str = "cogs";
    pub const PRODUCT_ID: &str = "sku_id";
    pub const PRODUCT_NAME: &str = "sku_name";
}

/// Counts of cells that fell back to a default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub missing_category: usize,
    pub defaulted_sales: usize,
    pub defaulted_cogs: usize,
    pub undated: usize,
}

#[derive(Debug)]
struct ColumnMap {
    id: usize,
    order_date: usize,
    category: Option<usize>,
    sales: usize,
    cogs: usize,
    product_id: usize,
    product_name: usize,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        Ok(Self {
            id: require(columns::ID)?,
            order_date: require(columns::ORDER_DATE)?,
            category: find(columns::CATEGORY),
            sales: require(columns::SALES)?,
            cogs: require(columns::COGS)?,
            product_id: require(columns::PRODUCT_ID)?,
            product_name: require(columns::PRODUCT_NAME)?,
        })
    }
}

/// Convert a raw table into normalized rows.
pub fn normalize(table: &RawTable) -> Result<(Vec<TransactionRow>, NormalizeStats)> {
    let map = ColumnMap::resolve(&table.headers)?;
    let mut stats = NormalizeStats::default();
    let empty = RawValue::Empty;

    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let cell = |i: usize| raw.get(i).unwrap_or(&empty);

            let category = map.category.and_then(|i| as_text(cell(i))).unwrap_or_else(|| {
                stats.missing_category += 1;
                UNKNOWN_CATEGORY.to_string()
            });

            let sales_value = as_number(cell(map.sales)).unwrap_or_else(|| {
                stats.defaulted_sales += 1;
                0.0
            });

            let cogs = as_number(cell(map.cogs)).unwrap_or_else(|| {
                stats.defaulted_cogs += 1;
                0.0
            });

            let order_date = as_datetime(cell(map.order_date));
            if order_date.is_none() {
                stats.undated += 1;
            }

            TransactionRow {
                id: as_text(cell(map.id)).unwrap_or_else(|| (idx + 1).to_string()),
                order_date,
                category,
                sales_value,
                cogs,
                product_id: as_text(cell(map.product_id)).unwrap_or_default(),
                product_name: as_text(cell(map.product_name)).unwrap_or_default(),
            }
        })
        .collect();

    debug!(
        "Defaults applied: {} categories, {} sales, {} costs; {} rows undated",
        stats.missing_category, stats.defaulted_sales, stats.defaulted_cogs, stats.undated
    );

    Ok((rows, stats))
}

/// Interpret a cell as text. Whole numbers drop the fractional part so
/// numeric ids read as `"42"`, not `"42.0"`.
fn as_text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Empty => None,
        RawValue::Text(s) => Some(s.clone()),
        RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{:.0}", n)),
        RawValue::Number(n) => Some(n.to_string()),
        RawValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

/// Interpret a cell as a finite number.
fn as_number(value: &RawValue) -> Option<f64> {
    let n = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        RawValue::Empty | RawValue::DateTime(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Interpret a cell as a timestamp.
fn as_datetime(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::DateTime(dt) => Some(*dt),
        RawValue::Text(s) => parse_datetime_str(s),
        RawValue::Empty | RawValue::Number(_) => None,
    }
}

/// Parse an ISO-like date or datetime string.
pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
