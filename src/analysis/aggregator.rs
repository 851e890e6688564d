//! Sales aggregation and statistics.
//!
//! This module turns normalized transaction rows into category summaries,
//! dataset totals, product rankings and a monthly trend. Every function is a
//! pure projection of its inputs.

use crate::models::{
    category_selected, CategorySummary, Dataset, FilterSpec, MonthlyPoint, ProductSummary,
    Totals,
};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Default number of products in the product ranking.
pub const DEFAULT_PRODUCT_LIMIT: usize = 10;

#[derive(Debug, Default)]
struct Bucket {
    sales_value: f64,
    net_profit: f64,
    transactions: usize,
}

/// Average order value with a zero guard.
pub fn average_order_value(sales_value: f64, transactions: usize) -> f64 {
    if transactions > 0 {
        sales_value / transactions as f64
    } else {
        0.0
    }
}

/// Filter, group by category and compute totals.
///
/// The summary is sorted by sales value (highest first), ties broken by
/// category label ascending. It is not truncated; see [`top_n`].
pub fn summarize(dataset: &Dataset, filter: &FilterSpec) -> (Vec<CategorySummary>, Totals) {
    let mut groups: BTreeMap<&str, Bucket> = BTreeMap::new();
    let mut matched = 0usize;

    for row in dataset.rows.iter().filter(|r| filter.matches(r)) {
        let bucket = groups.entry(row.category.as_str()).or_default();
        bucket.sales_value += row.sales_value;
        bucket.net_profit += row.net_profit();
        bucket.transactions += 1;
        matched += 1;
    }

    let mut summary: Vec<CategorySummary> = groups
        .into_iter()
        .map(|(category, b)| CategorySummary {
            category: category.to_string(),
            sales_value: b.sales_value,
            net_profit: b.net_profit,
            transactions: b.transactions,
            aov: average_order_value(b.sales_value, b.transactions),
        })
        .collect();

    // Stable sort keeps the ascending category order from the BTreeMap for ties
    summary.sort_by(|a, b| b.sales_value.total_cmp(&a.sales_value));

    let totals = compute_totals(&summary);

    debug!(
        "Summarized {} of {} rows into {} categories",
        matched,
        dataset.len(),
        summary.len()
    );

    (summary, totals)
}

/// Totals over a category summary.
///
/// `avg_aov` is the mean of the per-category AOVs, not a weighted ratio.
pub fn compute_totals(summary: &[CategorySummary]) -> Totals {
    if summary.is_empty() {
        return Totals::default();
    }

    let total_sales = summary.iter().map(|c| c.sales_value).sum();
    let total_profit = summary.iter().map(|c| c.net_profit).sum();
    let transactions = summary.iter().map(|c| c.transactions).sum();
    let avg_aov = summary.iter().map(|c| c.aov).sum::<f64>() / summary.len() as f64;

    Totals {
        total_sales,
        total_profit,
        avg_aov,
        transactions,
    }
}

/// Get the first `n` entries of an already sorted summary.
pub fn top_n(summary: &[CategorySummary], n: usize) -> Vec<CategorySummary> {
    summary.iter().take(n).cloned().collect()
}

/// Rank products by sales value.
///
/// Only the category selection is applied here. The date range is not,
/// matching the established dashboard behaviour; do not unify this with
/// [`summarize`] without a product decision.
pub fn top_products(
    dataset: &Dataset,
    categories: &BTreeSet<String>,
    limit: usize,
) -> Vec<ProductSummary> {
    let mut groups: BTreeMap<(&str, &str), Bucket> = BTreeMap::new();

    for row in dataset
        .rows
        .iter()
        .filter(|r| category_selected(categories, &r.category))
    {
        let bucket = groups
            .entry((row.product_id.as_str(), row.product_name.as_str()))
            .or_default();
        bucket.sales_value += row.sales_value;
        bucket.transactions += 1;
    }

    let mut products: Vec<ProductSummary> = groups
        .into_iter()
        .map(|((id, name), b)| ProductSummary {
            product_id: id.to_string(),
            product_name: name.to_string(),
            sales_value: b.sales_value,
            transactions: b.transactions,
        })
        .collect();

    products.sort_by(|a, b| b.sales_value.total_cmp(&a.sales_value));
    products.truncate(limit);

    products
}

/// Monthly sales and profit for the filtered rows.
///
/// Rows without an order date are skipped. Months with no sales between the
/// first and last populated month are emitted with zeros.
pub fn monthly_trend(dataset: &Dataset, filter: &FilterSpec) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<(i32, u32), Bucket> = BTreeMap::new();

    for row in dataset.rows.iter().filter(|r| filter.matches(r)) {
        let Some(day) = row.order_day() else {
            continue;
        };
        let bucket = months.entry((day.year(), day.month())).or_default();
        bucket.sales_value += row.sales_value;
        bucket.net_profit += row.net_profit();
    }

    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };

    let mut trend = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        let Some(month) = month_end(cursor.0, cursor.1) else {
            break;
        };
        let (sales_value, net_profit) = months
            .get(&cursor)
            .map_or((0.0, 0.0), |b| (b.sales_value, b.net_profit));
        trend.push(MonthlyPoint {
            month,
            sales_value,
            net_profit,
        });
        cursor = next_month(cursor);
    }

    trend
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Last calendar day of the given month.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = next_month((year, month));
    NaiveDate::from_ymd_opt(ny, nm, 1).and_then(|d| d.pred_opt())
}

/// Sorted distinct category labels.
pub fn category_options(dataset: &Dataset) -> Vec<String> {
    dataset
        .rows
        .iter()
        .map(|r| r.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Earliest and latest order date, or a fixed fallback range when the
/// dataset has no dated rows.
pub fn date_bounds(dataset: &Dataset) -> (NaiveDate, NaiveDate) {
    let mut days = dataset.rows.iter().filter_map(|r| r.order_day());

    let Some(first) = days.next() else {
        return fallback_bounds();
    };

    days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
}

fn fallback_bounds() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
    )
}
