//! Dashboard assembly.
//!
//! Runs every aggregation for one filter selection and packages the
//! results with their metadata for rendering.

use crate::analysis;
use crate::config::Config;
use crate::models::{Dashboard, DashboardMetadata, Dataset, FilterSpec};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

/// Settings that shape a dashboard.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub title: String,
    pub currency_prefix: String,
    pub top_n: usize,
    pub product_limit: usize,
    pub include_trend: bool,
    pub include_products: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DashboardOptions {
    fn from(config: &Config) -> Self {
        Self {
            title: config.report.title.clone(),
            currency_prefix: config.report.currency_prefix.clone(),
            top_n: config.filters.top_n,
            product_limit: config.filters.product_limit,
            include_trend: config.report.include_trend,
            include_products: config.report.include_products,
        }
    }
}

/// Build the filter, defaulting an unset bound to the dataset's own
/// earliest/latest order date.
pub fn resolve_filter(
    dataset: &Dataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    categories: &[String],
) -> FilterSpec {
    let (min_date, max_date) = analysis::date_bounds(dataset);

    FilterSpec {
        start: Some(start.unwrap_or(min_date)),
        end: Some(end.unwrap_or(max_date)),
        categories: categories.iter().map(|c| c.trim().to_string()).collect(),
    }
}

/// Compute every dashboard section for `filter`.
pub fn build_dashboard(
    dataset: &Dataset,
    filter: &FilterSpec,
    options: &DashboardOptions,
) -> Dashboard {
    let (summary, totals) = analysis::summarize(dataset, filter);
    info!(
        "{} categories, {} transactions after filtering",
        summary.len(),
        totals.transactions
    );

    let categories = analysis::top_n(&summary, options.top_n);
    debug!("Showing top {} of {} categories", categories.len(), summary.len());

    let trend = options
        .include_trend
        .then(|| analysis::monthly_trend(dataset, filter));

    let products = options
        .include_products
        .then(|| analysis::top_products(dataset, &filter.categories, options.product_limit));

    let (min_date, max_date) = analysis::date_bounds(dataset);

    let metadata = DashboardMetadata {
        title: options.title.clone(),
        source: dataset.source.display().to_string(),
        generated_at: Utc::now(),
        rows_loaded: dataset.len(),
        start: filter.start.unwrap_or(min_date),
        end: filter.end.unwrap_or(max_date),
        currency_prefix: options.currency_prefix.clone(),
    };

    Dashboard {
        metadata,
        filter: filter.clone(),
        totals,
        categories,
        trend,
        products,
    }
}
