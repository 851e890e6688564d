//! Markdown and JSON dashboard generation.
//!
//! This module renders a computed [`Dashboard`] for display. All currency
//! and thousands-separator formatting lives here; the aggregation pipeline
//! only produces raw numbers.

use super::format::{format_count, format_currency};
use crate::models::{
    CategorySummary, Dashboard, DashboardMetadata, MonthlyPoint, ProductSummary, Totals,
};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown dashboard.
pub fn generate_markdown_report(dashboard: &Dashboard) -> String {
    let currency = dashboard.metadata.currency_prefix.as_str();
    let mut output = String::new();

    output.push_str(&generate_header(&dashboard.metadata));
    output.push_str(&generate_kpi_section(&dashboard.totals, currency));
    output.push_str(&generate_category_section(&dashboard.categories, currency));

    if let Some(ref trend) = dashboard.trend {
        output.push_str(&generate_trend_section(trend, currency));
    }

    if let Some(ref products) = dashboard.products {
        output.push_str(&generate_products_section(products, currency));
    }

    output.push_str(&generate_footer(&dashboard.metadata));

    output
}

/// Title and date range line.
fn generate_header(metadata: &DashboardMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!("# {}\n\n", metadata.title));
    section.push_str(&format!(
        "Date range: **{}** to **{}**\n\n",
        metadata.start.format("%Y-%m-%d"),
        metadata.end.format("%Y-%m-%d")
    ));
    section.push_str("---\n\n");

    section
}

/// KPI cards rendered as a single-row table.
fn generate_kpi_section(totals: &Totals, currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## Key Metrics\n\n");
    section.push_str(
        "| Total Sales | Total Net Profit | Average AOV (per category) | Transactions |\n",
    );
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        format_currency(currency, totals.total_sales),
        format_currency(currency, totals.total_profit),
        format_currency(currency, totals.avg_aov),
        format_count(totals.transactions)
    ));

    section
}

/// Sales, profit and AOV per category.
fn generate_category_section(categories: &[CategorySummary], currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## Sales & Profit by Category\n\n");

    if categories.is_empty() {
        section.push_str("No data for the selected filters.\n\n");
        return section;
    }

    section.push_str("| Category | Sales Value | Net Profit | Transactions | AOV |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");

    for c in categories {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_cell(&c.category),
            format_currency(currency, c.sales_value),
            format_currency(currency, c.net_profit),
            format_count(c.transactions),
            format_currency(currency, c.aov)
        ));
    }
    section.push('\n');

    section
}

/// Monthly sales and profit.
fn generate_trend_section(trend: &[MonthlyPoint], currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## Trend (Monthly)\n\n");

    if trend.is_empty() {
        section.push_str("No time-series data to show for selected filters.\n\n");
        return section;
    }

    section.push_str("| Month | Sales Value | Net Profit |\n");
    section.push_str("|:---|---:|---:|\n");

    for point in trend {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            point.month.format("%Y-%m"),
            format_currency(currency, point.sales_value),
            format_currency(currency, point.net_profit)
        ));
    }
    section.push('\n');

    section
}

/// Top products by sales value.
fn generate_products_section(products: &[ProductSummary], currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## Top Products (by Sales)\n\n");

    if products.is_empty() {
        section.push_str("No products match the selected categories.\n\n");
        return section;
    }

    section.push_str("| SKU | Product | Sales Value | Transactions |\n");
    section.push_str("|:---|:---|---:|---:|\n");

    for p in products {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(&p.product_id),
            escape_cell(&p.product_name),
            format_currency(currency, p.sales_value),
            format_count(p.transactions)
        ));
    }
    section.push('\n');

    section
}

/// Notes and generation footer.
fn generate_footer(metadata: &DashboardMetadata) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(
        "**Notes:** Sales = `after_discount`. Net profit = `after_discount - cogs`. \
         Top products apply the category selection only, not the date range.\n\n",
    );
    footer.push_str(&format!(
        "*Generated {} from `{}` ({} rows) by SalesDash*\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        metadata.source,
        format_count(metadata.rows_loaded)
    ));

    footer
}

/// Keep table cells from breaking the Markdown row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a JSON export.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
