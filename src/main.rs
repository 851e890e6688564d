//! SalesDash - sales performance dashboards from spreadsheet exports
//!
//! A CLI tool that loads a sales dataset, filters it by order date and
//! category, and renders KPI totals, category and product rankings and a
//! monthly trend as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing dataset, unreadable file, bad config, etc.)

mod analysis;
mod cli;
mod config;
mod dashboard;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dashboard::{build_dashboard, resolve_filter, DashboardOptions};
use loader::{LoadError, LoadOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("SalesDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {}", user_message(&e));
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .salesdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the dataset path, default filters and currency.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report written to stdout stays clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, aggregate and render. The dataset is loaded once and borrowed by
/// every aggregation.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let data_path = PathBuf::from(&config.data.path);
    let load_options = LoadOptions {
        sheet: config.data.sheet.clone(),
        show_progress: !args.quiet,
    };

    let dataset = loader::load_dataset(&data_path, &load_options)?;

    if dataset.is_empty() {
        warn!("Dataset {} has no rows", data_path.display());
    }

    if args.list_categories {
        for category in analysis::category_options(&dataset) {
            println!("{}", category);
        }
        return Ok(());
    }

    let filter = resolve_filter(&dataset, args.start, args.end, &config.filters.categories);
    debug!("Filter: {:?}", filter);

    let options = DashboardOptions::from(&config);
    let dashboard = build_dashboard(&dataset, &filter, &options);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Markdown => report::generate_markdown_report(&dashboard),
    };

    match args.output {
        Some(ref path) => {
            report::write_report(&output, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Turn an error into the message shown to the user.
fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LoadError>() {
        Some(LoadError::NotFound(path)) => format!(
            "File not found: {}. Pass --data, set SALESDASH_DATA, or place the dataset in the working directory.",
            path.display()
        ),
        _ => format!("{:#}", err),
    }
}
