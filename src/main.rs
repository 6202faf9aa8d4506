//! Corona Dashboard - COVID-19 cases on a single page
//!
//! Loads the CSSE daily report and global time series once, then serves:
//! - A globe of confirmed cases per country and a sortable country table
//! - Global totals per condition
//! - A cumulative time series chart, filtered by the country dropdown

mod charts;
mod config;
mod dashboard;
mod data;
mod error;
mod web;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before any other initialization)
    let _ = dotenvy::dotenv();

    let config = config::Config::load()?;
    init_logging(&config.logging);

    info!("Starting Corona Dashboard...");

    let paths = data::DataPaths::from_config(&config.data);
    info!(
        daily_repo = %paths.daily_repo.display(),
        time_repo = %paths.time_repo.display(),
        "Data repositories"
    );

    let date = config.data.snapshot_date()?;
    let tables = data::load_all(&paths, date).context("Failed to load case data")?;
    info!(
        countries = data::reshape::country_options(&tables.snapshot).len(),
        dates = tables.confirmed.dates.len(),
        "Case data loaded"
    );

    web::start_server(&config, Arc::new(tables)).await?;

    Ok(())
}

/// Use LOG_FORMAT=gcp for structured GCP Cloud Logging
fn init_logging(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "gcp" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
