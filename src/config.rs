//! Configuration management

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::data::loader::SNAPSHOT_DATE_FORMAT;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Root of the CSSE data repository (`csse_covid_19_data`)
    pub repo: String,
    /// Overrides `<repo>/csse_covid_19_daily_reports`
    #[serde(default)]
    pub daily_repo: Option<String>,
    /// Overrides `<repo>/csse_covid_19_time_series`
    #[serde(default)]
    pub time_repo: Option<String>,
    /// Daily report to load, `MM-DD-YYYY`
    pub date: String,
    /// Country pre-selected in the dropdown; empty selects the global view
    #[serde(default)]
    pub default_country: String,
}

impl DataConfig {
    pub fn snapshot_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, SNAPSHOT_DATE_FORMAT)
            .with_context(|| format!("Invalid snapshot date '{}': expected MM-DD-YYYY", self.date))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Defaults, then `config.toml` if present, then `COVID_DASH__SECTION__KEY` variables
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";

        let builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.http_port", 8050)?
            .set_default("data.repo", "data/COVID-19/csse_covid_19_data")?
            .set_default("data.date", "11-09-2020")?
            .set_default("data.default_country", "Korea, South")?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("COVID_DASH").separator("__"));

        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.http_port == 0 {
            anyhow::bail!("Invalid http_port: 0 is not allowed");
        }
        if self.server.host.is_empty() {
            anyhow::bail!("Server host cannot be empty");
        }

        if self.data.repo.is_empty() {
            anyhow::bail!("Data repository path cannot be empty");
        }
        self.data.snapshot_date()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("Invalid logging level '{}'. Must be one of: {:?}", self.logging.level, valid_levels);
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}
