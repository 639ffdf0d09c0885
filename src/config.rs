use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::metrics::MetricWindows;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub yahoo: YahooConfig,
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub metrics: MetricWindows,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YahooConfig {
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
    #[serde(default = "default_compare_tickers")]
    pub compare_tickers: String,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_user_agent() -> String {
    format!("stock-dashboard/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_ticker() -> String {
    "AAPL".to_string()
}

fn default_start_date() -> String {
    "2020-01-01".to_string()
}

fn default_end_date() -> String {
    "2021-01-01".to_string()
}

fn default_compare_tickers() -> String {
    "AAPL, MSFT, GOOGL".to_string()
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl YahooConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config = Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid config TOML")
    }

    /// Override file values with `DASHBOARD_TICKER` / `YAHOO_BASE_URL`
    /// when set and non-empty.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ticker) = lookup("DASHBOARD_TICKER").filter(|v| !v.trim().is_empty()) {
            self.dashboard.ticker = ticker.trim().to_string();
        }
        if let Some(url) = lookup("YAHOO_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.yahoo.base_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.yahoo.base_url.trim().is_empty() {
            bail!("yahoo.base_url must not be empty");
        }
        if self.dashboard.refresh_interval_secs == 0 {
            bail!("dashboard.refresh_interval_secs must be > 0");
        }
        if self.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        if let Err(msg) = self.metrics.validate() {
            bail!(msg);
        }
        Ok(())
    }
}
