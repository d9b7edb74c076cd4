//! Forecast configuration
//!
//! Values come from (later wins):
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, or `~/.local/share/cashcast/config.toml` if present)
//! 3. Environment variables:
//!    - `CASHCAST_LOOKBACK_MONTHS`: history window used for trends (default 12)
//!    - `CASHCAST_TREND_WINDOW`: regression window in months (default 6)
//!    - `CASHCAST_MOVING_AVERAGE`: baseline moving-average months (default 3)
//!    - `CASHCAST_MAX_RATE_PCT`: growth-rate clamp, ± percent/month (default 50)
//!    - `CASHCAST_FLAT_THRESHOLD_PCT`: |rate| below which a trend is flat (default 1)
//!    - `CASHCAST_CURRENCY`: reporting currency (default USD)
//!
//! Example file:
//!
//! ```toml
//! lookback_months = 18
//! reporting_currency = "EUR"
//!
//! [trend]
//! window_months = 4
//! max_rate_pct = 25.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::forecast::TrendSettings;

/// A century of monthly history
pub const MAX_LOOKBACK_MONTHS: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Months of history (including the current month) fed to the engine
    pub lookback_months: u32,
    /// Only transactions in this currency are considered
    pub reporting_currency: String,
    pub trend: TrendSettings,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_months: 12,
            reporting_currency: "USD".to_string(),
            trend: TrendSettings::default(),
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cashcast").join("config.toml"))
}

impl ForecastConfig {
    /// Defaults, then the config file (if any), then environment overrides
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading forecast config");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CASHCAST_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; a value that does not parse is a config error
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override(&lookup, "CASHCAST_LOOKBACK_MONTHS")? {
            self.lookback_months = v;
        }
        if let Some(v) = parse_override(&lookup, "CASHCAST_TREND_WINDOW")? {
            self.trend.window_months = v;
        }
        if let Some(v) = parse_override(&lookup, "CASHCAST_MOVING_AVERAGE")? {
            self.trend.moving_average_months = v;
        }
        if let Some(v) = parse_override(&lookup, "CASHCAST_MAX_RATE_PCT")? {
            self.trend.max_rate_pct = v;
        }
        if let Some(v) = parse_override(&lookup, "CASHCAST_FLAT_THRESHOLD_PCT")? {
            self.trend.flat_threshold_pct = v;
        }
        if let Some(currency) = lookup("CASHCAST_CURRENCY") {
            if !currency.trim().is_empty() {
                self.reporting_currency = currency.trim().to_uppercase();
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookback_months == 0 {
            return Err(Error::Config("lookback_months must be at least 1".to_string()));
        }
        if self.lookback_months > MAX_LOOKBACK_MONTHS {
            return Err(Error::Config(format!(
                "lookback_months must be at most {}",
                MAX_LOOKBACK_MONTHS
            )));
        }
        if self.trend.window_months < 2 {
            return Err(Error::Config(
                "trend.window_months must be at least 2".to_string(),
            ));
        }
        if self.trend.moving_average_months == 0 {
            return Err(Error::Config(
                "trend.moving_average_months must be at least 1".to_string(),
            ));
        }
        if !self.trend.max_rate_pct.is_finite() || self.trend.max_rate_pct <= 0.0 {
            return Err(Error::Config(
                "trend.max_rate_pct must be a positive number".to_string(),
            ));
        }
        if !self.trend.flat_threshold_pct.is_finite() || self.trend.flat_threshold_pct < 0.0 {
            return Err(Error::Config(
                "trend.flat_threshold_pct must not be negative".to_string(),
            ));
        }
        if self.reporting_currency.trim().is_empty() {
            return Err(Error::Config("reporting_currency must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_override<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| Error::Config(format!("Invalid value for {}: {:?}", name, raw)))
}
