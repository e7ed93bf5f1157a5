//! Analytics configuration.
//!
//! Loaded from TOML. The file location is `FOLIO_CONFIG_FILE` when set,
//! otherwise `config.toml` in the platform config directory. A missing file
//! yields the defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Annual risk-free rate used by the Sharpe ratio when none is configured.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Calendar days per year; crypto markets trade every day.
pub const DEFAULT_PERIODS_PER_YEAR: u32 = 365;

/// Default lifetime of a cached price, in seconds.
pub const DEFAULT_PRICE_CACHE_TTL_SECS: u64 = 60;

/// Weights of the composite risk score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskWeights {
    /// Weight of the (capped) annualized volatility
    pub volatility: f64,
    /// Weight of the (capped) maximum drawdown
    pub drawdown: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            volatility: 0.6,
            drawdown: 0.4,
        }
    }
}

/// Settings shared by every analytics computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Annual risk-free rate (0.02 = 2%)
    pub risk_free_rate: f64,
    /// Return observations per year, used for annualization
    pub periods_per_year: u32,
    /// Composite risk score weights
    pub risk_weights: RiskWeights,
    /// Lifetime of cached asset prices
    pub price_cache_ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            risk_weights: RiskWeights::default(),
            price_cache_ttl_secs: DEFAULT_PRICE_CACHE_TTL_SECS,
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::from_path(&Self::default_path())
    }

    /// Get the default config file path.
    ///
    /// Can be overridden with the `FOLIO_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FOLIO_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "folio")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("folio.toml"))
    }

    /// Load configuration from a specific path, falling back to defaults if it does not exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings keep every score within its documented range.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(Error::InvalidConfig(
                "risk_free_rate must be a finite number".to_string(),
            ));
        }

        if self.periods_per_year == 0 {
            return Err(Error::InvalidConfig(
                "periods_per_year must be positive".to_string(),
            ));
        }

        let RiskWeights {
            volatility,
            drawdown,
        } = self.risk_weights;
        if !(volatility >= 0.0 && drawdown >= 0.0) {
            return Err(Error::InvalidConfig(
                "risk weights must be non-negative".to_string(),
            ));
        }
        if ((volatility + drawdown) - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidConfig(format!(
                "risk weights must sum to 1, got {}",
                volatility + drawdown
            )));
        }

        Ok(())
    }

    /// Price cache lifetime as a chrono duration.
    ///
    /// Capped at `u32::MAX` seconds, far beyond any useful TTL.
    pub fn price_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.price_cache_ttl_secs.min(u64::from(u32::MAX)) as i64)
    }
}
