//! Folio Core - Portfolio risk analytics library.
//!
//! This crate computes risk characteristics of a portfolio from its daily
//! value history and current holdings:
//!
//! - **Returns**: day-over-day simple returns from value snapshots
//! - **Risk metrics**: Sharpe ratio, annualized volatility, max drawdown
//! - **Diversification**: Herfindahl-Hirschman based concentration score
//! - **Composite risk score**: weighted 0-100 indicator
//! - **Price cache**: injectable TTL cache for marking positions to market
//!
//! # Example
//!
//! ```rust
//! use folio_core::portfolio::{build_returns, max_drawdown, risk_score, volatility};
//!
//! let values = [100.0, 110.0, 99.0, 120.0];
//! let returns = build_returns(&values).unwrap();
//!
//! let vol = volatility(&returns);
//! let drawdown = max_drawdown(&values);
//! println!("risk score: {:.1}", risk_score(vol, drawdown));
//! ```

pub mod config;
pub mod portfolio;
pub mod quotes;
pub mod types;

// Re-export commonly used types
pub use config::{AnalyticsConfig, RiskWeights};
pub use types::{ApiResponse, Holding, PortfolioMetrics, Position, ValueSnapshot};

// Re-export main functionality
pub use portfolio::{
    build_returns, calculate_portfolio_metrics, diversification_score, max_drawdown, risk_score,
    sharpe_ratio, volatility, InMemoryPortfolioStore, JsonPortfolioStore, PerformanceSummary,
    PortfolioAnalyzer, PortfolioSource,
};
pub use quotes::{mark_positions, CachedPriceFeed, PriceCache, PriceFeed, StaticPriceFeed};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
