//! Core data types for portfolio analytics.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One daily valuation of a whole portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSnapshot {
    /// Valuation date
    pub date: NaiveDate,
    /// Total portfolio value on that date
    pub total_value: Decimal,
}

impl ValueSnapshot {
    /// Create a new snapshot.
    pub fn new(date: NaiveDate, total_value: Decimal) -> Self {
        Self { date, total_value }
    }

    /// The snapshot value as `f64` for analytics math.
    pub fn value_f64(&self) -> Result<f64> {
        decimal_to_f64(self.total_value, || format!("snapshot {}", self.date))
    }
}

/// An asset position marked to market.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Asset identifier (e.g. `bitcoin`)
    pub asset_id: String,
    /// Current market value of the position
    pub current_value: Decimal,
}

impl Holding {
    /// Create a new holding.
    pub fn new(asset_id: impl Into<String>, current_value: Decimal) -> Self {
        Self {
            asset_id: asset_id.into(),
            current_value,
        }
    }

    /// The holding value as `f64` for analytics math.
    pub fn value_f64(&self) -> Result<f64> {
        decimal_to_f64(self.current_value, || format!("holding {}", self.asset_id))
    }
}

/// A quantity of an asset that has not been priced yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Asset identifier
    pub asset_id: String,
    /// Units held
    pub quantity: Decimal,
}

impl Position {
    /// Create a new position.
    pub fn new(asset_id: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            asset_id: asset_id.into(),
            quantity,
        }
    }

    /// Value this position at the given unit price.
    pub fn mark(&self, price: Decimal) -> Holding {
        Holding::new(self.asset_id.clone(), self.quantity * price)
    }
}

/// Risk characteristics of a portfolio, recomputed on every request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    /// Daily Sharpe ratio
    pub sharpe_ratio: f64,
    /// Annualized volatility percentage
    pub volatility: f64,
    /// Maximum drawdown percentage
    pub max_drawdown: f64,
    /// Concentration-based diversification score (0-100)
    pub diversification_score: f64,
    /// Composite risk indicator (0-100)
    pub risk_score: f64,
}

/// API response wrapper printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<Result<T>> for ApiResponse<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

fn decimal_to_f64(value: Decimal, context: impl FnOnce() -> String) -> Result<f64> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            Error::InvalidValue(format!("{} is not representable: {}", context(), value))
        })
}
