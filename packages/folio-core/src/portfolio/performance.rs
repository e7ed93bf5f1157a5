//! Period performance figures for the dashboard.

use super::returns::build_returns;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Portfolio performance over a value history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    /// First value in the period
    pub start_value: f64,
    /// Last value in the period
    pub end_value: f64,
    /// Change from first to last value, as a percentage
    pub total_return_percent: f64,
    /// Largest single-day return percentage
    pub best_day_percent: f64,
    /// Smallest single-day return percentage
    pub worst_day_percent: f64,
    /// Days with a gain
    pub positive_days: usize,
    /// Days with a loss
    pub negative_days: usize,
    /// Number of valuations in the period
    pub observation_count: usize,
}

impl PerformanceSummary {
    /// Summarize an ordered value history.
    ///
    /// Returns `None` when fewer than two values are available.
    pub fn from_values(values: &[f64]) -> Result<Option<Self>> {
        let returns = build_returns(values)?;
        let (Some(&start_value), Some(&end_value)) = (values.first(), values.last()) else {
            return Ok(None);
        };
        if returns.is_empty() {
            return Ok(None);
        }

        let best = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = returns.iter().copied().fold(f64::INFINITY, f64::min);

        Ok(Some(Self {
            start_value,
            end_value,
            total_return_percent: holding_period_return(start_value, end_value),
            best_day_percent: best * 100.0,
            worst_day_percent: worst * 100.0,
            positive_days: returns.iter().filter(|&&r| r > 0.0).count(),
            negative_days: returns.iter().filter(|&&r| r < 0.0).count(),
            observation_count: values.len(),
        }))
    }
}

/// Calculate holding period return as a percentage.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> f64 {
    if initial_value <= 0.0 {
        return 0.0;
    }
    ((final_value - initial_value) / initial_value) * 100.0
}
