//! Portfolio risk metrics calculation.
//!
//! Provides Sharpe ratio, annualized volatility, max drawdown and the
//! composite risk score. Degenerate inputs (too few points, zero deviation)
//! produce a neutral 0 instead of an error.

use crate::config::{RiskWeights, DEFAULT_PERIODS_PER_YEAR, DEFAULT_RISK_FREE_RATE};
use crate::{Error, Result};

/// Mean and population standard deviation of a series.
fn mean_and_std(returns: &[f64]) -> (f64, f64) {
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Calculate the Sharpe ratio of daily returns.
///
/// # Arguments
///
/// * `returns` - Daily returns (e.g., 0.01 for 1%)
/// * `risk_free_rate` - Annual risk-free rate (e.g., 0.02 for 2%)
///
/// # Returns
///
/// `(mean - daily_rf) / std` with the annual rate spread over 365 days.
/// Not annualized. Returns 0 for fewer than two returns or zero deviation.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    sharpe_ratio_with_periods(returns, risk_free_rate, DEFAULT_PERIODS_PER_YEAR)
}

/// Sharpe ratio with an explicit number of periods per year.
pub fn sharpe_ratio_with_periods(
    returns: &[f64],
    risk_free_rate: f64,
    periods_per_year: u32,
) -> f64 {
    if returns.len() < 2 || periods_per_year == 0 {
        return 0.0;
    }

    let (mean, std) = mean_and_std(returns);
    if std <= 0.0 {
        tracing::debug!("Zero return deviation, Sharpe ratio is 0");
        return 0.0;
    }

    let daily_rf = risk_free_rate / periods_per_year as f64;
    (mean - daily_rf) / std
}

/// Sharpe ratio using the default 2% annual risk-free rate.
pub fn default_sharpe_ratio(returns: &[f64]) -> f64 {
    sharpe_ratio(returns, DEFAULT_RISK_FREE_RATE)
}

/// Calculate annualized volatility from daily returns.
///
/// Population standard deviation scaled by `sqrt(365)`, as a percentage.
pub fn volatility(returns: &[f64]) -> f64 {
    volatility_with_periods(returns, DEFAULT_PERIODS_PER_YEAR)
}

/// Annualized volatility with an explicit number of periods per year.
pub fn volatility_with_periods(returns: &[f64], periods_per_year: u32) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let (_, std) = mean_and_std(returns);
    std * (periods_per_year as f64).sqrt() * 100.0
}

/// Calculate maximum drawdown from a series of portfolio values.
///
/// Single forward pass: the peak only moves forward in time, so each point
/// is measured against the highest value seen so far.
///
/// Returns the largest peak-to-trough decline as a percentage
/// (e.g., 50.0 for a halving). Returns 0 for fewer than two values.
/// Non-finite points are skipped.
pub fn max_drawdown(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0;

    for &value in values {
        if !value.is_finite() {
            tracing::debug!("Skipping non-finite value in drawdown series");
            continue;
        }
        if value > peak {
            peak = value;
        }
        if peak <= 0.0 {
            continue;
        }
        let drawdown = (peak - value) / peak * 100.0;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    max_drawdown
}

/// Combine volatility and drawdown into a single 0-100 risk indicator.
///
/// Both inputs are capped at 100 before weighting 0.6 / 0.4.
pub fn risk_score(volatility: f64, max_drawdown: f64) -> f64 {
    weighted_risk_score(volatility, max_drawdown, RiskWeights::default())
}

/// Composite risk score with custom weights.
pub fn weighted_risk_score(volatility: f64, max_drawdown: f64, weights: RiskWeights) -> f64 {
    let volatility_component = clamp_percent(volatility);
    let drawdown_component = clamp_percent(max_drawdown);

    let score =
        volatility_component * weights.volatility + drawdown_component * weights.drawdown;
    clamp_percent(score)
}

/// Fail if a computed metric overflowed to NaN or infinity.
pub fn finite_metric(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidValue(format!("{} is not finite: {}", name, value)))
    }
}

/// Clamp to [0, 100]; NaN maps to 0.
fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_degenerate_inputs_are_zero() {
        assert_eq!(volatility(&[]), 0.0);
        assert_eq!(volatility(&[0.05]), 0.0);
        assert_eq!(sharpe_ratio(&[], 0.02), 0.0);
        assert_eq!(sharpe_ratio(&[0.05], 0.02), 0.0);
    }

    #[test]
    fn test_sharpe_ratio_zero_deviation() {
        let flat = vec![0.25; 8];
        assert_eq!(sharpe_ratio(&flat, 0.02), 0.0);
    }

    #[test]
    fn test_sharpe_ratio() {
        let returns = [0.01, -0.01];
        // mean 0, std 0.01, daily rf = 0.02 / 365
        let expected = (0.0 - 0.02 / 365.0) / 0.01;
        assert_relative_eq!(sharpe_ratio(&returns, 0.02), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_sharpe_ratio_sign() {
        let good = [0.012, 0.008, 0.011, 0.009];
        assert!(default_sharpe_ratio(&good) > 0.0);

        let bad = [-0.012, -0.008, -0.011, -0.009];
        assert!(default_sharpe_ratio(&bad) < 0.0);
    }

    #[test]
    fn test_volatility() {
        let returns = [0.01, -0.01];
        // population std = 0.01
        assert_relative_eq!(
            volatility(&returns),
            0.01 * 365.0_f64.sqrt() * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_volatility_with_periods() {
        let returns = [0.01, -0.01];
        assert_relative_eq!(
            volatility_with_periods(&returns, 252),
            0.01 * 252.0_f64.sqrt() * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_max_drawdown() {
        // Worst decline is 150 -> 75, even though 200 is reached later.
        assert_relative_eq!(max_drawdown(&[100.0, 150.0, 75.0, 200.0]), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_max_drawdown_monotonic() {
        assert_eq!(max_drawdown(&[100.0, 101.0, 105.0, 130.0]), 0.0);
    }

    #[test]
    fn test_max_drawdown_insufficient_data() {
        assert_eq!(max_drawdown(&[]), 0.0);
        assert_eq!(max_drawdown(&[100.0]), 0.0);
    }

    #[test]
    fn test_max_drawdown_no_look_ahead() {
        // Early dip is measured against the first value, not the later peak.
        assert_relative_eq!(max_drawdown(&[100.0, 90.0, 300.0, 285.0]), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_max_drawdown_zero_start() {
        assert_relative_eq!(max_drawdown(&[0.0, 0.0, 50.0, 25.0]), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_max_drawdown_skips_non_finite() {
        assert_relative_eq!(max_drawdown(&[f64::NAN, 100.0, 50.0]), 50.0, epsilon = 1e-9);
        assert_relative_eq!(
            max_drawdown(&[100.0, f64::INFINITY, 80.0]),
            20.0,
            epsilon = 1e-9
        );
        assert_eq!(max_drawdown(&[f64::NAN, f64::NAN]), 0.0);
    }

    #[test]
    fn test_volatility_overflow_is_not_finite() {
        let vol = volatility(&[1e308, -1e308]);
        assert!(finite_metric("volatility", vol).is_err());
        assert_eq!(finite_metric("volatility", 12.5).unwrap(), 12.5);
    }

    #[test]
    fn test_risk_score() {
        assert_relative_eq!(risk_score(50.0, 20.0), 38.0, epsilon = 1e-9);
    }

    #[test]
    fn test_risk_score_caps_components() {
        assert_relative_eq!(risk_score(250.0, 100.0), 100.0, epsilon = 1e-9);
        assert_relative_eq!(risk_score(250.0, 0.0), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weighted_risk_score() {
        let weights = RiskWeights {
            volatility: 0.5,
            drawdown: 0.5,
        };
        assert_relative_eq!(weighted_risk_score(40.0, 20.0, weights), 30.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn prop_risk_score_in_range(vol in -1e6f64..1e6, dd in -1e6f64..1e6) {
            let score = risk_score(vol, dd);
            prop_assert!((0.0..=100.0).contains(&score));
        }

        #[test]
        fn prop_drawdown_in_range(values in proptest::collection::vec(0.01f64..1e9, 0..64)) {
            let dd = max_drawdown(&values);
            prop_assert!((0.0..=100.0).contains(&dd));
        }
    }
}
