//! Concentration-based diversification scoring.

use crate::types::Holding;
use crate::Result;

/// Score assigned to a portfolio with exactly one holding.
pub const SINGLE_HOLDING_SCORE: f64 = 20.0;

/// Bonus points per distinct holding.
const BONUS_PER_HOLDING: f64 = 5.0;

/// Cap on the holding-count bonus.
const MAX_BONUS: f64 = 30.0;

/// Weight of each holding in the portfolio.
///
/// Returns an empty vector when the total value is not positive.
pub fn portfolio_weights(holding_values: &[f64]) -> Vec<f64> {
    let total: f64 = holding_values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }

    holding_values.iter().map(|v| v / total).collect()
}

/// Herfindahl-Hirschman index: the sum of squared weights.
///
/// 1.0 for a single position, approaching 0 as holdings spread out.
pub fn herfindahl_index(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum()
}

/// Calculate a 0-100 diversification score from current holding values.
///
/// The base score is `(1 - HHI) * 100`, plus 5 points per holding (at most
/// 30). A single holding always scores 20; no holdings or a non-positive
/// total score 0.
pub fn diversification_score(holding_values: &[f64]) -> f64 {
    match holding_values.len() {
        0 => return 0.0,
        1 => return SINGLE_HOLDING_SCORE,
        _ => {}
    }

    let weights = portfolio_weights(holding_values);
    if weights.is_empty() {
        tracing::debug!("Portfolio total value is not positive, diversification score is 0");
        return 0.0;
    }

    let hhi = herfindahl_index(&weights);
    let base = (1.0 - hhi) * 100.0;
    let bonus = (holding_values.len() as f64 * BONUS_PER_HOLDING).min(MAX_BONUS);

    let score = base + bonus;
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Diversification score of marked holdings.
pub fn holdings_diversification_score(holdings: &[Holding]) -> Result<f64> {
    let values = holdings
        .iter()
        .map(Holding::value_f64)
        .collect::<Result<Vec<_>>>()?;
    Ok(diversification_score(&values))
}
