//! Assembling portfolio metrics from stored data.

use super::diversification::holdings_diversification_score;
use super::performance::PerformanceSummary;
use super::returns::{build_returns, snapshot_values};
use super::risk::{
    max_drawdown, sharpe_ratio_with_periods, volatility_with_periods, weighted_risk_score,
};
use super::store::PortfolioSource;
use crate::config::AnalyticsConfig;
use crate::quotes::{mark_positions, CachedPriceFeed, PriceCache, PriceFeed};
use crate::types::{Holding, PortfolioMetrics, ValueSnapshot};
use crate::Result;

/// Calculate all risk metrics for a portfolio.
///
/// # Arguments
///
/// * `snapshots` - Daily valuations; reordered by date if needed
/// * `holdings` - Current holdings marked to market
/// * `config` - Risk-free rate, annualization and score weights
///
/// # Errors
///
/// Fails if a value cannot be converted or a zero valuation precedes another day.
pub fn calculate_portfolio_metrics(
    snapshots: &[ValueSnapshot],
    holdings: &[Holding],
    config: &AnalyticsConfig,
) -> Result<PortfolioMetrics> {
    let values = ordered_values(snapshots)?;
    let returns = build_returns(&values)?;

    let sharpe =
        sharpe_ratio_with_periods(&returns, config.risk_free_rate, config.periods_per_year);
    let volatility = volatility_with_periods(&returns, config.periods_per_year);
    let drawdown = max_drawdown(&values);
    let diversification = holdings_diversification_score(holdings)?;
    let risk = weighted_risk_score(volatility, drawdown, config.risk_weights);

    tracing::debug!(
        "Computed metrics over {} snapshot(s) and {} holding(s)",
        values.len(),
        holdings.len()
    );

    Ok(PortfolioMetrics {
        sharpe_ratio: sharpe,
        volatility,
        max_drawdown: drawdown,
        diversification_score: diversification,
        risk_score: risk,
    })
}

/// Snapshot values in date order.
fn ordered_values(snapshots: &[ValueSnapshot]) -> Result<Vec<f64>> {
    if snapshots.windows(2).all(|w| w[0].date <= w[1].date) {
        return snapshot_values(snapshots);
    }

    tracing::warn!("Value snapshots were not in date order, sorting");
    let mut sorted = snapshots.to_vec();
    sorted.sort_by_key(|s| s.date);
    snapshot_values(&sorted)
}

/// Computes metrics for stored accounts, pricing positions through a cache.
#[derive(Debug)]
pub struct PortfolioAnalyzer<S, F> {
    source: S,
    feed: CachedPriceFeed<F>,
    config: AnalyticsConfig,
}

impl<S: PortfolioSource, F: PriceFeed> PortfolioAnalyzer<S, F> {
    /// Create an analyzer with a fresh cache sized by the config TTL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` fails validation.
    pub fn new(source: S, feed: F, config: AnalyticsConfig) -> Result<Self> {
        let cache = PriceCache::new(config.price_cache_ttl());
        Self::with_cache(source, feed, cache, config)
    }

    /// Create an analyzer around an existing cache.
    pub fn with_cache(
        source: S,
        feed: F,
        cache: PriceCache,
        config: AnalyticsConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            feed: CachedPriceFeed::new(feed, cache),
            config,
        })
    }

    /// Get the active configuration.
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Get the underlying data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get the price cache.
    pub fn cache(&self) -> &PriceCache {
        self.feed.cache()
    }

    /// Current holdings of an account, marked to market.
    pub fn holdings(&mut self, account_id: &str) -> Result<Vec<Holding>> {
        let positions = self.source.positions(account_id)?;
        mark_positions(&positions, &mut self.feed)
    }

    /// Risk metrics for an account.
    pub fn metrics(&mut self, account_id: &str) -> Result<PortfolioMetrics> {
        let snapshots = self.source.value_history(account_id)?;
        let holdings = self.holdings(account_id)?;
        calculate_portfolio_metrics(&snapshots, &holdings, &self.config)
    }

    /// Performance summary for an account, `None` with fewer than two valuations.
    pub fn performance(&self, account_id: &str) -> Result<Option<PerformanceSummary>> {
        let snapshots = self.source.value_history(account_id)?;
        let values = ordered_values(&snapshots)?;
        PerformanceSummary::from_values(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::store::{InMemoryPortfolioStore, PortfolioData};
    use crate::quotes::StaticPriceFeed;
    use crate::types::Position;
    use crate::Error;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn snapshots(values: &[i64]) -> Vec<ValueSnapshot> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                ValueSnapshot::new(start + chrono::Days::new(i as u64), Decimal::from(v))
            })
            .collect()
    }

    fn sample_data() -> PortfolioData {
        let mut data = PortfolioData::default();
        for snapshot in snapshots(&[100, 150, 75, 200]) {
            data.record_snapshot("main", snapshot);
        }
        data.set_positions(
            "main",
            vec![
                Position::new("bitcoin", dec!(1)),
                Position::new("ethereum", dec!(10)),
            ],
        );
        data.set_price("bitcoin", dec!(100));
        data.set_price("ethereum", dec!(10));
        data
    }

    #[test]
    fn test_calculate_portfolio_metrics() {
        let history = snapshots(&[100, 150, 75, 200]);
        let holdings = vec![
            Holding::new("bitcoin", dec!(500)),
            Holding::new("ethereum", dec!(500)),
        ];

        let metrics =
            calculate_portfolio_metrics(&history, &holdings, &AnalyticsConfig::default()).unwrap();

        let returns = build_returns(&[100.0, 150.0, 75.0, 200.0]).unwrap();
        assert_relative_eq!(metrics.max_drawdown, 50.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.diversification_score, 60.0, epsilon = 1e-9);
        assert_relative_eq!(
            metrics.volatility,
            volatility_with_periods(&returns, 365),
            epsilon = 1e-9
        );
        // Volatility is far above 100 here, so it is capped.
        assert_relative_eq!(metrics.risk_score, 100.0 * 0.6 + 50.0 * 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_metrics_empty_inputs_are_neutral() {
        let metrics = calculate_portfolio_metrics(&[], &[], &AnalyticsConfig::default()).unwrap();
        assert_eq!(metrics, PortfolioMetrics::default());
    }

    #[test]
    fn test_metrics_sorts_snapshots() {
        let mut history = snapshots(&[100, 150, 75, 200]);
        history.reverse();

        let metrics =
            calculate_portfolio_metrics(&history, &[], &AnalyticsConfig::default()).unwrap();
        assert_relative_eq!(metrics.max_drawdown, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_metrics_zero_snapshot() {
        let history = snapshots(&[100, 0, 50]);
        let result = calculate_portfolio_metrics(&history, &[], &AnalyticsConfig::default());
        assert!(matches!(result, Err(Error::InvalidValue(_))));
    }

    #[test]
    fn test_metrics_uses_configured_weights() {
        let history = snapshots(&[100, 150, 75, 200]);
        let mut config = AnalyticsConfig::default();
        config.risk_weights.volatility = 0.0;
        config.risk_weights.drawdown = 1.0;

        let metrics = calculate_portfolio_metrics(&history, &[], &config).unwrap();
        assert_relative_eq!(metrics.risk_score, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_analyzer_metrics() {
        let data = sample_data();
        let feed = data.price_feed();
        let mut analyzer = PortfolioAnalyzer::new(
            InMemoryPortfolioStore::from_data(data),
            feed,
            AnalyticsConfig::default(),
        )
        .unwrap();

        let holdings = analyzer.holdings("main").unwrap();
        assert_eq!(holdings[0].current_value, dec!(100));
        assert_eq!(holdings[1].current_value, dec!(100));

        let metrics = analyzer.metrics("main").unwrap();
        assert_relative_eq!(metrics.diversification_score, 60.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.max_drawdown, 50.0, epsilon = 1e-9);
        assert_eq!(analyzer.cache().len(), 2);
    }

    #[test]
    fn test_analyzer_unknown_account() {
        let mut analyzer = PortfolioAnalyzer::new(
            InMemoryPortfolioStore::new(),
            StaticPriceFeed::default(),
            AnalyticsConfig::default(),
        )
        .unwrap();
        assert!(matches!(
            analyzer.metrics("ghost"),
            Err(Error::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_analyzer_missing_price() {
        let mut data = sample_data();
        data.prices.remove("ethereum");
        let feed = data.price_feed();
        let mut analyzer = PortfolioAnalyzer::new(
            InMemoryPortfolioStore::from_data(data),
            feed,
            AnalyticsConfig::default(),
        )
        .unwrap();

        assert!(matches!(
            analyzer.metrics("main"),
            Err(Error::PriceUnavailable(_))
        ));
    }

    #[test]
    fn test_analyzer_performance() {
        let data = sample_data();
        let feed = data.price_feed();
        let analyzer = PortfolioAnalyzer::new(
            InMemoryPortfolioStore::from_data(data),
            feed,
            AnalyticsConfig::default(),
        )
        .unwrap();

        let summary = analyzer.performance("main").unwrap().unwrap();
        assert_relative_eq!(summary.total_return_percent, 100.0, epsilon = 1e-9);
        assert_eq!(summary.negative_days, 1);
    }

    #[test]
    fn test_analyzer_rejects_invalid_weights() {
        let mut config = AnalyticsConfig::default();
        config.risk_weights.volatility = 2.0;
        config.risk_weights.drawdown = 0.0;

        let result = PortfolioAnalyzer::new(
            InMemoryPortfolioStore::new(),
            StaticPriceFeed::default(),
            config,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
