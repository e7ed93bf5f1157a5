//! Portfolio analytics module.
//!
//! Provides return series, risk metrics, diversification scoring and the
//! data-access layer that feeds them.

mod diversification;
mod metrics;
mod performance;
mod returns;
mod risk;
mod store;

pub use diversification::{
    diversification_score, herfindahl_index, holdings_diversification_score, portfolio_weights,
    SINGLE_HOLDING_SCORE,
};
pub use metrics::{calculate_portfolio_metrics, PortfolioAnalyzer};
pub use performance::{holding_period_return, PerformanceSummary};
pub use returns::{build_returns, ensure_finite, snapshot_values};
pub use risk::{
    default_sharpe_ratio, finite_metric, max_drawdown, risk_score, sharpe_ratio,
    sharpe_ratio_with_periods, volatility, volatility_with_periods, weighted_risk_score,
};
pub use store::{
    AccountRecord, InMemoryPortfolioStore, JsonPortfolioStore, PortfolioData, PortfolioSource,
};
