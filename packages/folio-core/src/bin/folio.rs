//! Folio CLI - Command line interface for portfolio risk analytics.
//!
//! Every command prints an `ApiResponse` JSON document on stdout. Logs go to
//! stderr and are controlled by `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use folio_core::portfolio::{
    build_returns, diversification_score, ensure_finite, finite_metric, max_drawdown, risk_score,
    sharpe_ratio, volatility, JsonPortfolioStore, PortfolioAnalyzer,
};
use folio_core::{AnalyticsConfig, ApiResponse, Result};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - portfolio risk analytics")]
#[command(version)]
struct Cli {
    /// Config file (defaults to FOLIO_CONFIG_FILE or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Day-over-day returns of a value series
    Returns {
        /// Portfolio values, oldest first (comma-separated)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        values: Vec<f64>,
    },
    /// Annualized volatility of a return series
    Volatility {
        /// Daily returns (comma-separated)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        values: Vec<f64>,
    },
    /// Sharpe ratio of a return series
    Sharpe {
        /// Daily returns (comma-separated)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        values: Vec<f64>,
        /// Annual risk-free rate (defaults to the configured rate)
        #[arg(long)]
        risk_free_rate: Option<f64>,
    },
    /// Maximum drawdown of a value series
    Drawdown {
        /// Portfolio values, oldest first (comma-separated)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        values: Vec<f64>,
    },
    /// Diversification score of holding values
    Diversification {
        /// Current value of each holding (comma-separated)
        #[arg(long, value_delimiter = ',')]
        values: Vec<f64>,
    },
    /// Composite risk score
    RiskScore {
        /// Annualized volatility percentage
        #[arg(long)]
        volatility: f64,
        /// Maximum drawdown percentage
        #[arg(long)]
        max_drawdown: f64,
    },
    /// Risk metrics for a stored account
    Metrics {
        /// Account identifier
        #[arg(short, long)]
        account: String,
        /// Portfolio file (defaults to FOLIO_PORTFOLIO_FILE or ~/.folio/portfolio.json)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Performance summary for a stored account
    Performance {
        /// Account identifier
        #[arg(short, long)]
        account: String,
        /// Portfolio file (defaults to FOLIO_PORTFOLIO_FILE or ~/.folio/portfolio.json)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(AnalyticsConfig::default_path);
    let config = match AnalyticsConfig::from_path(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            println!("{}", render(&ApiResponse::<()>::err(e.to_string())));
            return ExitCode::FAILURE;
        }
    };

    let (output, ok) = run(cli.command, config, &config_path);
    println!("{}", output);

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(command: Commands, config: AnalyticsConfig, config_path: &Path) -> (String, bool) {
    match command {
        Commands::Returns { values } => respond(build_returns(&values).map(|returns| {
            json!({
                "returns": returns,
                "count": returns.len(),
            })
        })),
        Commands::Volatility { values } => respond(
            ensure_finite(&values)
                .and_then(|_| finite_metric("volatility", volatility(&values)))
                .map(|vol| json!({ "volatility": vol })),
        ),
        Commands::Sharpe {
            values,
            risk_free_rate,
        } => {
            let rate = risk_free_rate.unwrap_or(config.risk_free_rate);
            respond(
                ensure_finite(&values)
                    .and_then(|_| ensure_finite(&[rate]))
                    .and_then(|_| finite_metric("sharpeRatio", sharpe_ratio(&values, rate)))
                    .map(|sharpe| {
                        json!({
                            "sharpeRatio": sharpe,
                            "riskFreeRate": rate,
                        })
                    }),
            )
        }
        // Non-finite points are skipped by the drawdown pass itself.
        Commands::Drawdown { values } => respond(
            finite_metric("maxDrawdown", max_drawdown(&values))
                .map(|dd| json!({ "maxDrawdown": dd })),
        ),
        Commands::Diversification { values } => respond(
            ensure_finite(&values)
                .and_then(|_| {
                    finite_metric("diversificationScore", diversification_score(&values))
                })
                .map(|score| {
                    json!({
                        "diversificationScore": score,
                        "holdingCount": values.len(),
                    })
                }),
        ),
        Commands::RiskScore {
            volatility,
            max_drawdown,
        } => respond(
            ensure_finite(&[volatility, max_drawdown])
                .map(|_| json!({ "riskScore": risk_score(volatility, max_drawdown) })),
        ),
        Commands::Metrics { account, file } => {
            respond(analyzer(file, config).and_then(|mut analyzer| analyzer.metrics(&account)))
        }
        Commands::Performance { account, file } => respond(
            analyzer(file, config).and_then(|analyzer| analyzer.performance(&account)),
        ),
        Commands::Config => respond(Ok(json!({
            "path": config_path,
            "config": config,
        }))),
    }
}

fn analyzer(
    file: Option<PathBuf>,
    config: AnalyticsConfig,
) -> Result<PortfolioAnalyzer<JsonPortfolioStore, folio_core::StaticPriceFeed>> {
    let store = match file {
        Some(path) => JsonPortfolioStore::open(path)?,
        None => JsonPortfolioStore::open_default()?,
    };
    tracing::debug!("Using portfolio file {}", store.path().display());

    let feed = store.get().price_feed();
    PortfolioAnalyzer::new(store, feed, config)
}

fn respond<T: Serialize>(result: Result<T>) -> (String, bool) {
    if let Err(e) = &result {
        tracing::warn!("Command failed: {}", e);
    }
    let response = ApiResponse::from(result);
    (render(&response), response.ok)
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|e| {
        format!(r#"{{"ok":false,"error":"failed to serialize response: {}"}}"#, e)
    })
}
