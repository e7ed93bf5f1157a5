//! Portfolio history and position storage.

use crate::quotes::StaticPriceFeed;
use crate::types::{Position, ValueSnapshot};
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies value history and positions for an account.
pub trait PortfolioSource {
    /// Daily valuations for the account, ordered by date ascending.
    fn value_history(&self, account_id: &str) -> Result<Vec<ValueSnapshot>>;

    /// Asset positions currently held by the account.
    fn positions(&self, account_id: &str) -> Result<Vec<Position>>;
}

/// Stored data for one account.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Daily valuations, ordered by date
    #[serde(default)]
    pub snapshots: Vec<ValueSnapshot>,
    /// Current positions
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// Whole portfolio data set.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PortfolioData {
    /// Accounts keyed by id
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountRecord>,
    /// Last known unit price per asset
    #[serde(default)]
    pub prices: HashMap<String, Decimal>,
}

impl PortfolioData {
    fn account(&self, account_id: &str) -> Result<&AccountRecord> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))
    }

    /// Record a daily valuation, replacing any existing one for the same date.
    ///
    /// Snapshots stay ordered by date.
    pub fn record_snapshot(&mut self, account_id: &str, snapshot: ValueSnapshot) {
        let snapshots = &mut self
            .accounts
            .entry(account_id.to_string())
            .or_default()
            .snapshots;

        match snapshots.binary_search_by_key(&snapshot.date, |s| s.date) {
            Ok(idx) => snapshots[idx] = snapshot,
            Err(idx) => snapshots.insert(idx, snapshot),
        }
    }

    /// Replace the positions of an account.
    pub fn set_positions(&mut self, account_id: &str, positions: Vec<Position>) {
        self.accounts
            .entry(account_id.to_string())
            .or_default()
            .positions = positions;
    }

    /// Set the last known price of an asset.
    pub fn set_price(&mut self, asset_id: impl Into<String>, price: Decimal) {
        self.prices.insert(asset_id.into(), price);
    }

    /// Account ids in sorted order.
    pub fn account_ids(&self) -> Vec<&str> {
        self.accounts.keys().map(String::as_str).collect()
    }

    /// A price feed serving the recorded prices.
    pub fn price_feed(&self) -> StaticPriceFeed {
        StaticPriceFeed::new(self.prices.clone())
    }
}

impl PortfolioSource for PortfolioData {
    fn value_history(&self, account_id: &str) -> Result<Vec<ValueSnapshot>> {
        Ok(self.account(account_id)?.snapshots.clone())
    }

    fn positions(&self, account_id: &str) -> Result<Vec<Position>> {
        Ok(self.account(account_id)?.positions.clone())
    }
}

/// Portfolio source held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPortfolioStore {
    data: PortfolioData,
}

impl InMemoryPortfolioStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over existing data.
    pub fn from_data(data: PortfolioData) -> Self {
        Self { data }
    }

    /// Get a reference to the stored data.
    pub fn get(&self) -> &PortfolioData {
        &self.data
    }

    /// Get a mutable reference to the stored data.
    pub fn get_mut(&mut self) -> &mut PortfolioData {
        &mut self.data
    }
}

impl PortfolioSource for InMemoryPortfolioStore {
    fn value_history(&self, account_id: &str) -> Result<Vec<ValueSnapshot>> {
        self.data.value_history(account_id)
    }

    fn positions(&self, account_id: &str) -> Result<Vec<Position>> {
        self.data.positions(account_id)
    }
}

/// Portfolio source persisted as a JSON file.
#[derive(Debug)]
pub struct JsonPortfolioStore {
    /// Path to the portfolio JSON file
    path: PathBuf,
    /// In-memory copy of the file
    data: PortfolioData,
}

impl JsonPortfolioStore {
    /// Open the store at the default path.
    ///
    /// Default path: `~/.folio/portfolio.json`
    /// Can be overridden with the `FOLIO_PORTFOLIO_FILE` environment variable.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path())
    }

    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = Self::load_from_path(&path)?;
        Ok(Self { path, data })
    }

    /// Get the default portfolio file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FOLIO_PORTFOLIO_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".folio/portfolio.json"))
            .unwrap_or_else(|| PathBuf::from("portfolio.json"))
    }

    /// Get the current path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_path(path: &Path) -> Result<PortfolioData> {
        if !path.exists() {
            tracing::debug!("Portfolio file {} not found, starting empty", path.display());
            return Ok(PortfolioData::default());
        }

        let content = fs::read_to_string(path)?;
        let data: PortfolioData = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded {} account(s) from {}",
            data.accounts.len(),
            path.display()
        );
        Ok(data)
    }

    /// Save the current data to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Reload the data from disk.
    pub fn reload(&mut self) -> Result<()> {
        self.data = Self::load_from_path(&self.path)?;
        Ok(())
    }

    /// Get a reference to the current data.
    pub fn get(&self) -> &PortfolioData {
        &self.data
    }

    /// Get a mutable reference to the current data.
    pub fn get_mut(&mut self) -> &mut PortfolioData {
        &mut self.data
    }
}

impl PortfolioSource for JsonPortfolioStore {
    fn value_history(&self, account_id: &str) -> Result<Vec<ValueSnapshot>> {
        self.data.value_history(account_id)
    }

    fn positions(&self, account_id: &str) -> Result<Vec<Position>> {
        self.data.positions(account_id)
    }
}
