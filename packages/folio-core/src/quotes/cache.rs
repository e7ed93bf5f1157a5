//! In-memory price cache with TTL.
//!
//! The cache is a plain value owned by whoever prices positions, so two
//! analyzers never share entries unless they are handed the same cache.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::config::DEFAULT_PRICE_CACHE_TTL_SECS;

/// Cache entry for one asset price.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedPrice {
    price: Decimal,
    cached_at: DateTime<Utc>,
}

/// Asset prices keyed by asset id, valid for a fixed lifetime.
#[derive(Debug, Clone)]
pub struct PriceCache {
    ttl: Duration,
    entries: HashMap<String, CachedPrice>,
}

impl PriceCache {
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh price.
    pub fn get(&self, asset_id: &str) -> Option<Decimal> {
        self.get_at(asset_id, Utc::now())
    }

    /// Get a price that is still fresh at `now`.
    pub fn get_at(&self, asset_id: &str, now: DateTime<Utc>) -> Option<Decimal> {
        self.entries
            .get(asset_id)
            .filter(|entry| now - entry.cached_at < self.ttl)
            .map(|entry| entry.price)
    }

    /// Store a price as of now.
    pub fn insert(&mut self, asset_id: impl Into<String>, price: Decimal) {
        self.insert_at(asset_id, price, Utc::now());
    }

    /// Store a price as of `now`, replacing any previous entry.
    pub fn insert_at(&mut self, asset_id: impl Into<String>, price: Decimal, now: DateTime<Utc>) {
        self.entries.insert(
            asset_id.into(),
            CachedPrice {
                price,
                cached_at: now,
            },
        );
    }

    /// Remove one asset's price.
    pub fn invalidate(&mut self, asset_id: &str) -> Option<Decimal> {
        self.entries.remove(asset_id).map(|entry| entry.price)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries that are stale at `now`, returning how many were removed.
    pub fn purge_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.cached_at < ttl);
        before - self.entries.len()
    }

    /// Number of entries, stale or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_PRICE_CACHE_TTL_SECS as i64))
    }
}
