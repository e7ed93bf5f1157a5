//! Asset pricing.
//!
//! A `PriceFeed` supplies unit prices; `CachedPriceFeed` puts a `PriceCache`
//! in front of any feed so repeated lookups within the TTL stay local.

mod cache;

pub use cache::PriceCache;

use crate::types::{Holding, Position};
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Source of current unit prices.
pub trait PriceFeed {
    /// Current price of one unit of `asset_id`.
    fn price(&mut self, asset_id: &str) -> Result<Decimal>;
}

/// Fixed price table, e.g. the prices recorded alongside a portfolio file.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    prices: HashMap<String, Decimal>,
}

impl StaticPriceFeed {
    /// Create a feed from a price table.
    pub fn new(prices: HashMap<String, Decimal>) -> Self {
        Self { prices }
    }

    /// Set the price of an asset.
    pub fn set(&mut self, asset_id: impl Into<String>, price: Decimal) {
        self.prices.insert(asset_id.into(), price);
    }
}

impl PriceFeed for StaticPriceFeed {
    fn price(&mut self, asset_id: &str) -> Result<Decimal> {
        self.prices
            .get(asset_id)
            .copied()
            .ok_or_else(|| Error::PriceUnavailable(asset_id.to_string()))
    }
}

/// A price feed fronted by a TTL cache.
#[derive(Debug)]
pub struct CachedPriceFeed<F> {
    inner: F,
    cache: PriceCache,
}

impl<F: PriceFeed> CachedPriceFeed<F> {
    /// Wrap `inner` with the given cache.
    pub fn new(inner: F, cache: PriceCache) -> Self {
        Self { inner, cache }
    }

    /// The cache in front of the feed.
    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Mutable access to the cache, e.g. to invalidate an asset.
    pub fn cache_mut(&mut self) -> &mut PriceCache {
        &mut self.cache
    }

    /// The wrapped feed.
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: PriceFeed> PriceFeed for CachedPriceFeed<F> {
    fn price(&mut self, asset_id: &str) -> Result<Decimal> {
        if let Some(price) = self.cache.get(asset_id) {
            tracing::trace!("Price cache hit: {}", asset_id);
            return Ok(price);
        }

        let price = self.inner.price(asset_id)?;
        tracing::debug!("Price cache miss: {} = {}", asset_id, price);
        self.cache.insert(asset_id, price);
        Ok(price)
    }
}

/// Value each position at its current price.
pub fn mark_positions<F: PriceFeed + ?Sized>(
    positions: &[Position],
    feed: &mut F,
) -> Result<Vec<Holding>> {
    positions
        .iter()
        .map(|position| -> Result<Holding> {
            Ok(position.mark(feed.price(&position.asset_id)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    /// Feed that counts how often it is asked.
    struct CountingFeed {
        calls: usize,
    }

    impl PriceFeed for CountingFeed {
        fn price(&mut self, asset_id: &str) -> Result<Decimal> {
            self.calls += 1;
            match asset_id {
                "bitcoin" => Ok(dec!(60000)),
                "ethereum" => Ok(dec!(3000)),
                other => Err(Error::PriceUnavailable(other.to_string())),
            }
        }
    }

    #[test]
    fn test_static_feed() {
        let mut feed = StaticPriceFeed::default();
        feed.set("bitcoin", dec!(60000));

        assert_eq!(feed.price("bitcoin").unwrap(), dec!(60000));
        assert!(matches!(
            feed.price("dogecoin"),
            Err(Error::PriceUnavailable(_))
        ));
    }

    #[test]
    fn test_cached_feed_hits_inner_once() {
        let mut feed = CachedPriceFeed::new(CountingFeed { calls: 0 }, PriceCache::default());

        assert_eq!(feed.price("bitcoin").unwrap(), dec!(60000));
        assert_eq!(feed.price("bitcoin").unwrap(), dec!(60000));
        assert_eq!(feed.price("ethereum").unwrap(), dec!(3000));

        assert_eq!(feed.inner().calls, 2);
        assert_eq!(feed.cache().len(), 2);
    }

    #[test]
    fn test_cached_feed_zero_ttl_always_refetches() {
        let mut feed = CachedPriceFeed::new(
            CountingFeed { calls: 0 },
            PriceCache::new(Duration::zero()),
        );

        feed.price("bitcoin").unwrap();
        feed.price("bitcoin").unwrap();
        assert_eq!(feed.inner().calls, 2);
    }

    #[test]
    fn test_cached_feed_does_not_cache_errors() {
        let mut feed = CachedPriceFeed::new(CountingFeed { calls: 0 }, PriceCache::default());

        assert!(feed.price("dogecoin").is_err());
        assert!(feed.cache().is_empty());
    }

    #[test]
    fn test_cached_feed_invalidate() {
        let mut feed = CachedPriceFeed::new(CountingFeed { calls: 0 }, PriceCache::default());
        feed.price("bitcoin").unwrap();
        feed.cache_mut().invalidate("bitcoin");
        feed.price("bitcoin").unwrap();

        assert_eq!(feed.inner().calls, 2);
    }

    #[test]
    fn test_mark_positions() {
        let mut feed = CachedPriceFeed::new(CountingFeed { calls: 0 }, PriceCache::default());
        let positions = vec![
            Position::new("bitcoin", dec!(0.5)),
            Position::new("ethereum", dec!(2)),
        ];

        let holdings = mark_positions(&positions, &mut feed).unwrap();

        assert_eq!(holdings[0], Holding::new("bitcoin", dec!(30000)));
        assert_eq!(holdings[1], Holding::new("ethereum", dec!(6000)));
    }

    #[test]
    fn test_mark_positions_missing_price() {
        let mut feed = StaticPriceFeed::default();
        let positions = vec![Position::new("bitcoin", dec!(1))];

        let result = mark_positions(&positions, &mut feed);
        assert!(matches!(result, Err(Error::PriceUnavailable(_))));
    }
}
