//! Price oracle implementation

use lendcore_core::math::percent_change;
use lendcore_core::{AccountId, BlockHeight};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::types::PriceFeed;

/// Price oracle
///
/// Owns every feed; state changes only through the methods below.
/// Reads take the current block so staleness is evaluated at call time.
#[derive(Debug, Clone)]
pub struct PriceOracle {
    primary: String,
    feeds: BTreeMap<String, PriceFeed>,
    base_price: u64,
    max_price_age: u64,
    price_change_limit: u64,
    owner: AccountId,
    updaters: BTreeSet<AccountId>,
}

impl PriceOracle {
    /// Build an oracle with its primary feed written at `now`
    pub fn new(config: OracleConfig, now: BlockHeight) -> Result<Self, OracleError> {
        let primary = normalize_symbol(&config.symbol);
        if config.initial_price == 0 {
            return Err(OracleError::invalid_price(&primary, "initial price must be > 0"));
        }

        let mut feeds = BTreeMap::new();
        feeds.insert(primary.clone(), PriceFeed::new(config.initial_price, now));

        Ok(Self {
            primary,
            feeds,
            base_price: config.base_price,
            max_price_age: config.max_price_age,
            price_change_limit: config.price_change_limit_percent,
            owner: config.owner,
            updaters: config.updaters.into_iter().collect(),
        })
    }

    // === Reads ===

    /// Symbol of the primary feed
    pub fn symbol(&self) -> &str {
        &self.primary
    }

    /// Current price of the primary feed.
    ///
    /// Never fails: a stale feed silently reads as the base price.
    /// Callers that need strict freshness must check [`Self::is_price_stale`].
    pub fn get_price(&self, now: BlockHeight) -> u64 {
        self.price_of(&self.primary, now).unwrap_or(self.base_price)
    }

    /// Current price of any registered feed, with the same fallback
    pub fn price_of(&self, symbol: &str, now: BlockHeight) -> Option<u64> {
        let feed = self.feeds.get(&normalize_symbol(symbol))?;
        if feed.is_stale(now, self.max_price_age) {
            Some(self.base_price)
        } else {
            Some(feed.price)
        }
    }

    pub fn is_price_stale(&self, now: BlockHeight) -> bool {
        self.primary_feed()
            .map_or(true, |feed| feed.is_stale(now, self.max_price_age))
    }

    /// Blocks since the primary feed was written
    pub fn price_age(&self, now: BlockHeight) -> u64 {
        self.primary_feed().map_or(0, |feed| feed.age(now))
    }

    pub fn feed(&self, symbol: &str) -> Option<&PriceFeed> {
        self.feeds.get(&normalize_symbol(symbol))
    }

    pub fn primary_feed(&self) -> Option<&PriceFeed> {
        self.feeds.get(&self.primary)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.feeds.keys().map(String::as_str)
    }

    pub fn base_price(&self) -> u64 {
        self.base_price
    }

    pub fn max_price_age(&self) -> u64 {
        self.max_price_age
    }

    pub fn price_change_limit(&self) -> u64 {
        self.price_change_limit
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn is_updater(&self, id: &AccountId) -> bool {
        self.updaters.contains(id)
    }

    // === Price writes ===

    /// Regular update of the primary feed
    pub fn update_price(
        &mut self,
        new_price: u64,
        caller: &AccountId,
        now: BlockHeight,
    ) -> Result<u64, OracleError> {
        let symbol = self.primary.clone();
        self.update_price_of(&symbol, new_price, caller, now)
    }

    /// Regular update of a named feed.
    ///
    /// Rejects a zero price and any move larger than the change limit
    /// relative to the stored (not fallback) price.
    pub fn update_price_of(
        &mut self,
        symbol: &str,
        new_price: u64,
        caller: &AccountId,
        now: BlockHeight,
    ) -> Result<u64, OracleError> {
        if !self.is_updater(caller) {
            return Err(OracleError::unauthorized(caller, "update prices"));
        }
        let symbol = normalize_symbol(symbol);
        if new_price == 0 {
            return Err(OracleError::invalid_price(&symbol, "price must be > 0"));
        }

        let limit = self.price_change_limit;
        let feed = self
            .feeds
            .get_mut(&symbol)
            .ok_or_else(|| OracleError::FeedNotFound {
                symbol: symbol.clone(),
            })?;

        let deviation = percent_change(feed.price, new_price)
            .ok_or_else(|| OracleError::invalid_price(&symbol, "cannot measure price change"))?;
        if deviation > limit {
            tracing::warn!(
                symbol = %symbol,
                old = feed.price,
                new = new_price,
                deviation,
                limit,
                "Price update rejected: change limit exceeded"
            );
            return Err(OracleError::invalid_price(
                &symbol,
                format!("change of {deviation}% exceeds limit of {limit}%"),
            ));
        }

        *feed = PriceFeed {
            price: new_price,
            last_updated_block: now,
            deviation_percent: deviation,
        };
        tracing::debug!(symbol = %symbol, price = new_price, deviation, block = %now, "Price updated");
        Ok(new_price)
    }

    /// Owner-only overwrite of the primary feed that skips the change limit
    pub fn emergency_price_reset(
        &mut self,
        new_price: u64,
        caller: &AccountId,
        now: BlockHeight,
    ) -> Result<u64, OracleError> {
        self.ensure_owner(caller, "reset prices")?;
        let symbol = self.primary.clone();
        if new_price == 0 {
            return Err(OracleError::invalid_price(&symbol, "price must be > 0"));
        }

        let previous = self.primary_feed().map_or(0, |feed| feed.price);
        let deviation = percent_change(previous, new_price).unwrap_or(0);
        self.feeds.insert(
            symbol.clone(),
            PriceFeed {
                price: new_price,
                last_updated_block: now,
                deviation_percent: deviation,
            },
        );
        tracing::warn!(symbol = %symbol, previous, price = new_price, caller = %caller, "Emergency price reset");
        Ok(new_price)
    }

    /// Owner-only registration of an additional feed
    pub fn register_feed(
        &mut self,
        symbol: &str,
        price: u64,
        caller: &AccountId,
        now: BlockHeight,
    ) -> Result<(), OracleError> {
        self.ensure_owner(caller, "register feeds")?;
        let symbol = normalize_symbol(symbol);
        if price == 0 {
            return Err(OracleError::invalid_price(&symbol, "price must be > 0"));
        }
        if self.feeds.contains_key(&symbol) {
            return Err(OracleError::FeedAlreadyExists { symbol });
        }
        self.feeds.insert(symbol, PriceFeed::new(price, now));
        Ok(())
    }

    // === Administration ===

    pub fn add_updater(&mut self, updater: AccountId, caller: &AccountId) -> Result<(), OracleError> {
        self.ensure_owner(caller, "add updaters")?;
        self.updaters.insert(updater);
        Ok(())
    }

    pub fn remove_updater(&mut self, updater: &AccountId, caller: &AccountId) -> Result<(), OracleError> {
        self.ensure_owner(caller, "remove updaters")?;
        self.updaters.remove(updater);
        Ok(())
    }

    pub fn set_max_price_age(&mut self, blocks: u64, caller: &AccountId) -> Result<(), OracleError> {
        self.ensure_owner(caller, "set max price age")?;
        self.max_price_age = blocks;
        Ok(())
    }

    pub fn set_price_change_limit(&mut self, percent: u64, caller: &AccountId) -> Result<(), OracleError> {
        self.ensure_owner(caller, "set price change limit")?;
        self.price_change_limit = percent;
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId, action: &'static str) -> Result<(), OracleError> {
        if *caller != self.owner {
            return Err(OracleError::unauthorized(caller, action));
        }
        Ok(())
    }
}

/// Feed keys are trimmed and uppercased on every write and lookup
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn oracle() -> PriceOracle {
        PriceOracle::new(OracleConfig::default(), BlockHeight::new(0)).unwrap()
    }

    #[test]
    fn test_fresh_price_returned() {
        let oracle = oracle();
        assert_eq!(oracle.get_price(BlockHeight::new(10)), 100);
        assert!(!oracle.is_price_stale(BlockHeight::new(10)));
        assert_eq!(oracle.price_age(BlockHeight::new(10)), 10);
    }

    #[test]
    fn test_stale_price_falls_back_to_base() {
        let config = OracleConfig {
            initial_price: 250,
            base_price: 90,
            max_price_age: 5,
            ..OracleConfig::default()
        };
        let oracle = PriceOracle::new(config, BlockHeight::new(0)).unwrap();

        assert_eq!(oracle.get_price(BlockHeight::new(4)), 250);
        assert_eq!(oracle.get_price(BlockHeight::new(5)), 90);
        assert!(oracle.is_price_stale(BlockHeight::new(5)));
    }

    #[test]
    fn test_update_requires_updater() {
        let mut oracle = oracle();
        let result = oracle.update_price(110, &id("mallory"), BlockHeight::new(1));
        assert!(matches!(result, Err(OracleError::Unauthorized { .. })));
        assert_eq!(oracle.get_price(BlockHeight::new(1)), 100);
    }

    #[test]
    fn test_update_rejects_zero_and_large_moves() {
        let mut oracle = oracle();
        let owner = id("owner");

        assert!(matches!(
            oracle.update_price(0, &owner, BlockHeight::new(1)),
            Err(OracleError::InvalidPrice { .. })
        ));
        assert!(matches!(
            oracle.update_price(121, &owner, BlockHeight::new(1)),
            Err(OracleError::InvalidPrice { .. })
        ));
        // Exactly at the limit is accepted
        assert_eq!(oracle.update_price(120, &owner, BlockHeight::new(1)), Ok(120));

        let feed = oracle.primary_feed().unwrap();
        assert_eq!(feed.deviation_percent, 20);
        assert_eq!(feed.last_updated_block, BlockHeight::new(1));
    }

    #[test]
    fn test_update_refreshes_staleness() {
        let mut oracle = oracle();
        let owner = id("owner");

        assert!(oracle.is_price_stale(BlockHeight::new(200)));
        oracle.update_price(105, &owner, BlockHeight::new(200)).unwrap();
        assert!(!oracle.is_price_stale(BlockHeight::new(200)));
        assert_eq!(oracle.get_price(BlockHeight::new(200)), 105);
    }

    #[test]
    fn test_emergency_reset_bypasses_limit() {
        let mut oracle = oracle();
        let owner = id("owner");

        assert!(matches!(
            oracle.emergency_price_reset(10, &id("feeder"), BlockHeight::new(1)),
            Err(OracleError::Unauthorized { .. })
        ));
        assert!(matches!(
            oracle.emergency_price_reset(0, &owner, BlockHeight::new(1)),
            Err(OracleError::InvalidPrice { .. })
        ));
        assert_eq!(oracle.emergency_price_reset(10, &owner, BlockHeight::new(1)), Ok(10));
        assert_eq!(oracle.get_price(BlockHeight::new(1)), 10);
        assert_eq!(oracle.primary_feed().unwrap().deviation_percent, 90);
    }

    #[test]
    fn test_updater_management() {
        let mut oracle = oracle();
        let owner = id("owner");
        let feeder = id("feeder");

        assert!(oracle.add_updater(feeder.clone(), &feeder).is_err());
        oracle.add_updater(feeder.clone(), &owner).unwrap();
        assert_eq!(oracle.update_price(101, &feeder, BlockHeight::new(1)), Ok(101));

        oracle.remove_updater(&feeder, &owner).unwrap();
        assert!(matches!(
            oracle.update_price(102, &feeder, BlockHeight::new(2)),
            Err(OracleError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_admin_setters_owner_only() {
        let mut oracle = oracle();
        let owner = id("owner");

        assert!(oracle.set_max_price_age(10, &id("bob")).is_err());
        assert!(oracle.set_price_change_limit(50, &id("bob")).is_err());

        oracle.set_max_price_age(10, &owner).unwrap();
        oracle.set_price_change_limit(50, &owner).unwrap();
        assert_eq!(oracle.max_price_age(), 10);
        assert_eq!(oracle.price_change_limit(), 50);
        assert_eq!(oracle.update_price(150, &owner, BlockHeight::new(1)), Ok(150));
    }

    #[test]
    fn test_secondary_feeds() {
        let mut oracle = oracle();
        let owner = id("owner");

        oracle.register_feed("eth", 3_000, &owner, BlockHeight::new(0)).unwrap();
        assert!(matches!(
            oracle.register_feed("ETH", 1, &owner, BlockHeight::new(0)),
            Err(OracleError::FeedAlreadyExists { .. })
        ));
        assert_eq!(oracle.price_of("ETH", BlockHeight::new(1)), Some(3_000));
        assert_eq!(oracle.price_of("DOGE", BlockHeight::new(1)), None);

        oracle.update_price_of("eth", 3_300, &owner, BlockHeight::new(2)).unwrap();
        assert_eq!(oracle.price_of("eth", BlockHeight::new(2)), Some(3_300));
        assert!(matches!(
            oracle.update_price_of("DOGE", 1, &owner, BlockHeight::new(2)),
            Err(OracleError::FeedNotFound { .. })
        ));

        let symbols: Vec<&str> = oracle.symbols().collect();
        assert_eq!(symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn test_symbol_lookup_normalized() {
        let mut oracle = oracle();
        let owner = id("owner");

        oracle.register_feed(" eth ", 3_000, &owner, BlockHeight::new(0)).unwrap();
        assert_eq!(oracle.price_of(" eth", BlockHeight::new(1)), Some(3_000));
        assert!(oracle.feed("Eth ").is_some());
        oracle.update_price_of(" ETH", 3_100, &owner, BlockHeight::new(1)).unwrap();
        assert_eq!(oracle.feed("eth").map(|f| f.price), Some(3_100));
    }

    #[test]
    fn test_zero_initial_price_rejected() {
        let config = OracleConfig {
            initial_price: 0,
            ..OracleConfig::default()
        };
        assert!(PriceOracle::new(config, BlockHeight::new(0)).is_err());
    }
}
