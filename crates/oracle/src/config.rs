//! Oracle configuration
//!
//! Every field has a serde default so partial JSON files work.

use lendcore_core::AccountId;
use serde::{Deserialize, Serialize};

/// Configuration for the price oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Symbol of the primary feed (the collateral asset)
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Price written to the primary feed at construction
    #[serde(default = "default_initial_price")]
    pub initial_price: u64,

    /// Fallback returned when a feed is stale. 0 disables the fallback:
    /// a stale feed then reads as 0, which consumers treat as "no price".
    #[serde(default = "default_base_price")]
    pub base_price: u64,

    /// A feed older than this many blocks is stale
    #[serde(default = "default_max_price_age")]
    pub max_price_age: u64,

    /// Largest accepted move per regular update, in percent
    #[serde(default = "default_price_change_limit")]
    pub price_change_limit_percent: u64,

    /// Owner (admin + emergency reset)
    #[serde(default = "default_owner")]
    pub owner: AccountId,

    /// Identities allowed to push regular updates
    #[serde(default = "default_updaters")]
    pub updaters: Vec<AccountId>,
}

fn default_symbol() -> String {
    "BTC".to_string()
}

fn default_initial_price() -> u64 {
    100
}

fn default_base_price() -> u64 {
    100
}

fn default_max_price_age() -> u64 {
    144 // ~1 day of 10 minute blocks
}

fn default_price_change_limit() -> u64 {
    20
}

fn default_owner() -> AccountId {
    AccountId::new_unchecked("OWNER")
}

fn default_updaters() -> Vec<AccountId> {
    vec![default_owner()]
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            initial_price: default_initial_price(),
            base_price: default_base_price(),
            max_price_age: default_max_price_age(),
            price_change_limit_percent: default_price_change_limit(),
            owner: default_owner(),
            updaters: default_updaters(),
        }
    }
}
