//! Core oracle types

use lendcore_core::BlockHeight;
use serde::{Deserialize, Serialize};

/// A single authoritative price for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFeed {
    /// Latest accepted price (always > 0)
    pub price: u64,
    /// Block the price was written at
    pub last_updated_block: BlockHeight,
    /// Percentage move of the latest write relative to the previous price
    pub deviation_percent: u64,
}

impl PriceFeed {
    pub fn new(price: u64, at: BlockHeight) -> Self {
        Self {
            price,
            last_updated_block: at,
            deviation_percent: 0,
        }
    }

    /// Blocks elapsed since the last write
    pub fn age(&self, now: BlockHeight) -> u64 {
        now.blocks_since(self.last_updated_block)
    }

    /// A feed is fresh while `age < max_age`
    pub fn is_stale(&self, now: BlockHeight, max_age: u64) -> bool {
        self.age(now) >= max_age
    }
}
