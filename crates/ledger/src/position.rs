//! Position records

use lendcore_core::BlockHeight;
use serde::{Deserialize, Serialize};

/// One account's position.
///
/// Records are values: operations build a new `Position` and hand the whole
/// record to the ledger, never patching single fields in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub collateral: u64,
    pub debt: u64,
    pub last_updated: BlockHeight,
}

impl Position {
    pub fn new(collateral: u64, debt: u64, last_updated: BlockHeight) -> Self {
        Self {
            collateral,
            debt,
            last_updated,
        }
    }

    /// Empty positions are not stored
    pub fn is_empty(&self) -> bool {
        self.collateral == 0 && self.debt == 0
    }

    /// Copy of this record with new collateral, stamped at `at`
    pub fn with_collateral(&self, collateral: u64, at: BlockHeight) -> Self {
        Self::new(collateral, self.debt, at)
    }

    /// Copy of this record with new debt, stamped at `at`
    pub fn with_debt(&self, debt: u64, at: BlockHeight) -> Self {
        Self::new(self.collateral, debt, at)
    }
}

/// Snapshot of the protocol-wide aggregates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_collateral: u64,
    pub total_debt: u64,
    pub paused: bool,
    pub open_positions: usize,
}
