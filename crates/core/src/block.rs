//! BlockHeight - Logical clock supplied by the host environment

use serde::{Deserialize, Serialize};
use std::fmt;

/// Height of the host chain / sequencer at the time of a call.
///
/// The core never reads wall-clock time. Staleness and `last_updated`
/// stamps are all expressed in blocks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    pub const GENESIS: Self = Self(0);

    #[inline]
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Number of blocks elapsed since `earlier` (0 if `earlier` is in the future)
    pub fn blocks_since(&self, earlier: BlockHeight) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Advance by `blocks`, saturating at `u64::MAX`
    pub fn advance(&self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}
