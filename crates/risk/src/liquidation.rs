//! Liquidation quotes
//!
//! Liquidation here is always full: the whole position is closed, all of its
//! collateral is seized and all of its debt is cleared. The penalty is a
//! reported figure; moving it to anyone is settlement's job, not ours.

use lendcore_core::math::percent_of;
use serde::{Deserialize, Serialize};

use crate::engine::is_liquidatable;

/// Outcome of liquidating one position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationQuote {
    /// Collateral taken from the position (all of it)
    pub collateral_seized: u64,
    /// Debt written off the position (all of it)
    pub debt_cleared: u64,
    /// `collateral_seized * penalty% / 100`, reported only
    pub penalty: u64,
}

/// Quote a liquidation, or `None` if the position is not liquidatable
pub fn quote(
    collateral: u64,
    debt: u64,
    price: u64,
    threshold_percent: u64,
    penalty_percent: u64,
) -> Option<LiquidationQuote> {
    if !is_liquidatable(collateral, debt, price, threshold_percent) {
        return None;
    }
    Some(LiquidationQuote {
        collateral_seized: collateral,
        debt_cleared: debt,
        // A zero here may also mean the product overflowed; the figure is
        // informational so the degraded value is acceptable.
        penalty: percent_of(collateral, penalty_percent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_solvent_position() {
        assert_eq!(quote(1_000_000, 800_000, 100, 120, 10), None);
        assert_eq!(quote(1_000, 0, 1, 120, 10), None);
    }

    #[test]
    fn test_quote_underwater_position() {
        let q = quote(1_000, 60_000, 70, 120, 10).unwrap();
        assert_eq!(q.collateral_seized, 1_000);
        assert_eq!(q.debt_cleared, 60_000);
        assert_eq!(q.penalty, 100);
    }

    #[test]
    fn test_quote_zero_collateral() {
        let q = quote(0, 5, 100, 120, 10).unwrap();
        assert_eq!(q.collateral_seized, 0);
        assert_eq!(q.penalty, 0);
    }
}
