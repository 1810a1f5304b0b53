//! Position ledger
//!
//! Holds every open position and the aggregates derived from them.
//! `commit` is the only write path for positions.

use lendcore_core::AccountId;
use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::position::{Position, Stats};

/// Per-account positions plus protocol-wide aggregates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionLedger {
    positions: BTreeMap<AccountId, Position>,
    total_collateral: u64,
    total_debt: u64,
    paused: bool,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // === Reads ===

    /// Position for an account (zero default if none is stored)
    pub fn get(&self, account: &AccountId) -> Position {
        self.positions.get(account).copied().unwrap_or_default()
    }

    /// Stored position, `None` for accounts that are empty
    pub fn position(&self, account: &AccountId) -> Option<&Position> {
        self.positions.get(account)
    }

    pub fn collateral(&self, account: &AccountId) -> u64 {
        self.get(account).collateral
    }

    pub fn debt(&self, account: &AccountId) -> u64 {
        self.get(account).debt
    }

    pub fn total_collateral(&self) -> u64 {
        self.total_collateral
    }

    pub fn total_debt(&self) -> u64 {
        self.total_debt
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of non-empty positions
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All stored positions, ordered by account
    pub fn positions(&self) -> impl Iterator<Item = (&AccountId, &Position)> {
        self.positions.iter()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total_collateral: self.total_collateral,
            total_debt: self.total_debt,
            paused: self.paused,
            open_positions: self.positions.len(),
        }
    }

    // === Writes ===

    /// Replace an account's position and move the aggregates by the delta.
    ///
    /// Either both the record and the aggregates change, or nothing does.
    /// An empty record removes the account. Returns the previous record.
    pub fn commit(&mut self, account: &AccountId, next: Position) -> Result<Position, LedgerError> {
        let prev = self.get(account);

        let total_collateral =
            apply_delta("total_collateral", self.total_collateral, prev.collateral, next.collateral)?;
        let total_debt = apply_delta("total_debt", self.total_debt, prev.debt, next.debt)?;

        if next.is_empty() {
            self.positions.remove(account);
        } else {
            self.positions.insert(account.clone(), next);
        }
        self.total_collateral = total_collateral;
        self.total_debt = total_debt;

        tracing::trace!(
            account = %account,
            collateral = next.collateral,
            debt = next.debt,
            total_collateral,
            total_debt,
            "Position committed"
        );
        Ok(prev)
    }

    /// Remove an account's position entirely, returning what it held
    pub fn close(&mut self, account: &AccountId) -> Result<Position, LedgerError> {
        self.commit(account, Position::default())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Recompute aggregates from positions and compare with the recorded ones
    pub fn verify_aggregates(&self) -> Result<(), LedgerError> {
        let (collateral, debt) = self
            .positions
            .values()
            .fold((0u128, 0u128), |(c, d), p| (c + p.collateral as u128, d + p.debt as u128));

        if collateral != self.total_collateral as u128 {
            return Err(LedgerError::AggregateMismatch {
                field: "total_collateral",
                recorded: self.total_collateral,
                actual: collateral,
            });
        }
        if debt != self.total_debt as u128 {
            return Err(LedgerError::AggregateMismatch {
                field: "total_debt",
                recorded: self.total_debt,
                actual: debt,
            });
        }
        Ok(())
    }
}

/// `total - prev + next`, checked in the direction of the move
fn apply_delta(field: &'static str, total: u64, prev: u64, next: u64) -> Result<u64, LedgerError> {
    if next >= prev {
        let delta = next - prev;
        total.checked_add(delta).ok_or(LedgerError::AggregateOverflow {
            field,
            current: total,
            delta,
        })
    } else {
        let delta = prev - next;
        total.checked_sub(delta).ok_or(LedgerError::AggregateUnderflow {
            field,
            current: total,
            delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendcore_core::BlockHeight;
    use proptest::prelude::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn pos(collateral: u64, debt: u64) -> Position {
        Position::new(collateral, debt, BlockHeight::new(1))
    }

    #[test]
    fn test_commit_updates_aggregates() {
        let mut ledger = PositionLedger::new();
        let alice = id("alice");
        let bob = id("bob");

        ledger.commit(&alice, pos(1_000, 0)).unwrap();
        ledger.commit(&bob, pos(500, 100)).unwrap();
        ledger.commit(&alice, pos(800, 300)).unwrap();

        assert_eq!(ledger.total_collateral(), 1_300);
        assert_eq!(ledger.total_debt(), 400);
        assert_eq!(ledger.collateral(&alice), 800);
        assert_eq!(ledger.debt(&bob), 100);
        assert!(ledger.verify_aggregates().is_ok());
    }

    #[test]
    fn test_empty_commit_removes_position() {
        let mut ledger = PositionLedger::new();
        let alice = id("alice");

        ledger.commit(&alice, pos(1_000, 10)).unwrap();
        let prev = ledger.close(&alice).unwrap();

        assert_eq!(prev, pos(1_000, 10));
        assert!(ledger.position(&alice).is_none());
        assert_eq!(ledger.get(&alice), Position::default());
        assert_eq!(ledger.stats().open_positions, 0);
        assert_eq!(ledger.total_collateral(), 0);
        assert_eq!(ledger.total_debt(), 0);
    }

    #[test]
    fn test_overflow_leaves_state_unchanged() {
        let mut ledger = PositionLedger::new();
        let alice = id("alice");
        let bob = id("bob");

        ledger.commit(&alice, pos(u64::MAX - 5, 0)).unwrap();
        let before = ledger.clone();

        let result = ledger.commit(&bob, pos(10, 0));
        assert!(matches!(result, Err(LedgerError::AggregateOverflow { .. })));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_pause_flag_in_stats() {
        let mut ledger = PositionLedger::new();
        assert!(!ledger.stats().paused);
        ledger.set_paused(true);
        assert!(ledger.is_paused());
        assert!(ledger.stats().paused);
    }

    proptest! {
        #[test]
        fn test_aggregates_track_any_commit_sequence(
            writes in proptest::collection::vec((0usize..4, 0u64..1_000_000, 0u64..1_000_000), 1..50)
        ) {
            let accounts = [id("a"), id("b"), id("c"), id("d")];
            let mut ledger = PositionLedger::new();

            for (idx, collateral, debt) in writes {
                ledger.commit(&accounts[idx], pos(collateral, debt)).unwrap();
                prop_assert!(ledger.verify_aggregates().is_ok());
            }
        }
    }
}
