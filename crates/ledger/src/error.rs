//! Ledger errors

use thiserror::Error;

/// Errors that can occur in ledger writes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Aggregate {field} would overflow: current {current}, delta +{delta}")]
    AggregateOverflow {
        field: &'static str,
        current: u64,
        delta: u64,
    },

    #[error("Aggregate {field} would underflow: current {current}, delta -{delta}")]
    AggregateUnderflow {
        field: &'static str,
        current: u64,
        delta: u64,
    },

    #[error("Aggregate {field} out of sync: recorded {recorded}, actual {actual}")]
    AggregateMismatch {
        field: &'static str,
        recorded: u64,
        actual: u128,
    },
}
