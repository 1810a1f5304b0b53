//! Lendcore Ledger - Source of truth for positions
//!
//! All collateral/debt state lives here. Writes replace a whole
//! `Position` record and move the protocol aggregates by the same delta in
//! one step, so `total_collateral == Σ collateral` and
//! `total_debt == Σ debt` hold after every commit.
//!
//! # Key Types
//! - `Position`: One account's collateral, debt and last-touched block
//! - `PositionLedger`: All positions plus aggregates and the pause flag
//! - `Stats`: Read-only snapshot of the aggregates

pub mod error;
pub mod ledger;
pub mod position;

pub use error::LedgerError;
pub use ledger::PositionLedger;
pub use position::{Position, Stats};
