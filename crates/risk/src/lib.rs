//! Lendcore Risk Engine
//!
//! Side-effect-free functions that decide whether a (collateral, debt,
//! price) triple is solvent, liquidatable, and how healthy it is.
//! The protocol layer calls these against a projected post-state before
//! committing anything to the ledger.

pub mod engine;
pub mod interest;
pub mod liquidation;

pub use engine::{
    collateral_value, health_factor, is_liquidatable, is_solvent, max_borrowable,
    required_collateral, HEALTH_FACTOR_SCALE,
};
pub use interest::InterestCalculator;
pub use liquidation::LiquidationQuote;
