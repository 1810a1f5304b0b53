//! Lendcore Core - Domain types and safe arithmetic
//!
//! This crate contains the fundamental types used across Lendcore:
//! - `AccountId`: Caller / position owner identity
//! - `BlockHeight`: Host-provided logical clock
//! - `math`: Overflow-checked integer helpers shared by every component

pub mod account;
pub mod block;
pub mod math;

pub use account::{AccountId, AccountIdError};
pub use block::BlockHeight;
