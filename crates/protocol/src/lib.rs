//! Lendcore Protocol - Collateralized lending operations
//!
//! `LendingProtocol` owns the position ledger and the price oracle and is
//! the only thing that mutates them. Every operation reads the ledger and
//! the price once, asks the risk engine whether the resulting state is
//! acceptable, and only then commits.
//!
//! # Flow
//! Pause check → Amount validation → Price read → Risk check → Commit → Event

pub mod config;
pub mod error;
pub mod event;
pub mod protocol;

pub use config::ProtocolConfig;
pub use error::{ErrorKind, ProtocolError};
pub use event::{EventRecord, Parameter, ProtocolEvent};
pub use protocol::LendingProtocol;

pub use lendcore_core::{AccountId, BlockHeight};
pub use lendcore_ledger::{Position, Stats};
pub use lendcore_oracle::OracleConfig;
pub use lendcore_risk::LiquidationQuote;
