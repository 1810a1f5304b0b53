//! Lendcore RPC - CLI orchestrator
//!
//! This crate provides the `lendcore` binary: it loads a protocol config,
//! replays a JSON script of operations against a fresh protocol instance
//! and reports each outcome.

pub mod commands;
pub mod context;

pub use commands::{load_script, run_script, RunReport, Step, StepReport};
pub use context::AppContext;
