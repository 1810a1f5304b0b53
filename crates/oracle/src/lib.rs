//! Lendcore Price Oracle
//!
//! Holds named price feeds stamped with the block they were written at.
//! Reads never fail: a feed older than `max_price_age` blocks reads as the
//! configured base price. Writes are rate-limited by a maximum percentage
//! move per update, with an owner-only emergency reset that bypasses it.

mod config;
mod error;
mod oracle;
mod types;

pub use config::OracleConfig;
pub use error::OracleError;
pub use oracle::{normalize_symbol, PriceOracle};
pub use types::PriceFeed;
