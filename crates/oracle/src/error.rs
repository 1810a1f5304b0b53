//! Oracle error types

use lendcore_core::AccountId;
use thiserror::Error;

/// Oracle-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Caller lacks the role required for the action
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized {
        caller: AccountId,
        action: &'static str,
    },

    /// Price update rejected by validation
    #[error("Invalid price for {symbol}: {reason}")]
    InvalidPrice { symbol: String, reason: String },

    /// No feed registered under the symbol
    #[error("Price feed not found: {symbol}")]
    FeedNotFound { symbol: String },

    /// A feed is already registered under the symbol
    #[error("Price feed already registered: {symbol}")]
    FeedAlreadyExists { symbol: String },
}

impl OracleError {
    pub(crate) fn unauthorized(caller: &AccountId, action: &'static str) -> Self {
        OracleError::Unauthorized {
            caller: caller.clone(),
            action,
        }
    }

    pub(crate) fn invalid_price(symbol: &str, reason: impl Into<String>) -> Self {
        OracleError::InvalidPrice {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
