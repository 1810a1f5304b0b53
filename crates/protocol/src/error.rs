//! Protocol errors
//!
//! Every failure carries enough context to log; `kind()` collapses it to
//! the stable taxonomy callers match on.

use lendcore_core::AccountId;
use lendcore_ledger::LedgerError;
use lendcore_oracle::OracleError;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Stable error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the role, or the protocol is paused
    Unauthorized,
    /// Zero or out-of-range quantity
    InvalidAmount,
    /// Solvency check failed
    InsufficientCollateral,
    LoanLimitExceeded,
    /// No usable price
    OracleFailure,
    /// Operation needs existing debt that is absent
    PositionNotFound,
    /// Liquidation attempted on a healthy position
    NotLiquidatable,
    /// Oracle update failed validation
    InvalidPrice,
}

/// Errors returned by protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized {
        caller: AccountId,
        action: &'static str,
    },

    #[error("Protocol is paused")]
    Paused,

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Insufficient collateral for {account}: available {available}, required {required}")]
    InsufficientCollateral {
        account: AccountId,
        available: u64,
        required: u64,
    },

    #[error("Loan limit exceeded: requested {requested}, limit {limit}")]
    LoanLimitExceeded { requested: u64, limit: u64 },

    #[error("Oracle failure: {reason}")]
    OracleFailure { reason: String },

    #[error("No open debt for {account}")]
    PositionNotFound { account: AccountId },

    #[error("Position of {account} is not liquidatable (health factor {health_factor:?})")]
    NotLiquidatable {
        account: AccountId,
        health_factor: Option<u64>,
    },

    #[error("Invalid price for {symbol}: {reason}")]
    InvalidPrice { symbol: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl ProtocolError {
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        ProtocolError::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::Unauthorized { .. } | ProtocolError::Paused => ErrorKind::Unauthorized,
            ProtocolError::InvalidAmount { .. }
            | ProtocolError::InvalidConfig(_)
            | ProtocolError::Ledger(_) => ErrorKind::InvalidAmount,
            ProtocolError::InsufficientCollateral { .. } => ErrorKind::InsufficientCollateral,
            ProtocolError::LoanLimitExceeded { .. } => ErrorKind::LoanLimitExceeded,
            ProtocolError::OracleFailure { .. } => ErrorKind::OracleFailure,
            ProtocolError::PositionNotFound { .. } => ErrorKind::PositionNotFound,
            ProtocolError::NotLiquidatable { .. } => ErrorKind::NotLiquidatable,
            ProtocolError::InvalidPrice { .. } => ErrorKind::InvalidPrice,
        }
    }
}

impl From<OracleError> for ProtocolError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Unauthorized { caller, action } => {
                ProtocolError::Unauthorized { caller, action }
            }
            OracleError::InvalidPrice { symbol, reason } => {
                ProtocolError::InvalidPrice { symbol, reason }
            }
            OracleError::FeedNotFound { symbol } => ProtocolError::OracleFailure {
                reason: format!("no feed for {symbol}"),
            },
            OracleError::FeedAlreadyExists { symbol } => ProtocolError::InvalidPrice {
                symbol,
                reason: "feed already registered".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_is_unauthorized() {
        assert_eq!(ProtocolError::Paused.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::InsufficientCollateral.to_string(), "insufficient_collateral");
        assert_eq!("not_liquidatable".parse::<ErrorKind>().unwrap(), ErrorKind::NotLiquidatable);
    }

    #[test]
    fn test_oracle_error_mapping() {
        let caller = AccountId::new("eve").unwrap();
        let err: ProtocolError = OracleError::Unauthorized {
            caller,
            action: "update prices",
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err: ProtocolError = OracleError::InvalidPrice {
            symbol: "BTC".to_string(),
            reason: "price must be > 0".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidPrice);
        assert!(err.to_string().contains("BTC"));
    }

    #[test]
    fn test_ledger_error_is_invalid_amount() {
        let err: ProtocolError = LedgerError::AggregateOverflow {
            field: "total_collateral",
            current: u64::MAX,
            delta: 1,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    }
}
