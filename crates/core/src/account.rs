//! AccountId - Validated caller / position owner identity
//!
//! Identities are opaque to the core; the host decides what they mean
//! (a principal, a wallet address, a user name). We only normalise and
//! bound them so they are safe to use as map keys and log fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted identity length
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Errors that can occur when parsing an account identity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Empty account id")]
    Empty,

    #[error("Account id too long (max 64 chars): {0}")]
    TooLong(String),

    #[error("Invalid account id format: {0}")]
    InvalidFormat(String),
}

/// Account identity.
///
/// Normalised to upper case. Allowed characters are ASCII alphanumerics
/// plus `.`, `-` and `_`.
///
/// # Examples
/// ```
/// use lendcore_core::AccountId;
///
/// let alice: AccountId = "alice".parse().unwrap();
/// assert_eq!(alice.as_str(), "ALICE");
///
/// assert!("".parse::<AccountId>().is_err());
/// assert!("bad id".parse::<AccountId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parse and normalise an identity
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountIdError> {
        id.as_ref().parse()
    }

    /// Create an identity without validation.
    ///
    /// The caller MUST pass an already upper-case, well-formed id.
    /// Use only for trusted sources (e.g. built-in configuration defaults).
    #[inline]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(AccountIdError::Empty);
        }

        if s.len() > MAX_ACCOUNT_ID_LEN {
            return Err(AccountIdError::TooLong(s));
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(AccountIdError::InvalidFormat(s));
        }

        Ok(AccountId(s))
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}
