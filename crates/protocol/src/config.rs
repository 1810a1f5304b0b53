//! Protocol configuration with configurable risk parameters
//!
//! Parameters load from a JSON file with per-field defaults; the owner can
//! change the risk parameters at runtime through the governance setters.

use lendcore_core::AccountId;
use lendcore_oracle::OracleConfig;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Configuration for the lending protocol
///
/// Defaults: borrow/withdraw need 150% collateral, liquidation below 120%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    // === Risk parameters (percent) ===
    /// Collateral ratio a position must keep after borrow/withdraw
    #[serde(default = "default_min_collateral_ratio")]
    pub min_collateral_ratio: u64,

    /// Ratio below which anyone may liquidate a position
    #[serde(default = "default_liquidation_threshold")]
    pub liquidation_threshold: u64,

    /// Penalty reported on liquidation, as percent of seized collateral
    #[serde(default = "default_liquidation_penalty")]
    pub liquidation_penalty: u64,

    // === Limits ===
    /// Largest single borrow
    #[serde(default = "default_max_loan_amount")]
    pub max_loan_amount: u64,

    // === Roles ===
    /// Owner: pause switch and governance setters
    #[serde(default = "default_owner")]
    pub owner: AccountId,

    // === Oracle ===
    /// When loaded with [`ProtocolConfig::from_json`], an oracle section
    /// without `owner` or `updaters` inherits the protocol owner for both.
    #[serde(default)]
    pub oracle: OracleConfig,
}

fn default_min_collateral_ratio() -> u64 {
    150
}

fn default_liquidation_threshold() -> u64 {
    120
}

fn default_liquidation_penalty() -> u64 {
    10
}

fn default_max_loan_amount() -> u64 {
    10_000_000
}

fn default_owner() -> AccountId {
    AccountId::new_unchecked("OWNER")
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            min_collateral_ratio: default_min_collateral_ratio(),
            liquidation_threshold: default_liquidation_threshold(),
            liquidation_penalty: default_liquidation_penalty(),
            max_loan_amount: default_max_loan_amount(),
            owner: default_owner(),
            oracle: OracleConfig::default(),
        }
    }
}

impl ProtocolConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        })
    }

    /// Parse configuration, handing oracle roles the file leaves unset to
    /// the protocol owner
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        let mut config: Self = serde_json::from_value(raw.clone())?;

        if raw.pointer("/oracle/owner").is_none() {
            config.oracle.owner = config.owner.clone();
        }
        if raw.pointer("/oracle/updaters").is_none() {
            config.oracle.updaters = vec![config.owner.clone()];
        }
        Ok(config)
    }

    /// Check the parameters are mutually consistent
    pub fn validate(&self) -> Result<(), ProtocolError> {
        check_ratios(self.min_collateral_ratio, self.liquidation_threshold)?;
        check_penalty(self.liquidation_penalty)?;
        if self.max_loan_amount == 0 {
            return Err(ProtocolError::invalid_amount("max_loan_amount must be > 0"));
        }
        if self.oracle.initial_price == 0 {
            return Err(ProtocolError::InvalidConfig(
                "oracle.initial_price must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// `0 < liquidation_threshold < min_collateral_ratio`
pub(crate) fn check_ratios(min_ratio: u64, threshold: u64) -> Result<(), ProtocolError> {
    if threshold == 0 {
        return Err(ProtocolError::invalid_amount("liquidation_threshold must be > 0"));
    }
    if threshold >= min_ratio {
        return Err(ProtocolError::invalid_amount(format!(
            "liquidation_threshold ({threshold}) must be below min_collateral_ratio ({min_ratio})"
        )));
    }
    Ok(())
}

pub(crate) fn check_penalty(penalty: u64) -> Result<(), ProtocolError> {
    if penalty > 100 {
        return Err(ProtocolError::invalid_amount(format!(
            "liquidation_penalty ({penalty}) must be at most 100"
        )));
    }
    Ok(())
}
