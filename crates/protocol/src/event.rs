//! Protocol events
//!
//! One record per committed state change, for hosts that index or relay
//! them. Failed operations never emit.

use lendcore_core::{AccountId, BlockHeight};
use lendcore_risk::LiquidationQuote;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Governable parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    MinCollateralRatio,
    LiquidationThreshold,
    LiquidationPenalty,
    MaxLoanAmount,
    MaxPriceAge,
    PriceChangeLimit,
}

/// A committed state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProtocolEvent {
    Deposit {
        account: AccountId,
        amount: u64,
        collateral: u64,
    },
    Borrow {
        account: AccountId,
        amount: u64,
        debt: u64,
        price: u64,
    },
    Repay {
        account: AccountId,
        amount: u64,
        debt: u64,
    },
    Withdraw {
        account: AccountId,
        amount: u64,
        collateral: u64,
    },
    Liquidation {
        account: AccountId,
        liquidator: AccountId,
        price: u64,
        #[serde(flatten)]
        quote: LiquidationQuote,
    },
    PauseToggled {
        paused: bool,
        by: AccountId,
    },
    PriceUpdated {
        symbol: String,
        price: u64,
        emergency: bool,
        by: AccountId,
    },
    FeedRegistered {
        symbol: String,
        price: u64,
        by: AccountId,
    },
    ParameterChanged {
        parameter: Parameter,
        value: u64,
        by: AccountId,
    },
}

/// Event stamped with the block it was committed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub block: BlockHeight,
    #[serde(flatten)]
    pub event: ProtocolEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let record = EventRecord {
            block: BlockHeight::new(7),
            event: ProtocolEvent::Repay {
                account: AccountId::new("alice").unwrap(),
                amount: 10,
                debt: 0,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"], "repay");
        assert_eq!(json["block"], 7);
        assert_eq!(json["account"], "ALICE");
    }

    #[test]
    fn test_parameter_display() {
        assert_eq!(Parameter::MaxLoanAmount.to_string(), "max_loan_amount");
        assert_eq!(
            "liquidation_threshold".parse::<Parameter>().unwrap(),
            Parameter::LiquidationThreshold
        );
    }
}
