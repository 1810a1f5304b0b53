//! Script commands
//!
//! A script is a JSON array of steps, each tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "deposit", "account": "alice", "amount": 1000 },
//!   { "op": "borrow", "account": "alice", "amount": 600 },
//!   { "op": "advance_blocks", "blocks": 10 },
//!   { "op": "stats" }
//! ]
//! ```

use lendcore_protocol::{
    AccountId, ErrorKind, EventRecord, LendingProtocol, Parameter, ProtocolError, Stats,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::context::AppContext;

/// One scripted call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Deposit { account: AccountId, amount: u64 },
    Borrow { account: AccountId, amount: u64 },
    Repay { account: AccountId, amount: u64 },
    Withdraw { account: AccountId, amount: u64 },
    Liquidate { liquidator: AccountId, account: AccountId },
    TogglePause { caller: AccountId },
    UpdatePrice { caller: AccountId, price: u64 },
    EmergencyPriceReset { caller: AccountId, price: u64 },
    RegisterFeed { caller: AccountId, symbol: String, price: u64 },
    UpdateFeedPrice { caller: AccountId, symbol: String, price: u64 },
    AddUpdater { caller: AccountId, updater: AccountId },
    RemoveUpdater { caller: AccountId, updater: AccountId },
    SetParameter {
        caller: AccountId,
        parameter: Parameter,
        value: u64,
    },
    AdvanceBlocks { blocks: u64 },
    Position { account: AccountId },
    Liquidatable,
    Stats,
}

impl Step {
    /// Short name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Step::Deposit { .. } => "deposit",
            Step::Borrow { .. } => "borrow",
            Step::Repay { .. } => "repay",
            Step::Withdraw { .. } => "withdraw",
            Step::Liquidate { .. } => "liquidate",
            Step::TogglePause { .. } => "toggle_pause",
            Step::UpdatePrice { .. } => "update_price",
            Step::EmergencyPriceReset { .. } => "emergency_price_reset",
            Step::RegisterFeed { .. } => "register_feed",
            Step::UpdateFeedPrice { .. } => "update_feed_price",
            Step::AddUpdater { .. } => "add_updater",
            Step::RemoveUpdater { .. } => "remove_updater",
            Step::SetParameter { .. } => "set_parameter",
            Step::AdvanceBlocks { .. } => "advance_blocks",
            Step::Position { .. } => "position",
            Step::Liquidatable => "liquidatable",
            Step::Stats => "stats",
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub ok: bool,
    pub block: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Events committed by this step
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRecord>,
}

/// Outcome of a whole script
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub steps: Vec<StepReport>,
    pub stats: Stats,
    pub price: u64,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }

    /// Kinds of failed steps, in order
    pub fn error_kinds(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| s.error_kind.as_deref())
            .collect()
    }
}

/// Read a script file
pub fn load_script(path: &Path) -> Result<Vec<Step>, anyhow::Error> {
    let content = std::fs::read_to_string(path)?;
    let steps = serde_json::from_str(&content)?;
    Ok(steps)
}

/// Run every step; with `fail_fast` stop at the first failure
pub fn run_script(ctx: &mut AppContext, steps: &[Step], fail_fast: bool) -> RunReport {
    let mut reports = Vec::with_capacity(steps.len());

    for (index, step) in steps.iter().enumerate() {
        let result = execute(ctx, step);
        let block = ctx.protocol.block_height().value();
        let events = ctx.protocol.take_events();

        let report = match result {
            Ok(output) => StepReport {
                index,
                op: step.name(),
                ok: true,
                block,
                output: Some(output),
                error_kind: None,
                error: None,
                events,
            },
            Err(err) => {
                tracing::debug!(run_id = ctx.run_id(), index, op = step.name(), error = %err, "Step failed");
                StepReport {
                    index,
                    op: step.name(),
                    ok: false,
                    block,
                    output: None,
                    error_kind: Some(err.kind().to_string()),
                    error: Some(err.to_string()),
                    events,
                }
            }
        };

        let failed = !report.ok;
        reports.push(report);
        if failed && fail_fast {
            break;
        }
    }

    RunReport {
        run_id: ctx.run_id().to_string(),
        steps: reports,
        stats: ctx.protocol.get_stats(),
        price: ctx.protocol.current_price(),
    }
}

/// Execute a single step against the protocol
pub fn execute(ctx: &mut AppContext, step: &Step) -> Result<Value, ProtocolError> {
    let proto = &mut ctx.protocol;

    let output = match step {
        Step::Deposit { account, amount } => json!(proto.deposit(account, *amount)?),
        Step::Borrow { account, amount } => json!(proto.borrow(account, *amount)?),
        Step::Repay { account, amount } => json!({ "repaid": proto.repay(account, *amount)? }),
        Step::Withdraw { account, amount } => json!(proto.withdraw(account, *amount)?),
        Step::Liquidate { liquidator, account } => json!(proto.liquidate(liquidator, account)?),
        Step::TogglePause { caller } => json!({ "paused": proto.toggle_pause(caller)? }),
        Step::UpdatePrice { caller, price } => json!({ "price": proto.update_price(caller, *price)? }),
        Step::EmergencyPriceReset { caller, price } => {
            json!({ "price": proto.emergency_price_reset(caller, *price)? })
        }
        Step::RegisterFeed {
            caller,
            symbol,
            price,
        } => {
            proto.register_price_feed(caller, symbol, *price)?;
            json!({ "symbol": symbol, "price": proto.price_of(symbol) })
        }
        Step::UpdateFeedPrice {
            caller,
            symbol,
            price,
        } => json!({ "symbol": symbol, "price": proto.update_feed_price(caller, symbol, *price)? }),
        Step::AddUpdater { caller, updater } => {
            proto.add_price_updater(caller, updater.clone())?;
            json!({ "updater": updater })
        }
        Step::RemoveUpdater { caller, updater } => {
            proto.remove_price_updater(caller, updater)?;
            json!({ "updater": updater })
        }
        Step::SetParameter {
            caller,
            parameter,
            value,
        } => {
            set_parameter(proto, caller, *parameter, *value)?;
            json!({ "parameter": parameter, "value": value })
        }
        Step::AdvanceBlocks { blocks } => json!({ "block": proto.advance_blocks(*blocks) }),
        Step::Position { account } => json!({
            "position": proto.get_position(account),
            "health_factor": proto.get_health_factor(account),
        }),
        Step::Liquidatable => {
            let rows: Vec<Value> = proto
                .liquidatable_positions()
                .into_iter()
                .map(|(account, position, hf)| {
                    json!({ "account": account, "position": position, "health_factor": hf })
                })
                .collect();
            Value::Array(rows)
        }
        Step::Stats => json!({
            "stats": proto.get_stats(),
            "price": proto.current_price(),
            "price_stale": proto.is_price_stale(),
        }),
    };

    Ok(output)
}

fn set_parameter(
    proto: &mut LendingProtocol,
    caller: &AccountId,
    parameter: Parameter,
    value: u64,
) -> Result<(), ProtocolError> {
    match parameter {
        Parameter::MinCollateralRatio => proto.set_min_collateral_ratio(caller, value),
        Parameter::LiquidationThreshold => proto.set_liquidation_threshold(caller, value),
        Parameter::LiquidationPenalty => proto.set_liquidation_penalty(caller, value),
        Parameter::MaxLoanAmount => proto.set_max_loan_amount(caller, value),
        Parameter::MaxPriceAge => proto.set_max_price_age(caller, value),
        Parameter::PriceChangeLimit => proto.set_price_change_limit(caller, value),
    }
}

/// Whether a failure kind is expected in normal operation (vs. a script bug)
pub fn is_business_rejection(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::InsufficientCollateral
            | ErrorKind::LoanLimitExceeded
            | ErrorKind::NotLiquidatable
            | ErrorKind::PositionNotFound
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_json_shape() {
        let json = r#"[
            { "op": "deposit", "account": "alice", "amount": 10 },
            { "op": "set_parameter", "caller": "owner", "parameter": "max_loan_amount", "value": 5 },
            { "op": "stats" }
        ]"#;
        let steps: Vec<Step> = serde_json::from_str(json).unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].name(), "deposit");
        assert!(matches!(
            steps[1],
            Step::SetParameter {
                parameter: Parameter::MaxLoanAmount,
                value: 5,
                ..
            }
        ));
        assert_eq!(steps[2], Step::Stats);
    }

    #[test]
    fn test_invalid_account_rejected() {
        let json = r#"[{ "op": "deposit", "account": "", "amount": 10 }]"#;
        assert!(serde_json::from_str::<Vec<Step>>(json).is_err());
    }

    #[test]
    fn test_fail_fast_stops() {
        let mut ctx = AppContext::new(None).unwrap();
        let alice = AccountId::new("alice").unwrap();
        let steps = vec![
            Step::Borrow {
                account: alice.clone(),
                amount: 10,
            },
            Step::Deposit {
                account: alice,
                amount: 10,
            },
        ];

        let report = run_script(&mut ctx, &steps, true);
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.error_kinds(), vec!["insufficient_collateral"]);
        assert_eq!(report.stats.total_collateral, 0);
    }

    #[test]
    fn test_events_drained_per_step() {
        let mut ctx = AppContext::new(None).unwrap();
        let alice = AccountId::new("alice").unwrap();
        let owner = AccountId::new("owner").unwrap();
        let steps = vec![
            Step::Deposit {
                account: alice.clone(),
                amount: 1_000,
            },
            Step::Withdraw {
                account: alice,
                amount: 5_000,
            },
            Step::RegisterFeed {
                caller: owner.clone(),
                symbol: "eth".to_string(),
                price: 3_000,
            },
            Step::UpdateFeedPrice {
                caller: owner,
                symbol: "eth".to_string(),
                price: 3_150,
            },
        ];

        let report = run_script(&mut ctx, &steps, false);
        let counts: Vec<usize> = report.steps.iter().map(|s| s.events.len()).collect();
        assert_eq!(counts, vec![1, 0, 1, 1]);
        assert!(ctx.protocol.events().is_empty());
        assert_eq!(report.steps[3].output.as_ref().unwrap()["price"], 3_150);
    }

    #[test]
    fn test_business_rejection() {
        assert!(is_business_rejection(ErrorKind::NotLiquidatable));
        assert!(!is_business_rejection(ErrorKind::Unauthorized));
    }
}
