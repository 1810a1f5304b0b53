//! Integration tests for Lendcore
//!
//! These verify the complete flow from a script file through the
//! protocol, ledger, risk engine and oracle.

use lendcore_protocol::{AccountId, ProtocolConfig};
use lendcore_rpc::{load_script, run_script, AppContext};
use std::io::Write;
use tempfile::NamedTempFile;

fn script_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

/// Test: Deposit → Borrow → Price crash → Liquidation
#[test]
fn test_full_liquidation_workflow() {
    let script = script_file(
        r#"[
            { "op": "deposit", "account": "alice", "amount": 1000 },
            { "op": "borrow", "account": "alice", "amount": 60000 },
            { "op": "liquidate", "liquidator": "bob", "account": "alice" },
            { "op": "emergency_price_reset", "caller": "owner", "price": 70 },
            { "op": "liquidatable" },
            { "op": "liquidate", "liquidator": "bob", "account": "alice" },
            { "op": "stats" }
        ]"#,
    );

    let steps = load_script(script.path()).unwrap();
    let mut ctx = AppContext::new(None).unwrap();
    let report = run_script(&mut ctx, &steps, false);

    assert_eq!(report.steps.len(), 7);
    assert_eq!(report.error_kinds(), vec!["not_liquidatable"]);

    let liquidatable = report.steps[4].output.as_ref().unwrap();
    assert_eq!(liquidatable[0]["account"], "ALICE");
    assert_eq!(liquidatable[0]["health_factor"], 97);

    let quote = report.steps[5].output.as_ref().unwrap();
    assert_eq!(quote["collateral_seized"], 1000);
    assert_eq!(quote["debt_cleared"], 60000);
    assert_eq!(quote["penalty"], 100);

    assert_eq!(report.stats.total_collateral, 0);
    assert_eq!(report.stats.total_debt, 0);
    assert_eq!(report.price, 70);
}

/// Test: pause blocks operations, reads still answer
#[test]
fn test_pause_workflow() {
    let script = script_file(
        r#"[
            { "op": "deposit", "account": "alice", "amount": 500 },
            { "op": "toggle_pause", "caller": "alice" },
            { "op": "toggle_pause", "caller": "owner" },
            { "op": "deposit", "account": "alice", "amount": 500 },
            { "op": "position", "account": "alice" },
            { "op": "toggle_pause", "caller": "owner" },
            { "op": "deposit", "account": "alice", "amount": 500 }
        ]"#,
    );

    let steps = load_script(script.path()).unwrap();
    let mut ctx = AppContext::new(None).unwrap();
    let report = run_script(&mut ctx, &steps, false);

    assert_eq!(report.error_kinds(), vec!["unauthorized", "unauthorized"]);
    let position = report.steps[4].output.as_ref().unwrap();
    assert_eq!(position["position"]["collateral"], 500);
    assert!(position["health_factor"].is_null());
    assert_eq!(report.stats.total_collateral, 1000);
    assert!(!report.stats.paused);
}

/// Test: staleness over advancing blocks
#[test]
fn test_stale_price_workflow() {
    let script = script_file(
        r#"[
            { "op": "set_parameter", "caller": "owner", "parameter": "max_price_age", "value": 5 },
            { "op": "deposit", "account": "alice", "amount": 1000 },
            { "op": "advance_blocks", "blocks": 5 },
            { "op": "stats" },
            { "op": "update_price", "caller": "owner", "price": 110 },
            { "op": "stats" }
        ]"#,
    );

    let steps = load_script(script.path()).unwrap();
    let mut ctx = AppContext::new(None).unwrap();
    let report = run_script(&mut ctx, &steps, false);

    assert_eq!(report.failures(), 0);
    let stale = report.steps[3].output.as_ref().unwrap();
    assert_eq!(stale["price_stale"], true);
    assert_eq!(report.steps[3].block, 5);

    let fresh = report.steps[5].output.as_ref().unwrap();
    assert_eq!(fresh["price_stale"], false);
    assert_eq!(fresh["price"], 110);
}

/// Test: config file drives the protocol parameters
#[test]
fn test_config_file_applies() {
    let config = script_file(r#"{ "max_loan_amount": 100, "owner": "admin" }"#);
    let mut ctx = AppContext::new(Some(config.path())).unwrap();
    assert_eq!(ctx.protocol.config().max_loan_amount, 100);

    let admin = AccountId::new("admin").unwrap();
    assert!(ctx.protocol.toggle_pause(&admin).unwrap());
    // The same owner administers the oracle
    assert_eq!(ctx.protocol.emergency_price_reset(&admin, 40).unwrap(), 40);
    assert_eq!(ctx.protocol.update_price(&admin, 44).unwrap(), 44);
}

/// Test: invalid config is refused up front
#[test]
fn test_invalid_config_rejected() {
    let config = ProtocolConfig {
        min_collateral_ratio: 100,
        ..ProtocolConfig::default()
    };
    assert!(AppContext::with_config(config).is_err());

    let missing = std::path::Path::new("/nonexistent/lendcore.json");
    assert!(AppContext::new(Some(missing)).is_err());
}

/// Test: each run gets its own id
#[test]
fn test_run_ids_are_unique() {
    let a = AppContext::new(None).unwrap();
    let b = AppContext::new(None).unwrap();
    assert_ne!(a.run_id(), b.run_id());
}
