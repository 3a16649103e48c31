use anyhow::Result;
use frac_ledger::{Address, ShareLedgerSnapshot};
use frac_reconcile::{evaluate, plan_post_purchase_refresh, quote, BuyerContext};
use serde_json::json;

/// Evaluate `shares` for `buyer` against the ledger in `ledger_path` and print
/// decision, quote and post-purchase plan as one JSON document.
///
/// A rejected request is a successful evaluation. A malformed ledger is an error.
pub fn run(ledger_path: &str, buyer: &str, balance_wei: u128, shares: i64) -> Result<()> {
    let raw = super::load_raw_ledger(ledger_path)?;
    let snapshot = ShareLedgerSnapshot::from_raw(raw)?;

    let buyer = BuyerContext::from_snapshot(&snapshot, Address::new(buyer), balance_wei);
    let decision = evaluate(&snapshot, &buyer, shares);
    let plan = if decision.is_ready() {
        plan_post_purchase_refresh(&decision)
    } else {
        Vec::new()
    };

    let out = json!({
        "buyer": buyer,
        "total_shares": snapshot.total_shares(),
        "quote": quote(&snapshot, &buyer),
        "decision": decision,
        "rejection_code": decision.rejection_reason.map(|r| r.code()),
        "refresh_plan": plan,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
