//! Scenario: refresh plan and ownership double-check after a purchase
//!
//! # Invariants under test
//!
//! 1. Every plan starts RefetchLedger → RefetchBuyerBalance → ReEvaluate.
//! 2. Only a predicted full-ownership transfer adds the two owner checks,
//!    contract owner first.
//! 3. `verify_ownership_transfer` confirms only when both the contract owner
//!    and the NFT owner equal the buyer (case-insensitively).
//! 4. A contract that still names the previous owner is unconfirmed even if
//!    the NFT itself moved, and vice versa.
//! 5. An NFT owner that could not be read leaves the check unconfirmed and
//!    keeps the read error; a later successful read clears it.

use frac_ledger::{Address, RawLedger, ShareLedgerSnapshot};
use frac_reconcile::*;

fn snapshot(holders: &[(&str, i64)], owner: &str) -> ShareLedgerSnapshot {
    let total = holders.iter().map(|(_, s)| *s).sum();
    ShareLedgerSnapshot::from_raw(RawLedger {
        holders: holders.iter().map(|(a, _)| Address::new(*a)).collect(),
        shares: holders.iter().map(|(_, s)| *s).collect(),
        total_shares: total,
        creator: Address::new("0xCreator"),
        current_owner: Address::new(owner),
        share_price_wei: 10,
    })
    .unwrap()
}

#[test]
fn partial_purchase_plan_has_three_steps() {
    let s = snapshot(&[("0xCreator", 10)], "0xCreator");
    let b = BuyerContext::from_snapshot(&s, "0xBuyer", 1_000);
    let d = evaluate(&s, &b, 4);

    assert_eq!(
        plan_post_purchase_refresh(&d),
        vec![
            RefreshAction::RefetchLedger,
            RefreshAction::RefetchBuyerBalance,
            RefreshAction::ReEvaluate,
        ]
    );
}

#[test]
fn full_ownership_plan_adds_owner_checks_in_order() {
    let s = snapshot(&[("0xCreator", 10)], "0xCreator");
    let b = BuyerContext::from_snapshot(&s, "0xBuyer", 1_000);
    let d = evaluate(&s, &b, 10);
    assert!(d.would_transfer_full_ownership);

    let plan = plan_post_purchase_refresh(&d);
    assert_eq!(plan.len(), 5);
    assert_eq!(plan[3], RefreshAction::VerifyContractOwner);
    assert_eq!(plan[4], RefreshAction::VerifyNftOwner);
}

#[test]
fn ownership_confirmed_when_both_records_name_the_buyer() {
    let after = snapshot(&[("0xBuyer", 10)], "0xBUYER");
    let check = verify_ownership_transfer(&after, &Address::new("0xbuyer"), &Address::new("0xBuyer"));
    assert!(check.contract_owner_matches);
    assert!(check.nft_owner_matches);
    assert!(check.is_confirmed());
}

#[test]
fn stale_contract_owner_is_unconfirmed() {
    let after = snapshot(&[("0xBuyer", 10)], "0xCreator");
    let check = verify_ownership_transfer(&after, &Address::new("0xBuyer"), &Address::new("0xBuyer"));
    assert!(!check.contract_owner_matches);
    assert!(check.nft_owner_matches);
    assert!(!check.is_confirmed());
}

#[test]
fn unmoved_nft_is_unconfirmed() {
    let after = snapshot(&[("0xBuyer", 10)], "0xBuyer");
    let check = verify_ownership_transfer(&after, &Address::new("0xBuyer"), &Address::new("0xVault"));
    assert!(check.contract_owner_matches);
    assert!(!check.nft_owner_matches);
    assert!(!check.is_confirmed());
}

#[test]
fn contract_owner_step_alone_is_unconfirmed() {
    let after = snapshot(&[("0xBuyer", 10)], "0xBuyer");
    let check = check_contract_owner(&after, &Address::new("0xbuyer"));
    assert!(check.contract_owner_matches);
    assert_eq!(check.nft_owner, None);
    assert!(!check.is_confirmed());
}

#[test]
fn unreadable_nft_owner_is_unconfirmed_with_error_kept() {
    let after = snapshot(&[("0xBuyer", 10)], "0xBuyer");
    let mut check = check_contract_owner(&after, &Address::new("0xBuyer"));
    check.record_nft_owner_error("GATEWAY_NETWORK: rpc down");

    assert!(check.contract_owner_matches);
    assert!(!check.nft_owner_matches);
    assert_eq!(check.nft_owner_error.as_deref(), Some("GATEWAY_NETWORK: rpc down"));
    assert!(!check.is_confirmed());

    let v = serde_json::to_value(&check).unwrap();
    assert!(v["nft_owner"].is_null());
    assert_eq!(v["nft_owner_error"], "GATEWAY_NETWORK: rpc down");

    check.record_nft_owner(Address::new("0xBUYER"));
    assert_eq!(check.nft_owner_error, None);
    assert!(check.is_confirmed());
}
