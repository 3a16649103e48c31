//! Purchase flow: confirmed purchases end Synced
//!
//! GREEN when:
//! - A partial purchase confirms, refreshes ledger + balance + quote, and
//!   skips the ownership check.
//! - Buying every share held by others confirms, verifies both owner records
//!   and ends Synced with the buyer as owner.
//! - The attempt history walks Idle -> ... -> Synced in order.
//! - A second purchase on the same flow re-reads fresh state.

use frac_config::FlowConfig;
use frac_gateway::{AttemptState, ChainGateway, ContractRef};
use frac_ledger::Address;
use frac_runtime::PurchaseFlow;
use frac_testkit::{raw_ledger, FakeChain};

fn contract() -> ContractRef {
    ContractRef::new("0xFrac", "0xNft", 7)
}

#[tokio::test]
async fn partial_purchase_skips_ownership_check() {
    let chain = FakeChain::new(
        raw_ledger("0xOwner", &[("0xOwner", 70), ("0xAlice", 30)], 1_000),
        "0xBuyer",
        50_000,
    );
    chain.connect().await.unwrap();

    let mut flow = PurchaseFlow::new(&chain, contract(), "0xbuyer", FlowConfig::default());
    let report = flow.purchase(40).await.unwrap();

    assert_eq!(report.final_state, AttemptState::Synced);
    assert!(!report.decision.would_transfer_full_ownership);
    assert_eq!(report.decision.cost_wei, 40_000);
    assert!(report.ownership.is_none());

    let buyer = Address::new("0xBuyer");
    assert_eq!(report.refreshed_snapshot.shares_held_by(&buyer), 40);
    assert_eq!(report.refreshed_quote.buyer_shares, 40);
    assert_eq!(report.refreshed_quote.available_shares, 60);
    // 10_000 wei left at 1_000 per share
    assert_eq!(report.refreshed_quote.max_affordable_shares, 10);
    assert_eq!(report.refreshed_quote.buyer_ownership_bps, 4_000);
    assert_eq!(chain.submits(), 1);
}

#[tokio::test]
async fn full_purchase_transfers_ownership() {
    let chain = FakeChain::new(
        raw_ledger("0xOwner", &[("0xOwner", 6), ("0xAlice", 4)], 10),
        "0xBuyer",
        100,
    );
    chain.connect().await.unwrap();

    let mut flow = PurchaseFlow::new(&chain, contract(), "0xBuyer", FlowConfig::default());
    let report = flow.purchase(10).await.unwrap();

    assert!(report.decision.would_transfer_full_ownership);
    let ownership = report.ownership.as_ref().unwrap();
    assert!(ownership.is_confirmed());
    assert_eq!(ownership.contract_owner, Address::new("0xbuyer"));
    assert_eq!(ownership.nft_owner, Some(Address::new("0xBUYER")));

    assert!(report
        .refreshed_snapshot
        .is_fully_consolidated_with(&Address::new("0xBuyer")));
    assert!(report.refreshed_snapshot.ownership_transferred());
    assert_eq!(report.refreshed_quote.available_shares, 0);

    assert_eq!(
        report.history,
        vec![
            AttemptState::Idle,
            AttemptState::Evaluating,
            AttemptState::Ready,
            AttemptState::Submitting,
            AttemptState::Confirming,
            AttemptState::Confirmed,
            AttemptState::Refreshing,
            AttemptState::Synced,
        ]
    );
    assert_eq!(flow.last_attempt().unwrap().state(), AttemptState::Synced);
}

#[tokio::test]
async fn second_purchase_sees_first_one() {
    let chain = FakeChain::new(
        raw_ledger("0xOwner", &[("0xOwner", 10)], 1),
        "0xBuyer",
        100,
    );
    chain.connect().await.unwrap();
    let mut flow = PurchaseFlow::new(&chain, contract(), "0xBuyer", FlowConfig::default());

    let first = flow.purchase(4).await.unwrap();
    assert!(!first.decision.would_transfer_full_ownership);

    // 6 left with others; buying all of them now consolidates
    let second = flow.purchase(6).await.unwrap();
    assert_ne!(first.attempt_id, second.attempt_id);
    assert_eq!(second.decision.available_shares, 6);
    assert!(second.decision.would_transfer_full_ownership);
    assert!(second.ownership.unwrap().is_confirmed());
}

#[tokio::test]
async fn quote_reads_fresh_state_without_submitting() {
    let chain = FakeChain::new(
        raw_ledger("0xOwner", &[("0xOwner", 8), ("0xBuyer", 2)], 5),
        "0xBuyer",
        20,
    );
    chain.connect().await.unwrap();
    let flow = PurchaseFlow::new(&chain, contract(), "0xBuyer", FlowConfig::default());

    let decision = flow.quote(8).await.unwrap();
    assert_eq!(decision.available_shares, 8);
    assert_eq!(decision.max_affordable_shares, 4);
    assert!(decision.is_rejected());
    assert_eq!(chain.submits(), 0);

    let snapshot = flow.load_snapshot().await.unwrap();
    assert_eq!(snapshot.total_shares(), 10);
}
