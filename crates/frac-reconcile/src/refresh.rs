//! Post-purchase refresh plan.
//!
//! A confirmed purchase invalidates every snapshot and balance the caller
//! holds. Before another purchase may be evaluated the caller re-reads the
//! ledger and balance and re-evaluates; when the purchase was predicted to
//! transfer full ownership, both owner records must also be checked.
//!
//! An ownership check that fails after confirmation is reported, never
//! assumed away.

use frac_ledger::{Address, ShareLedgerSnapshot};

use crate::{OwnershipCheck, PurchaseDecision, RefreshAction};

/// Ordered checklist to run after `decision`'s purchase confirmed.
pub fn plan_post_purchase_refresh(decision: &PurchaseDecision) -> Vec<RefreshAction> {
    let mut plan = vec![
        RefreshAction::RefetchLedger,
        RefreshAction::RefetchBuyerBalance,
        RefreshAction::ReEvaluate,
    ];
    if decision.would_transfer_full_ownership {
        plan.push(RefreshAction::VerifyContractOwner);
        plan.push(RefreshAction::VerifyNftOwner);
    }
    plan
}

/// First half of the ownership double-check: the contract's recorded owner.
///
/// `snapshot` must be the post-purchase read. The NFT owner is still unknown,
/// so the returned check is unconfirmed until
/// [`OwnershipCheck::record_nft_owner`] is called.
pub fn check_contract_owner(snapshot: &ShareLedgerSnapshot, buyer: &Address) -> OwnershipCheck {
    OwnershipCheck {
        buyer: buyer.clone(),
        contract_owner: snapshot.current_owner().clone(),
        contract_owner_matches: snapshot.current_owner() == buyer,
        nft_owner: None,
        nft_owner_matches: false,
        nft_owner_error: None,
    }
}

/// Compare both owner records against `buyer`.
///
/// `nft_owner` comes from the NFT collection, not from the fractional
/// contract.
pub fn verify_ownership_transfer(
    snapshot: &ShareLedgerSnapshot,
    buyer: &Address,
    nft_owner: &Address,
) -> OwnershipCheck {
    let mut check = check_contract_owner(snapshot, buyer);
    check.record_nft_owner(nft_owner.clone());
    check
}
