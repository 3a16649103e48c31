use frac_ledger::ShareLedgerSnapshot;

use crate::{BuyerContext, PurchaseDecision, PurchaseQuote, RejectionReason};

// ---------------------------------------------------------------------------
// Sanity clamps
// ---------------------------------------------------------------------------

/// Guard: a share request must be strictly positive.
///
/// Returns `Some(InvalidRequest)` if the value is invalid; `None` if it passes.
pub fn validate_requested_shares(requested_shares: i64) -> Option<RejectionReason> {
    if requested_shares <= 0 {
        return Some(RejectionReason::InvalidRequest);
    }
    None
}

/// Whole shares `balance_wei` pays for at `share_price_wei`.
///
/// A zero price cannot be divided by; availability is then the only bound,
/// so the caller's `available` is returned. Results above `u64::MAX` saturate.
pub fn max_affordable_shares(balance_wei: u128, share_price_wei: u128, available: u64) -> u64 {
    if share_price_wei == 0 {
        return available;
    }
    u64::try_from(balance_wei / share_price_wei).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Core engine
// ---------------------------------------------------------------------------

/// What `buyer` could purchase from `snapshot`, independent of a request.
pub fn quote(snapshot: &ShareLedgerSnapshot, buyer: &BuyerContext) -> PurchaseQuote {
    let available = snapshot.shares_available_excluding(&buyer.address);
    let max_affordable =
        max_affordable_shares(buyer.balance_wei, snapshot.share_price_wei(), available);

    PurchaseQuote {
        buyer_shares: buyer.current_shares,
        available_shares: available,
        max_affordable_shares: max_affordable,
        max_purchasable_shares: available.min(max_affordable),
        buyer_ownership_bps: snapshot.ownership_bps(&buyer.address),
    }
}

/// Evaluate a request for `requested_shares` against `snapshot`.
///
/// Pure: identical inputs always yield an identical decision, and nothing
/// here reads or writes chain state. Rejections are checked in a fixed order:
/// invalid request, then availability, then balance.
pub fn evaluate(
    snapshot: &ShareLedgerSnapshot,
    buyer: &BuyerContext,
    requested_shares: i64,
) -> PurchaseDecision {
    let q = quote(snapshot, buyer);
    let available = q.available_shares;

    // Buying everything on offer leaves the buyer with 100% of the supply.
    let would_transfer_full_ownership = requested_shares > 0
        && requested_shares as u64 == available
        && available == snapshot.total_shares().saturating_sub(buyer.current_shares);

    let rejection_reason = validate_requested_shares(requested_shares).or_else(|| {
        let requested = requested_shares as u64;
        if requested > available {
            Some(RejectionReason::SharesUnavailable)
        } else if requested > q.max_affordable_shares {
            Some(RejectionReason::InsufficientBalance)
        } else {
            None
        }
    });

    let cost_wei = if requested_shares > 0 {
        (requested_shares as u128).saturating_mul(snapshot.share_price_wei())
    } else {
        0
    };

    PurchaseDecision {
        requested_shares,
        available_shares: available,
        max_affordable_shares: q.max_affordable_shares,
        would_transfer_full_ownership,
        cost_wei,
        rejection_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frac_ledger::{Address, RawLedger};

    fn snap(holders: &[(&str, i64)], total: i64, price: u128) -> ShareLedgerSnapshot {
        ShareLedgerSnapshot::from_raw(RawLedger {
            holders: holders.iter().map(|(a, _)| Address::new(*a)).collect(),
            shares: holders.iter().map(|(_, s)| *s).collect(),
            total_shares: total,
            creator: Address::new("0xOwner"),
            current_owner: Address::new("0xOwner"),
            share_price_wei: price,
        })
        .unwrap()
    }

    #[test]
    fn zero_price_is_bounded_by_availability_only() {
        let s = snap(&[("0xOwner", 10)], 10, 0);
        let b = BuyerContext::from_snapshot(&s, "0xBuyer", 0);
        let d = evaluate(&s, &b, 10);
        assert_eq!(d.max_affordable_shares, 10);
        assert_eq!(d.cost_wei, 0);
        assert!(d.is_ready());
        assert!(d.would_transfer_full_ownership);
    }

    #[test]
    fn huge_balance_saturates_affordability() {
        assert_eq!(max_affordable_shares(u128::MAX, 1, 5), u64::MAX);
    }

    #[test]
    fn invalid_request_wins_over_other_reasons() {
        let s = snap(&[("0xOwner", 10)], 10, 1_000);
        let b = BuyerContext::from_snapshot(&s, "0xBuyer", 0);
        for bad in [0, -1, i64::MIN] {
            let d = evaluate(&s, &b, bad);
            assert_eq!(d.rejection_reason, Some(RejectionReason::InvalidRequest));
            assert!(!d.would_transfer_full_ownership);
            assert_eq!(d.cost_wei, 0);
        }
    }

    #[test]
    fn unavailable_is_reported_before_insufficient_balance() {
        let s = snap(&[("0xOwner", 10)], 10, 1_000);
        let b = BuyerContext::from_snapshot(&s, "0xBuyer", 0);
        let d = evaluate(&s, &b, 11);
        assert_eq!(d.rejection_reason, Some(RejectionReason::SharesUnavailable));
    }

    #[test]
    fn buyer_holding_everything_has_nothing_to_buy() {
        let s = snap(&[("0xBuyer", 10)], 10, 1);
        let b = BuyerContext::from_snapshot(&s, "0xbuyer", 1_000);
        let q = quote(&s, &b);
        assert_eq!(q.available_shares, 0);
        assert_eq!(q.max_purchasable_shares, 0);
        assert_eq!(q.buyer_ownership_bps, 10_000);

        let d = evaluate(&s, &b, 1);
        assert_eq!(d.rejection_reason, Some(RejectionReason::SharesUnavailable));
        assert!(!d.would_transfer_full_ownership);
    }

    #[test]
    fn partial_purchase_does_not_predict_transfer() {
        let s = snap(&[("0xOwner", 6), ("0xAlice", 4)], 10, 1);
        let b = BuyerContext::from_snapshot(&s, "0xBuyer", 100);
        let d = evaluate(&s, &b, 6);
        assert!(d.is_ready());
        assert!(!d.would_transfer_full_ownership);
        assert_eq!(d.max_purchasable(), 10);
        assert_eq!(d.approved_shares(), Some(6));
    }
}
