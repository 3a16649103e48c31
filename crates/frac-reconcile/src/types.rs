use frac_ledger::{Address, ShareLedgerSnapshot};
use serde::Serialize;

/// Who is buying, as of the snapshot the decision is made against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuyerContext {
    pub address: Address,
    /// Buyer's existing holding in the same snapshot (0 if absent).
    pub current_shares: u64,
    /// Spendable balance at query time.
    #[serde(with = "frac_ledger::wei")]
    pub balance_wei: u128,
}

impl BuyerContext {
    /// Build the context by looking the buyer up in `snapshot`.
    ///
    /// This is the only constructor; a holding that disagrees with the
    /// snapshot cannot be supplied by hand.
    pub fn from_snapshot(
        snapshot: &ShareLedgerSnapshot,
        address: impl Into<Address>,
        balance_wei: u128,
    ) -> Self {
        let address = address.into();
        let current_shares = snapshot.shares_held_by(&address);
        Self {
            address,
            current_shares,
            balance_wei,
        }
    }
}

/// Why a purchase request was refused before any write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RejectionReason {
    /// Requested share count is zero or negative.
    InvalidRequest,
    /// More shares requested than other holders have.
    SharesUnavailable,
    /// More shares requested than the balance covers.
    InsufficientBalance,
}

impl RejectionReason {
    /// Stable code for logs and presentation-layer message lookup.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "PURCHASE_INVALID_REQUEST",
            Self::SharesUnavailable => "PURCHASE_SHARES_UNAVAILABLE",
            Self::InsufficientBalance => "PURCHASE_INSUFFICIENT_BALANCE",
        }
    }

    /// Caller can lower the request (or re-query) and try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SharesUnavailable | Self::InsufficientBalance)
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "{}: share count must be > 0", self.code()),
            Self::SharesUnavailable => {
                write!(f, "{}: not enough shares held by others", self.code())
            }
            Self::InsufficientBalance => {
                write!(f, "{}: balance does not cover the shares", self.code())
            }
        }
    }
}

impl std::error::Error for RejectionReason {}

/// Request-independent view of what a buyer could do right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PurchaseQuote {
    pub buyer_shares: u64,
    pub available_shares: u64,
    pub max_affordable_shares: u64,
    /// `min(available_shares, max_affordable_shares)`.
    pub max_purchasable_shares: u64,
    /// Buyer's current holding in basis points.
    pub buyer_ownership_bps: u64,
}

/// Outcome of [`crate::evaluate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PurchaseDecision {
    pub requested_shares: i64,
    pub available_shares: u64,
    pub max_affordable_shares: u64,
    pub would_transfer_full_ownership: bool,
    /// `requested_shares * share_price_wei` (saturating), 0 for invalid requests.
    /// The value to attach to the purchase transaction.
    #[serde(with = "frac_ledger::wei")]
    pub cost_wei: u128,
    pub rejection_reason: Option<RejectionReason>,
}

impl PurchaseDecision {
    /// `true` when the purchase may be submitted.
    pub fn is_ready(&self) -> bool {
        self.rejection_reason.is_none()
    }

    /// `true` when the request was refused.
    pub fn is_rejected(&self) -> bool {
        !self.is_ready()
    }

    pub fn max_purchasable(&self) -> u64 {
        self.available_shares.min(self.max_affordable_shares)
    }

    /// The validated share count, if the decision allows the purchase.
    pub fn approved_shares(&self) -> Option<u64> {
        if self.is_ready() {
            Some(self.requested_shares as u64)
        } else {
            None
        }
    }
}

/// One step of the post-purchase refresh, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RefreshAction {
    /// Read the ledger again and build a new snapshot.
    RefetchLedger,
    /// Read the buyer's balance again.
    RefetchBuyerBalance,
    /// Recompute availability from the new snapshot and balance.
    ReEvaluate,
    /// Contract `current_owner` must now be the buyer.
    VerifyContractOwner,
    /// Underlying NFT's registered owner must now be the buyer.
    VerifyNftOwner,
}

/// Result of the ownership double-check after a full-ownership purchase.
///
/// Built by the contract-owner step, completed by the NFT-owner step. An NFT
/// owner that could not be read leaves the check unconfirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OwnershipCheck {
    pub buyer: Address,
    pub contract_owner: Address,
    pub contract_owner_matches: bool,
    pub nft_owner: Option<Address>,
    pub nft_owner_matches: bool,
    /// Why the NFT owner read failed, when it did.
    pub nft_owner_error: Option<String>,
}

impl OwnershipCheck {
    pub fn record_nft_owner(&mut self, owner: Address) {
        self.nft_owner_matches = owner == self.buyer;
        self.nft_owner = Some(owner);
        self.nft_owner_error = None;
    }

    pub fn record_nft_owner_error(&mut self, error: impl std::fmt::Display) {
        self.nft_owner = None;
        self.nft_owner_matches = false;
        self.nft_owner_error = Some(error.to_string());
    }

    pub fn is_confirmed(&self) -> bool {
        self.contract_owner_matches && self.nft_owner_matches
    }
}
