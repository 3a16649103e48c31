//! frac-runtime
//!
//! Wires snapshot, reconciler and gateway into a purchase flow:
//! - [`PurchaseFlow`] owns the gateway reference, the contract and the buyer
//! - every attempt is tracked by a `PurchaseAttempt` state machine
//! - failures come back as [`PurchaseError`] with the attempt's final state

use chrono::{DateTime, Utc};
use frac_gateway::{AttemptState, TxHandle};
use frac_ledger::ShareLedgerSnapshot;
use frac_reconcile::{OwnershipCheck, PurchaseDecision, PurchaseQuote};
use serde::Serialize;
use uuid::Uuid;

mod error;
mod flow;

pub use error::{FlowStage, PurchaseError};
pub use flow::PurchaseFlow;

/// What a confirmed purchase left behind.
#[derive(Clone, Debug, Serialize)]
pub struct PurchaseReport {
    pub attempt_id: Uuid,
    pub final_state: AttemptState,
    /// Every state the attempt entered, starting with `Idle`.
    pub history: Vec<AttemptState>,
    pub tx: TxHandle,
    pub block_number: u64,
    /// Decision the purchase was submitted under.
    pub decision: PurchaseDecision,
    /// Ledger as read after confirmation.
    pub refreshed_snapshot: ShareLedgerSnapshot,
    /// Re-evaluation against `refreshed_snapshot` and the refreshed balance.
    pub refreshed_quote: PurchaseQuote,
    /// Present when the purchase was predicted to transfer full ownership.
    pub ownership: Option<OwnershipCheck>,
    pub finished_at: DateTime<Utc>,
}
