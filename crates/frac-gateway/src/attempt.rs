//! Purchase attempt state machine.
//!
//! # Design
//!
//! One [`PurchaseAttempt`] tracks one purchase by one buyer against one
//! contract. Every lifecycle event goes through [`PurchaseAttempt::apply`],
//! which rejects illegal transitions with [`TransitionError`]. Callers MUST
//! treat that as a bug signal, not as a purchase outcome.
//!
//! # State diagram
//!
//! ```text
//!   Idle ──Evaluate──► Evaluating ──Reject──► Rejected (term.)
//!                           │
//!                         Accept
//!                           ▼
//!                         Ready ──Submit──► Submitting ──SubmitError──► SubmitFailed (term.)
//!                                               │
//!                                           Submitted(tx)
//!                                               ▼
//!                                          Confirming ──ConfirmError──► ConfirmFailed (term.)
//!                                               │
//!                                            Confirm
//!                                               ▼
//!                                          Confirmed ──BeginRefresh──► Refreshing
//!                                                                          │
//!                     ┌─────────────────────┬──────────────────────────────┤
//!               RefreshSynced      RefreshUnconfirmed               RefreshError
//!                     ▼                     ▼                              ▼
//!               Synced (term.)   OwnershipUnconfirmed (term.)     RefreshFailed (term.)
//! ```
//!
//! A purchase is "in flight" from `Submitting` until a terminal state. No
//! second submit can be applied to the same attempt.

use frac_ledger::Address;
use serde::Serialize;
use uuid::Uuid;

use crate::{ContractRef, TxHandle};

// ---------------------------------------------------------------------------
// AttemptState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttemptState {
    Idle,
    Evaluating,
    /// Decision refused the request. **Terminal.**
    Rejected,
    Ready,
    Submitting,
    /// Submission failed before a transaction existed. **Terminal.**
    SubmitFailed,
    Confirming,
    /// Reverted, timed out, or confirmation wait failed. **Terminal.**
    ConfirmFailed,
    Confirmed,
    Refreshing,
    /// Fresh snapshot taken, all checks passed. **Terminal.**
    Synced,
    /// Confirmed, but the full-ownership transfer could not be verified. **Terminal.**
    OwnershipUnconfirmed,
    /// Confirmed, but the post-purchase reads failed. **Terminal.**
    RefreshFailed,
}

impl AttemptState {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected
                | Self::SubmitFailed
                | Self::ConfirmFailed
                | Self::Synced
                | Self::OwnershipUnconfirmed
                | Self::RefreshFailed
        )
    }

    /// A transaction may exist on chain for this attempt.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::Confirming)
    }

    /// The purchase transaction was mined successfully.
    pub fn purchase_confirmed(&self) -> bool {
        matches!(
            self,
            Self::Confirmed
                | Self::Refreshing
                | Self::Synced
                | Self::OwnershipUnconfirmed
                | Self::RefreshFailed
        )
    }
}

// ---------------------------------------------------------------------------
// AttemptEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    /// Start evaluating against a fresh snapshot.
    Evaluate,
    /// Evaluation passed.
    Accept,
    /// Evaluation refused the request.
    Reject,
    /// Caller is about to call `submit_purchase`.
    Submit,
    /// `submit_purchase` failed.
    SubmitError,
    /// `submit_purchase` returned a transaction handle.
    Submitted(TxHandle),
    /// Transaction mined and succeeded.
    Confirm,
    /// Transaction reverted, or the wait failed or timed out.
    ConfirmError,
    /// Post-purchase refresh started.
    BeginRefresh,
    /// Refresh finished, state consistent.
    RefreshSynced,
    /// Refresh finished, ownership transfer not confirmed.
    RefreshUnconfirmed,
    /// Refresh reads failed.
    RefreshError,
}

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Returned when an event cannot legally be applied in the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: AttemptState,
    pub event: String,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "illegal purchase transition: {:?} + {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// PurchaseAttempt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PurchaseAttempt {
    pub attempt_id: Uuid,
    pub contract: ContractRef,
    pub buyer: Address,
    state: AttemptState,
    /// Every state entered, starting with `Idle`.
    history: Vec<AttemptState>,
    tx: Option<TxHandle>,
}

impl PurchaseAttempt {
    pub fn new(contract: ContractRef, buyer: Address) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            contract,
            buyer,
            state: AttemptState::Idle,
            history: vec![AttemptState::Idle],
            tx: None,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn history(&self) -> &[AttemptState] {
        &self.history
    }

    /// Transaction handle, once submission succeeded.
    pub fn tx(&self) -> Option<&TxHandle> {
        self.tx.as_ref()
    }

    /// Apply an event. On error the state is left unchanged.
    pub fn apply(&mut self, event: &AttemptEvent) -> Result<(), TransitionError> {
        use AttemptEvent::*;
        use AttemptState::*;

        let next = match (self.state, event) {
            (Idle, Evaluate) => Evaluating,
            (Evaluating, Accept) => Ready,
            (Evaluating, Reject) => Rejected,

            (Ready, Submit) => Submitting,
            (Submitting, SubmitError) => SubmitFailed,
            (Submitting, Submitted(tx)) => {
                self.tx = Some(tx.clone());
                Confirming
            }

            (Confirming, Confirm) => Confirmed,
            (Confirming, ConfirmError) => ConfirmFailed,

            (Confirmed, BeginRefresh) => Refreshing,
            (Refreshing, RefreshSynced) => Synced,
            (Refreshing, RefreshUnconfirmed) => OwnershipUnconfirmed,
            (Refreshing, RefreshError) => RefreshFailed,

            (state, ev) => {
                return Err(TransitionError {
                    from: state,
                    event: format!("{ev:?}"),
                });
            }
        };

        self.state = next;
        self.history.push(next);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
