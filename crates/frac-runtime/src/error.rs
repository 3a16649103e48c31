use std::fmt;

use frac_gateway::{AttemptState, GatewayError, TransitionError, TxHandle};
use frac_ledger::MalformedLedger;
use frac_reconcile::PurchaseDecision;

use crate::PurchaseReport;

/// Where in the flow a gateway call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    LoadLedger,
    ReadBalance,
    Submit,
    Refresh,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LoadLedger => "load_ledger",
            Self::ReadBalance => "read_balance",
            Self::Submit => "submit",
            Self::Refresh => "refresh",
        };
        f.write_str(s)
    }
}

/// Every way a [`crate::PurchaseFlow`] call can end short of `Synced`.
///
/// Variants raised after submission carry enough to tell whether money may
/// have moved: see [`PurchaseError::purchase_confirmed`].
#[derive(Debug)]
pub enum PurchaseError {
    /// Ledger reads kept failing validation.
    MalformedLedger {
        state: AttemptState,
        attempts: u32,
        source: MalformedLedger,
    },
    /// Evaluation refused the request. Nothing was submitted.
    Rejected { decision: PurchaseDecision },
    /// A gateway call failed.
    Gateway {
        stage: FlowStage,
        state: AttemptState,
        source: GatewayError,
    },
    /// The purchase transaction was mined and reverted.
    Reverted { tx: TxHandle, reason: String },
    /// Waiting for the transaction failed or timed out. It may still land.
    ConfirmFailed { tx: TxHandle, source: GatewayError },
    /// Purchase confirmed, but the buyer is not recorded as owner.
    OwnershipTransferUnconfirmed { report: Box<PurchaseReport> },
    /// The refresh plan did not yield a snapshot and a re-evaluation.
    IncompleteRefresh { state: AttemptState },
    /// Bug signal from the attempt state machine.
    IllegalTransition(TransitionError),
}

impl PurchaseError {
    /// Stable code for logs and presentation-layer message lookup.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedLedger { .. } => "FLOW_MALFORMED_LEDGER",
            Self::Rejected { decision } => decision
                .rejection_reason
                .map(|r| r.code())
                .unwrap_or("FLOW_REJECTED"),
            Self::Gateway { source, .. } => source.code(),
            Self::Reverted { .. } => "FLOW_REVERTED",
            Self::ConfirmFailed { .. } => "FLOW_CONFIRM_FAILED",
            Self::OwnershipTransferUnconfirmed { .. } => "FLOW_OWNERSHIP_UNCONFIRMED",
            Self::IncompleteRefresh { .. } => "FLOW_INCOMPLETE_REFRESH",
            Self::IllegalTransition(_) => "FLOW_ILLEGAL_TRANSITION",
        }
    }

    /// State the attempt was left in.
    pub fn final_state(&self) -> AttemptState {
        match self {
            Self::MalformedLedger { state, .. }
            | Self::Gateway { state, .. }
            | Self::IncompleteRefresh { state } => *state,
            Self::Rejected { .. } => AttemptState::Rejected,
            Self::Reverted { .. } | Self::ConfirmFailed { .. } => AttemptState::ConfirmFailed,
            Self::OwnershipTransferUnconfirmed { report } => report.final_state,
            Self::IllegalTransition(e) => e.from,
        }
    }

    /// The purchase transaction is known to have succeeded on chain.
    pub fn purchase_confirmed(&self) -> bool {
        self.final_state().purchase_confirmed()
    }
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLedger {
                attempts, source, ..
            } => write!(
                f,
                "{}: ledger still malformed after {attempts} read(s): {source}",
                self.code()
            ),
            Self::Rejected { decision } => match decision.rejection_reason {
                Some(r) => write!(f, "{r}"),
                None => write!(f, "{}", self.code()),
            },
            Self::Gateway {
                stage,
                state,
                source,
            } => write!(f, "{source} (stage={stage}, state={state:?})"),
            Self::Reverted { tx, reason } => {
                write!(f, "{}: tx {} reverted: {reason}", self.code(), tx.hash)
            }
            Self::ConfirmFailed { tx, source } => {
                write!(f, "{}: tx {}: {source}", self.code(), tx.hash)
            }
            Self::OwnershipTransferUnconfirmed { report } => {
                let (contract_owner, nft_owner) = match &report.ownership {
                    Some(o) => (
                        o.contract_owner.to_string(),
                        match (&o.nft_owner, &o.nft_owner_error) {
                            (Some(owner), _) => owner.to_string(),
                            (None, Some(e)) => format!("unreadable ({e})"),
                            (None, None) => "?".to_string(),
                        },
                    ),
                    None => ("?".to_string(), "?".to_string()),
                };
                write!(
                    f,
                    "{}: purchase confirmed but contract_owner={contract_owner} nft_owner={nft_owner}",
                    self.code()
                )
            }
            Self::IncompleteRefresh { state } => {
                write!(f, "{}: refresh plan incomplete (state={state:?})", self.code())
            }
            Self::IllegalTransition(e) => write!(f, "{}: {e}", self.code()),
        }
    }
}

impl std::error::Error for PurchaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedLedger { source, .. } => Some(source),
            Self::Rejected { decision } => decision
                .rejection_reason
                .as_ref()
                .map(|r| r as &(dyn std::error::Error + 'static)),
            Self::Gateway { source, .. } | Self::ConfirmFailed { source, .. } => Some(source),
            Self::IllegalTransition(e) => Some(e),
            Self::Reverted { .. }
            | Self::OwnershipTransferUnconfirmed { .. }
            | Self::IncompleteRefresh { .. } => None,
        }
    }
}

impl From<TransitionError> for PurchaseError {
    fn from(e: TransitionError) -> Self {
        Self::IllegalTransition(e)
    }
}
