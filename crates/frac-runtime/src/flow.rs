//! One buyer, one contract, one purchase at a time.
//!
//! [`PurchaseFlow::purchase`] walks a [`PurchaseAttempt`] from `Idle` to a
//! terminal state:
//!
//! 1. read ledger (bounded re-reads on malformed data) and buyer balance
//! 2. evaluate; a rejection stops here, before any write
//! 3. submit, then wait for confirmation under `confirmation_timeout`
//! 4. run the post-purchase refresh plan, including the ownership check
//!
//! After confirmation, failed ledger or balance re-reads end the attempt in
//! `RefreshFailed`. A failed NFT owner read ends it in `OwnershipUnconfirmed`
//! with the read error kept on the [`OwnershipCheck`].
//!
//! No step is retried after submission. A timed-out confirmation is reported,
//! never resubmitted.

use chrono::Utc;
use frac_config::FlowConfig;
use frac_gateway::{
    AttemptEvent, AttemptState, ChainGateway, ContractRef, GatewayError, PurchaseAttempt,
    TxOutcome,
};
use frac_ledger::{Address, ShareLedgerSnapshot};
use frac_reconcile::{
    check_contract_owner, evaluate, plan_post_purchase_refresh, quote, BuyerContext,
    OwnershipCheck, PurchaseDecision, RefreshAction,
};
use tracing::{error, info, warn};

use crate::{FlowStage, PurchaseError, PurchaseReport};

pub struct PurchaseFlow<'g, G: ChainGateway + ?Sized> {
    gateway: &'g G,
    contract: ContractRef,
    buyer: Address,
    config: FlowConfig,
    last_attempt: Option<PurchaseAttempt>,
}

impl<'g, G: ChainGateway + ?Sized> PurchaseFlow<'g, G> {
    pub fn new(
        gateway: &'g G,
        contract: ContractRef,
        buyer: impl Into<Address>,
        config: FlowConfig,
    ) -> Self {
        Self {
            gateway,
            contract,
            buyer: buyer.into(),
            config,
            last_attempt: None,
        }
    }

    pub fn buyer(&self) -> &Address {
        &self.buyer
    }

    pub fn contract(&self) -> &ContractRef {
        &self.contract
    }

    /// The most recent attempt driven by [`Self::purchase`], if any.
    pub fn last_attempt(&self) -> Option<&PurchaseAttempt> {
        self.last_attempt.as_ref()
    }

    /// Read and validate the ledger.
    ///
    /// Malformed reads are retried up to `ledger_read_attempts` times in
    /// total. Gateway errors are returned immediately.
    pub async fn load_snapshot(&self) -> Result<ShareLedgerSnapshot, PurchaseError> {
        self.fetch_snapshot(AttemptState::Idle).await
    }

    /// Fresh read + evaluation, without touching any attempt.
    pub async fn quote(&self, requested_shares: i64) -> Result<PurchaseDecision, PurchaseError> {
        let snapshot = self.fetch_snapshot(AttemptState::Idle).await?;
        let balance = self.fetch_balance(AttemptState::Idle, FlowStage::ReadBalance).await?;
        let buyer = BuyerContext::from_snapshot(&snapshot, self.buyer.clone(), balance);
        Ok(evaluate(&snapshot, &buyer, requested_shares))
    }

    /// Drive one purchase of `requested_shares` to a terminal state.
    ///
    /// `&mut self` keeps a flow to one in-flight purchase.
    pub async fn purchase(&mut self, requested_shares: i64) -> Result<PurchaseReport, PurchaseError> {
        let mut attempt = PurchaseAttempt::new(self.contract.clone(), self.buyer.clone());
        info!(
            attempt_id = %attempt.attempt_id,
            contract = %self.contract.address,
            buyer = %self.buyer,
            requested_shares,
            "purchase/start"
        );

        let result = self.drive(&mut attempt, requested_shares).await;
        match &result {
            Ok(report) => info!(
                attempt_id = %attempt.attempt_id,
                state = ?report.final_state,
                "purchase/done"
            ),
            Err(e) => warn!(
                attempt_id = %attempt.attempt_id,
                state = ?attempt.state(),
                code = e.code(),
                error = %e,
                "purchase/failed"
            ),
        }
        self.last_attempt = Some(attempt);
        result
    }

    async fn drive(
        &self,
        attempt: &mut PurchaseAttempt,
        requested_shares: i64,
    ) -> Result<PurchaseReport, PurchaseError> {
        // --- evaluate -----------------------------------------------------
        let snapshot = self.fetch_snapshot(attempt.state()).await?;
        let balance = self
            .fetch_balance(attempt.state(), FlowStage::ReadBalance)
            .await?;
        transition(attempt, AttemptEvent::Evaluate)?;

        let buyer = BuyerContext::from_snapshot(&snapshot, self.buyer.clone(), balance);
        let decision = evaluate(&snapshot, &buyer, requested_shares);
        let Some(share_count) = decision.approved_shares() else {
            transition(attempt, AttemptEvent::Reject)?;
            return Err(PurchaseError::Rejected { decision });
        };
        transition(attempt, AttemptEvent::Accept)?;

        // --- submit -------------------------------------------------------
        transition(attempt, AttemptEvent::Submit)?;
        let tx = match self
            .gateway
            .submit_purchase(&self.contract, share_count, decision.cost_wei)
            .await
        {
            Ok(tx) => tx,
            Err(source) => {
                error!(
                    attempt_id = %attempt.attempt_id,
                    code = source.code(),
                    retryable = source.is_retryable(),
                    "purchase/submit failed"
                );
                transition(attempt, AttemptEvent::SubmitError)?;
                return Err(PurchaseError::Gateway {
                    stage: FlowStage::Submit,
                    state: attempt.state(),
                    source,
                });
            }
        };
        transition(attempt, AttemptEvent::Submitted(tx.clone()))?;

        // --- confirm ------------------------------------------------------
        let waited = tokio::time::timeout(
            self.config.confirmation_timeout,
            self.gateway.await_confirmation(&tx),
        )
        .await;
        let block_number = match waited {
            Ok(Ok(TxOutcome::Confirmed { block_number })) => block_number,
            Ok(Ok(TxOutcome::Reverted { reason })) => {
                transition(attempt, AttemptEvent::ConfirmError)?;
                return Err(PurchaseError::Reverted { tx, reason });
            }
            Ok(Err(source)) => {
                transition(attempt, AttemptEvent::ConfirmError)?;
                return Err(PurchaseError::ConfirmFailed { tx, source });
            }
            Err(_elapsed) => {
                warn!(
                    attempt_id = %attempt.attempt_id,
                    tx = %tx.hash,
                    timeout_ms = self.config.confirmation_timeout.as_millis() as u64,
                    "purchase/confirmation timed out; tx may still land"
                );
                transition(attempt, AttemptEvent::ConfirmError)?;
                return Err(PurchaseError::ConfirmFailed {
                    tx,
                    source: GatewayError::Timeout,
                });
            }
        };
        transition(attempt, AttemptEvent::Confirm)?;

        // --- refresh ------------------------------------------------------
        transition(attempt, AttemptEvent::BeginRefresh)?;
        let plan = plan_post_purchase_refresh(&decision);

        let mut refreshed: Option<ShareLedgerSnapshot> = None;
        let mut refreshed_balance: Option<u128> = None;
        let mut refreshed_quote = None;
        let mut ownership: Option<OwnershipCheck> = None;

        for action in &plan {
            let step = match action {
                RefreshAction::RefetchLedger => self
                    .fetch_snapshot(attempt.state())
                    .await
                    .map(|s| refreshed = Some(s)),
                RefreshAction::RefetchBuyerBalance => self
                    .fetch_balance(attempt.state(), FlowStage::Refresh)
                    .await
                    .map(|b| refreshed_balance = Some(b)),
                RefreshAction::ReEvaluate => {
                    if let (Some(s), Some(b)) = (&refreshed, refreshed_balance) {
                        let ctx = BuyerContext::from_snapshot(s, self.buyer.clone(), b);
                        refreshed_quote = Some(quote(s, &ctx));
                    }
                    Ok(())
                }
                RefreshAction::VerifyContractOwner => {
                    if let Some(s) = &refreshed {
                        let check = check_contract_owner(s, &self.buyer);
                        info!(
                            attempt_id = %attempt.attempt_id,
                            contract_owner = %check.contract_owner,
                            matches = check.contract_owner_matches,
                            "refresh/contract owner"
                        );
                        ownership = Some(check);
                    }
                    Ok(())
                }
                RefreshAction::VerifyNftOwner => {
                    if let Some(check) = ownership.as_mut() {
                        match self
                            .gateway
                            .read_nft_owner(&self.contract.collection, self.contract.token_id)
                            .await
                        {
                            Ok(owner) => {
                                info!(
                                    attempt_id = %attempt.attempt_id,
                                    nft_owner = %owner,
                                    "refresh/nft owner"
                                );
                                check.record_nft_owner(owner);
                            }
                            Err(source) => {
                                warn!(
                                    attempt_id = %attempt.attempt_id,
                                    code = source.code(),
                                    error = %source,
                                    "refresh/nft owner unreadable; ownership left unconfirmed"
                                );
                                check.record_nft_owner_error(&source);
                            }
                        }
                    }
                    Ok(())
                }
            };

            if let Err(e) = step {
                error!(
                    attempt_id = %attempt.attempt_id,
                    action = ?action,
                    code = e.code(),
                    "refresh/step failed after confirmed purchase"
                );
                transition(attempt, AttemptEvent::RefreshError)?;
                return Err(with_state(e, attempt.state()));
            }
        }

        let (Some(refreshed_snapshot), Some(refreshed_quote)) = (refreshed, refreshed_quote) else {
            transition(attempt, AttemptEvent::RefreshError)?;
            return Err(PurchaseError::IncompleteRefresh {
                state: attempt.state(),
            });
        };
        let unconfirmed = ownership.as_ref().is_some_and(|o| !o.is_confirmed());

        if unconfirmed {
            warn!(
                attempt_id = %attempt.attempt_id,
                ownership = ?ownership,
                "refresh/full-ownership transfer not confirmed"
            );
            transition(attempt, AttemptEvent::RefreshUnconfirmed)?;
        } else {
            transition(attempt, AttemptEvent::RefreshSynced)?;
        }

        let report = PurchaseReport {
            attempt_id: attempt.attempt_id,
            final_state: attempt.state(),
            history: attempt.history().to_vec(),
            tx,
            block_number,
            decision,
            refreshed_snapshot,
            refreshed_quote,
            ownership,
            finished_at: Utc::now(),
        };

        if unconfirmed {
            return Err(PurchaseError::OwnershipTransferUnconfirmed {
                report: Box::new(report),
            });
        }
        Ok(report)
    }

    async fn fetch_snapshot(
        &self,
        state: AttemptState,
    ) -> Result<ShareLedgerSnapshot, PurchaseError> {
        let attempts = self.config.ledger_read_attempts.max(1);
        let mut n = 0;
        loop {
            n += 1;
            let raw = self
                .gateway
                .read_ledger(&self.contract)
                .await
                .map_err(|source| PurchaseError::Gateway {
                    stage: stage_for(state),
                    state,
                    source,
                })?;

            match ShareLedgerSnapshot::from_raw(raw) {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) if n < attempts => {
                    warn!(
                        contract = %self.contract.address,
                        read = n,
                        of = attempts,
                        error = %e,
                        "ledger/malformed read; re-reading"
                    );
                }
                Err(source) => {
                    error!(
                        contract = %self.contract.address,
                        attempts,
                        error = %source,
                        "ledger/malformed after all reads"
                    );
                    return Err(PurchaseError::MalformedLedger {
                        state,
                        attempts,
                        source,
                    });
                }
            }
        }
    }

    async fn fetch_balance(
        &self,
        state: AttemptState,
        stage: FlowStage,
    ) -> Result<u128, PurchaseError> {
        self.gateway
            .read_buyer_balance(&self.buyer)
            .await
            .map_err(|source| PurchaseError::Gateway {
                stage,
                state,
                source,
            })
    }
}

fn stage_for(state: AttemptState) -> FlowStage {
    if state == AttemptState::Refreshing {
        FlowStage::Refresh
    } else {
        FlowStage::LoadLedger
    }
}

/// Rewrite the state carried by a refresh-time error once the attempt has moved on.
fn with_state(e: PurchaseError, new_state: AttemptState) -> PurchaseError {
    match e {
        PurchaseError::MalformedLedger {
            attempts, source, ..
        } => PurchaseError::MalformedLedger {
            state: new_state,
            attempts,
            source,
        },
        PurchaseError::Gateway { stage, source, .. } => PurchaseError::Gateway {
            stage,
            state: new_state,
            source,
        },
        other => other,
    }
}

fn transition(attempt: &mut PurchaseAttempt, event: AttemptEvent) -> Result<(), PurchaseError> {
    let from = attempt.state();
    attempt.apply(&event)?;
    info!(
        attempt_id = %attempt.attempt_id,
        from = ?from,
        to = ?attempt.state(),
        "purchase/transition"
    );
    Ok(())
}
