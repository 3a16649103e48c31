//! Deterministic in-memory chain for flow tests.
//!
//! Design decisions (kept simple/deterministic):
//! - One signer per chain. `submit_purchase` always buys for that signer.
//! - Tx hashes are sequential: `"0xfake:{seq}"`. Block numbers start at 1.
//! - A purchase only changes the ledger when its confirmation is awaited.
//!   Shares are taken from other holders in ledger order.
//! - When the signer ends up holding every share, `current_owner` and the NFT
//!   owner move to the signer (unless suppressed).
//! - Faults are scripted up front and consumed in order.
//! - No randomness. No wall clock.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use frac_gateway::{ChainGateway, CollectionRef, ContractRef, GatewayError, TxHandle, TxOutcome};
use frac_ledger::{Address, RawLedger};

/// Build a well-formed [`RawLedger`] where `owner` is creator and current owner.
pub fn raw_ledger(owner: &str, holders: &[(&str, i64)], share_price_wei: u128) -> RawLedger {
    RawLedger {
        holders: holders.iter().map(|(a, _)| Address::new(*a)).collect(),
        shares: holders.iter().map(|(_, s)| *s).collect(),
        total_shares: holders.iter().map(|(_, s)| *s).sum(),
        creator: Address::new(owner),
        current_owner: Address::new(owner),
        share_price_wei,
    }
}

#[derive(Debug, Clone)]
struct PendingPurchase {
    share_count: u64,
    value_wei: u128,
}

#[derive(Debug)]
struct FakeState {
    connected: bool,
    ledger: RawLedger,
    nft_owner: Address,
    balances: BTreeMap<Address, u128>,
    pending: BTreeMap<String, PendingPurchase>,
    tx_seq: u64,
    block_number: u64,

    // scripted faults
    malformed_reads_remaining: u32,
    next_submit_error: Option<GatewayError>,
    next_revert: Option<String>,
    hang_confirmations: bool,
    suppress_ownership_transfer: bool,
    ledger_error_after_confirm: Option<GatewayError>,
    ledger_error: Option<GatewayError>,
    nft_owner_error: Option<GatewayError>,

    // counters
    ledger_reads: u32,
    submits: u32,
}

/// In-memory [`ChainGateway`] for one fractional contract.
#[derive(Debug)]
pub struct FakeChain {
    signer: Address,
    state: Mutex<FakeState>,
}

impl FakeChain {
    /// Chain holding `ledger`, signing as `signer` with `balance_wei`.
    ///
    /// Starts disconnected; call `connect()` before use.
    pub fn new(ledger: RawLedger, signer: impl Into<Address>, balance_wei: u128) -> Self {
        let signer = signer.into();
        let mut balances = BTreeMap::new();
        balances.insert(signer.clone(), balance_wei);
        Self {
            signer,
            state: Mutex::new(FakeState {
                connected: false,
                nft_owner: ledger.current_owner.clone(),
                ledger,
                balances,
                pending: BTreeMap::new(),
                tx_seq: 0,
                block_number: 0,
                malformed_reads_remaining: 0,
                next_submit_error: None,
                next_revert: None,
                hang_confirmations: false,
                suppress_ownership_transfer: false,
                ledger_error_after_confirm: None,
                ledger_error: None,
                nft_owner_error: None,
                ledger_reads: 0,
                submits: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn connected(&self) -> Result<MutexGuard<'_, FakeState>, GatewayError> {
        let st = self.lock();
        if st.connected {
            Ok(st)
        } else {
            Err(GatewayError::Network("gateway not connected".to_string()))
        }
    }

    pub fn signer(&self) -> &Address {
        &self.signer
    }

    // --- scripting -------------------------------------------------------

    /// The next `n` ledger reads return arrays whose sum disagrees with the total.
    pub fn fail_next_ledger_reads(&self, n: u32) {
        self.lock().malformed_reads_remaining = n;
    }

    /// The next `submit_purchase` fails with `err`.
    pub fn fail_next_submit(&self, err: GatewayError) {
        self.lock().next_submit_error = Some(err);
    }

    /// The next awaited confirmation reports a revert.
    pub fn revert_next(&self, reason: impl Into<String>) {
        self.lock().next_revert = Some(reason.into());
    }

    /// `await_confirmation` never resolves while set.
    pub fn hang_confirmations(&self, hang: bool) {
        self.lock().hang_confirmations = hang;
    }

    /// Full consolidation no longer moves `current_owner` or the NFT.
    pub fn suppress_ownership_transfer(&self, suppress: bool) {
        self.lock().suppress_ownership_transfer = suppress;
    }

    /// Once the next purchase confirms, every ledger read fails with `err`.
    pub fn fail_ledger_reads_after_confirmation(&self, err: GatewayError) {
        self.lock().ledger_error_after_confirm = Some(err);
    }

    /// Every `read_nft_owner` fails with `err`; `None` clears it.
    pub fn fail_nft_owner_reads(&self, err: Option<GatewayError>) {
        self.lock().nft_owner_error = err;
    }

    pub fn set_nft_owner(&self, owner: impl Into<Address>) {
        self.lock().nft_owner = owner.into();
    }

    pub fn set_balance(&self, who: impl Into<Address>, balance_wei: u128) {
        self.lock().balances.insert(who.into(), balance_wei);
    }

    /// Replace the ledger, e.g. to simulate another buyer landing first.
    pub fn set_ledger(&self, ledger: RawLedger) {
        self.lock().ledger = ledger;
    }

    // --- inspection ------------------------------------------------------

    pub fn ledger(&self) -> RawLedger {
        self.lock().ledger.clone()
    }

    pub fn nft_owner(&self) -> Address {
        self.lock().nft_owner.clone()
    }

    pub fn balance_of(&self, who: &Address) -> u128 {
        self.lock().balances.get(who).copied().unwrap_or(0)
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    pub fn ledger_reads(&self) -> u32 {
        self.lock().ledger_reads
    }

    pub fn submits(&self) -> u32 {
        self.lock().submits
    }
}

impl FakeState {
    /// Move `count` shares from other holders to `buyer`. `false` if not enough.
    fn transfer_to(&mut self, buyer: &Address, count: u64) -> bool {
        let available: u64 = self
            .ledger
            .holders
            .iter()
            .zip(&self.ledger.shares)
            .filter(|(h, _)| *h != buyer)
            .map(|(_, s)| (*s).max(0) as u64)
            .sum();
        if available < count {
            return false;
        }

        let mut remaining = count as i64;
        for (holder, shares) in self.ledger.holders.iter().zip(self.ledger.shares.iter_mut()) {
            if remaining == 0 {
                break;
            }
            if holder == buyer || *shares <= 0 {
                continue;
            }
            let take = remaining.min(*shares);
            *shares -= take;
            remaining -= take;
        }

        match self.ledger.holders.iter().position(|h| h == buyer) {
            Some(i) => self.ledger.shares[i] += count as i64,
            None => {
                self.ledger.holders.push(buyer.clone());
                self.ledger.shares.push(count as i64);
            }
        }
        true
    }

    fn buyer_holds_everything(&self, buyer: &Address) -> bool {
        let held: i64 = self
            .ledger
            .holders
            .iter()
            .zip(&self.ledger.shares)
            .filter(|(h, _)| *h == buyer)
            .map(|(_, s)| *s)
            .sum();
        held == self.ledger.total_shares
    }
}

#[async_trait]
impl ChainGateway for FakeChain {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn connect(&self) -> Result<(), GatewayError> {
        self.lock().connected = true;
        Ok(())
    }

    fn invalidate(&self) {
        self.lock().connected = false;
    }

    async fn read_ledger(&self, _contract: &ContractRef) -> Result<RawLedger, GatewayError> {
        let mut st = self.connected()?;
        st.ledger_reads += 1;
        if let Some(err) = &st.ledger_error {
            return Err(err.clone());
        }
        let mut ledger = st.ledger.clone();
        if st.malformed_reads_remaining > 0 {
            st.malformed_reads_remaining -= 1;
            // torn read: one holder's count is stale
            ledger.total_shares += 1;
        }
        Ok(ledger)
    }

    async fn read_buyer_balance(&self, buyer: &Address) -> Result<u128, GatewayError> {
        let st = self.connected()?;
        Ok(st.balances.get(buyer).copied().unwrap_or(0))
    }

    async fn submit_purchase(
        &self,
        _contract: &ContractRef,
        share_count: u64,
        value_wei: u128,
    ) -> Result<TxHandle, GatewayError> {
        let mut st = self.connected()?;
        st.submits += 1;
        if let Some(err) = st.next_submit_error.take() {
            return Err(err);
        }
        let balance = st.balances.get(&self.signer).copied().unwrap_or(0);
        if balance < value_wei {
            return Err(GatewayError::InsufficientGas);
        }

        st.tx_seq += 1;
        let hash = format!("0xfake:{}", st.tx_seq);
        st.pending.insert(
            hash.clone(),
            PendingPurchase {
                share_count,
                value_wei,
            },
        );
        Ok(TxHandle::new(hash))
    }

    async fn await_confirmation(&self, tx: &TxHandle) -> Result<TxOutcome, GatewayError> {
        let hang = self.connected()?.hang_confirmations;
        if hang {
            return std::future::pending().await;
        }

        let mut st = self.connected()?;
        let Some(purchase) = st.pending.remove(&tx.hash) else {
            return Err(GatewayError::Contract(format!("unknown transaction {}", tx.hash)));
        };
        if let Some(reason) = st.next_revert.take() {
            return Ok(TxOutcome::Reverted { reason });
        }

        let price = st.ledger.share_price_wei;
        if purchase.value_wei < price.saturating_mul(u128::from(purchase.share_count)) {
            return Ok(TxOutcome::Reverted {
                reason: "insufficient payment".to_string(),
            });
        }
        if !st.transfer_to(&self.signer, purchase.share_count) {
            return Ok(TxOutcome::Reverted {
                reason: "not enough shares for sale".to_string(),
            });
        }

        if let Some(bal) = st.balances.get_mut(&self.signer) {
            *bal = bal.saturating_sub(purchase.value_wei);
        }
        if st.buyer_holds_everything(&self.signer) && !st.suppress_ownership_transfer {
            st.ledger.current_owner = self.signer.clone();
            st.nft_owner = self.signer.clone();
        }

        st.block_number += 1;
        if let Some(err) = st.ledger_error_after_confirm.take() {
            st.ledger_error = Some(err);
        }
        Ok(TxOutcome::Confirmed {
            block_number: st.block_number,
        })
    }

    async fn read_nft_owner(
        &self,
        _collection: &CollectionRef,
        _token_id: u64,
    ) -> Result<Address, GatewayError> {
        let st = self.connected()?;
        match &st.nft_owner_error {
            Some(err) => Err(err.clone()),
            None => Ok(st.nft_owner.clone()),
        }
    }
}
