//! Chain gateway contract.
//!
//! A gateway instance replaces ambient, module-level signer/provider caches:
//! callers construct it, `connect()` it, pass it by reference, and
//! `invalidate()` it when the wallet or network changes. Reads and writes on
//! an invalidated gateway fail with [`GatewayError::Network`] until the next
//! successful `connect()`.

use async_trait::async_trait;
use frac_ledger::{Address, RawLedger};

use crate::{CollectionRef, ContractRef, GatewayError, TxHandle, TxOutcome};

/// Read/write boundary to a fractional-ownership contract.
///
/// Implementations must be `Send + Sync` so a flow can hold `&dyn
/// ChainGateway` across await points.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Human-readable adapter name (e.g. `"fake"`, `"json-rpc"`).
    fn name(&self) -> &'static str;

    /// Establish (or re-establish) signer and provider.
    async fn connect(&self) -> Result<(), GatewayError>;

    /// Drop cached signer/provider state. Idempotent.
    fn invalidate(&self);

    /// Holder/share arrays plus contract metadata.
    async fn read_ledger(&self, contract: &ContractRef) -> Result<RawLedger, GatewayError>;

    /// Spendable native balance of `buyer`, in wei.
    async fn read_buyer_balance(&self, buyer: &Address) -> Result<u128, GatewayError>;

    /// Sign and broadcast a share purchase paying `value_wei`.
    async fn submit_purchase(
        &self,
        contract: &ContractRef,
        share_count: u64,
        value_wei: u128,
    ) -> Result<TxHandle, GatewayError>;

    /// Wait until `tx` is mined. Callers bound this with their own timeout.
    async fn await_confirmation(&self, tx: &TxHandle) -> Result<TxOutcome, GatewayError>;

    /// Registered owner of the underlying NFT.
    async fn read_nft_owner(
        &self,
        collection: &CollectionRef,
        token_id: u64,
    ) -> Result<Address, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Minimal in-process mock: one static ledger, lifecycle flag only.
    struct StaticChain {
        connected: AtomicBool,
        ledger: RawLedger,
    }

    impl StaticChain {
        fn ensure_connected(&self) -> Result<(), GatewayError> {
            if self.connected.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(GatewayError::Network("not connected".to_string()))
            }
        }
    }

    #[async_trait]
    impl ChainGateway for StaticChain {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn connect(&self) -> Result<(), GatewayError> {
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn invalidate(&self) {
            self.connected.store(false, Ordering::SeqCst);
        }

        async fn read_ledger(&self, _contract: &ContractRef) -> Result<RawLedger, GatewayError> {
            self.ensure_connected()?;
            Ok(self.ledger.clone())
        }

        async fn read_buyer_balance(&self, _buyer: &Address) -> Result<u128, GatewayError> {
            self.ensure_connected()?;
            Ok(0)
        }

        async fn submit_purchase(
            &self,
            _contract: &ContractRef,
            _share_count: u64,
            _value_wei: u128,
        ) -> Result<TxHandle, GatewayError> {
            self.ensure_connected()?;
            Err(GatewayError::UserRejected)
        }

        async fn await_confirmation(&self, _tx: &TxHandle) -> Result<TxOutcome, GatewayError> {
            self.ensure_connected()?;
            Ok(TxOutcome::Confirmed { block_number: 1 })
        }

        async fn read_nft_owner(
            &self,
            _collection: &CollectionRef,
            _token_id: u64,
        ) -> Result<Address, GatewayError> {
            self.ensure_connected()?;
            Ok(self.ledger.current_owner.clone())
        }
    }

    fn chain() -> StaticChain {
        StaticChain {
            connected: AtomicBool::new(false),
            ledger: RawLedger {
                holders: vec![Address::new("0xOwner")],
                shares: vec![10],
                total_shares: 10,
                creator: Address::new("0xOwner"),
                current_owner: Address::new("0xOwner"),
                share_price_wei: 1,
            },
        }
    }

    #[tokio::test]
    async fn reads_fail_until_connected_and_after_invalidate() {
        let c = chain();
        let contract = ContractRef::new("0xFrac", "0xNft", 7);

        assert!(matches!(
            c.read_ledger(&contract).await,
            Err(GatewayError::Network(_))
        ));

        c.connect().await.unwrap();
        assert_eq!(c.read_ledger(&contract).await.unwrap().total_shares, 10);

        c.invalidate();
        assert!(c.read_ledger(&contract).await.is_err());
    }

    #[tokio::test]
    async fn gateway_is_object_safe() {
        let c = chain();
        let g: &dyn ChainGateway = &c;
        g.connect().await.unwrap();
        assert_eq!(g.name(), "static");
        assert_eq!(
            g.submit_purchase(&ContractRef::new("0xFrac", "0xNft", 7), 1, 1)
                .await
                .unwrap_err(),
            GatewayError::UserRejected
        );
    }
}
