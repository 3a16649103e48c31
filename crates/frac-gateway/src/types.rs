use frac_ledger::Address;
use serde::{Deserialize, Serialize};

/// NFT collection that holds the fractionalized token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionRef(pub Address);

impl CollectionRef {
    pub fn new(address: impl Into<Address>) -> Self {
        Self(address.into())
    }

    pub fn address(&self) -> &Address {
        &self.0
    }
}

/// One fractional-ownership contract and the NFT it wraps.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractRef {
    /// Fractional share contract.
    pub address: Address,
    /// Collection of the underlying NFT.
    pub collection: CollectionRef,
    /// Token id of the underlying NFT within `collection`.
    pub token_id: u64,
}

impl ContractRef {
    pub fn new(address: impl Into<Address>, collection: impl Into<Address>, token_id: u64) -> Self {
        Self {
            address: address.into(),
            collection: CollectionRef::new(collection),
            token_id,
        }
    }
}

/// Handle to a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: String,
}

impl TxHandle {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
}

/// What the chain said about a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOutcome {
    Confirmed { block_number: u64 },
    Reverted { reason: String },
}

impl TxOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TxOutcome::Confirmed { .. })
    }
}
