//! frac-gateway
//!
//! Boundary to the chain for one fractional-ownership contract.
//! - `ChainGateway` is the only surface through which reads and writes happen
//! - Adapters map provider failures onto `GatewayError` at the boundary;
//!   nothing downstream inspects human-readable messages
//! - `PurchaseAttempt` is the explicit lifecycle of a single purchase
//!
//! No concrete chain adapter lives here. Tests use `frac-testkit::FakeChain`.

mod attempt;
mod chain;
mod error;
mod types;

pub use attempt::{AttemptEvent, AttemptState, PurchaseAttempt, TransitionError};
pub use chain::ChainGateway;
pub use error::GatewayError;
pub use types::{CollectionRef, ContractRef, TxHandle, TxOutcome};
