//! frac-ledger
//!
//! Share ledger snapshot for a fractional-ownership contract.
//! - Raw holder/share arrays from the chain are validated once, at construction
//! - Sum of holder shares must equal total shares, or the read is rejected
//! - Address comparison is case-insensitive everywhere
//!
//! Deterministic, pure logic. No IO. No chain calls.

mod address;
mod snapshot;

pub mod wei;

pub use address::Address;
pub use snapshot::{Holding, MalformedLedger, RawLedger, ShareLedgerSnapshot};

/// Basis-point scale used by [`ShareLedgerSnapshot::ownership_bps`].
pub const BPS_SCALE: u64 = 10_000;
