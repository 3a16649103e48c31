//! Share ledger snapshot: the validated view of one fractional contract.
//!
//! # Purpose
//! Every call site that needs "how many shares does X hold" or "how many
//! shares can X buy" goes through [`ShareLedgerSnapshot`]. The raw arrays a
//! chain read returns are validated exactly once, in
//! [`ShareLedgerSnapshot::from_raw`]; a snapshot that exists is a snapshot
//! whose shares sum to `total_shares`.
//!
//! # Invariants
//! - `total_shares > 0`
//! - `sum(holding.shares) == total_shares`
//! - holder order is the chain read order
//! - never mutated after construction; a new read produces a new snapshot

use serde::{Deserialize, Serialize};

use crate::{Address, BPS_SCALE};

// ---------------------------------------------------------------------------
// Raw chain read
// ---------------------------------------------------------------------------

/// Ledger arrays and metadata exactly as a gateway read them.
///
/// `shares` is signed so a faulty adapter's negative count is representable
/// and can be rejected instead of wrapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLedger {
    pub holders: Vec<Address>,
    pub shares: Vec<i64>,
    pub total_shares: i64,
    pub creator: Address,
    pub current_owner: Address,
    #[serde(with = "crate::wei")]
    pub share_price_wei: u128,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Raw chain data that cannot be turned into a snapshot.
///
/// Never repaired or guessed around. A mismatch usually means a stale or torn
/// read; callers may re-read, but must not accept the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedLedger {
    /// `holders` and `shares` arrays differ in length.
    LengthMismatch { holders: usize, shares: usize },
    /// A holder entry carries a negative share count.
    NegativeShares {
        index: usize,
        address: Address,
        shares: i64,
    },
    /// `total_shares` must be strictly positive.
    NonPositiveTotal { total_shares: i64 },
    /// Sum of holder shares differs from `total_shares`.
    SumMismatch { sum: u64, total_shares: u64 },
    /// Sum of holder shares does not fit in `u64`.
    SumOverflow,
}

impl std::fmt::Display for MalformedLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { holders, shares } => write!(
                f,
                "malformed ledger: {holders} holder(s) but {shares} share count(s)"
            ),
            Self::NegativeShares {
                index,
                address,
                shares,
            } => write!(
                f,
                "malformed ledger: holder #{index} ({address}) has negative shares {shares}"
            ),
            Self::NonPositiveTotal { total_shares } => write!(
                f,
                "malformed ledger: total_shares must be > 0, got {total_shares}"
            ),
            Self::SumMismatch { sum, total_shares } => write!(
                f,
                "malformed ledger: holder shares sum to {sum}, total_shares is {total_shares}"
            ),
            Self::SumOverflow => write!(f, "malformed ledger: holder share sum overflows u64"),
        }
    }
}

impl std::error::Error for MalformedLedger {}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One holder entry, in chain order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub address: Address,
    pub shares: u64,
}

/// Validated, immutable ownership state of a fractional contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShareLedgerSnapshot {
    total_shares: u64,
    holders: Vec<Holding>,
    creator: Address,
    current_owner: Address,
    #[serde(with = "crate::wei")]
    share_price_wei: u128,
}

impl ShareLedgerSnapshot {
    /// Validate a raw read and build a snapshot.
    ///
    /// Checks run in a fixed order so the same bad input always reports the
    /// same cause: lengths, total, per-holder sign, then the sum.
    pub fn from_raw(raw: RawLedger) -> Result<Self, MalformedLedger> {
        if raw.holders.len() != raw.shares.len() {
            return Err(MalformedLedger::LengthMismatch {
                holders: raw.holders.len(),
                shares: raw.shares.len(),
            });
        }

        if raw.total_shares <= 0 {
            return Err(MalformedLedger::NonPositiveTotal {
                total_shares: raw.total_shares,
            });
        }
        let total_shares = raw.total_shares as u64;

        let mut holders = Vec::with_capacity(raw.holders.len());
        let mut sum: u64 = 0;
        for (index, (address, shares)) in raw.holders.into_iter().zip(raw.shares).enumerate() {
            if shares < 0 {
                return Err(MalformedLedger::NegativeShares {
                    index,
                    address,
                    shares,
                });
            }
            let shares = shares as u64;
            sum = sum.checked_add(shares).ok_or(MalformedLedger::SumOverflow)?;
            holders.push(Holding { address, shares });
        }

        if sum != total_shares {
            return Err(MalformedLedger::SumMismatch { sum, total_shares });
        }

        Ok(Self {
            total_shares,
            holders,
            creator: raw.creator,
            current_owner: raw.current_owner,
            share_price_wei: raw.share_price_wei,
        })
    }

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    pub fn holders(&self) -> &[Holding] {
        &self.holders
    }

    pub fn creator(&self) -> &Address {
        &self.creator
    }

    pub fn current_owner(&self) -> &Address {
        &self.current_owner
    }

    pub fn share_price_wei(&self) -> u128 {
        self.share_price_wei
    }

    /// Shares held by `address` (0 when absent).
    ///
    /// Entries that differ only in letter case are the same holder and are
    /// summed.
    pub fn shares_held_by(&self, address: &Address) -> u64 {
        self.holders
            .iter()
            .filter(|h| h.address == *address)
            .map(|h| h.shares)
            .sum()
    }

    /// Shares a buyer at `address` could acquire: everything not already
    /// held by that address.
    ///
    /// Creator- and owner-held shares count as available. The result is
    /// always `total_shares - shares_held_by(address)`.
    pub fn shares_available_excluding(&self, address: &Address) -> u64 {
        self.holders
            .iter()
            .filter(|h| h.address != *address)
            .map(|h| h.shares)
            .sum()
    }

    /// `true` iff `address` is the only holder with a non-zero balance and
    /// holds every share.
    ///
    /// Zero-share entries left behind by the contract are not holders, and
    /// case-variant entries of one address count as that single holder.
    pub fn is_fully_consolidated_with(&self, address: &Address) -> bool {
        self.shares_held_by(address) == self.total_shares
    }

    /// The NFT has changed hands at least once since fractionalization.
    pub fn ownership_transferred(&self) -> bool {
        self.creator != self.current_owner
    }

    /// The current owner holds every share.
    pub fn all_shares_with_owner(&self) -> bool {
        self.is_fully_consolidated_with(&self.current_owner)
    }

    /// Holding of `address` in basis points of `total_shares`, rounded down.
    pub fn ownership_bps(&self, address: &Address) -> u64 {
        let held = self.shares_held_by(address) as u128;
        (held * BPS_SCALE as u128 / self.total_shares as u128) as u64
    }
}
