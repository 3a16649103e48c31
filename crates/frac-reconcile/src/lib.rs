//! frac-reconcile
//!
//! Purchase reconciliation for fractional share contracts.
//!
//! Decisions:
//! - Availability for a buyer excludes only that buyer's own shares
//! - Affordability is integer wei division, zero price bounded by availability only
//! - Full-ownership transfer is predicted for any distribution, not just "buy from owner"
//! - Every rejection is detected before a write could be attempted
//! - After a confirmed purchase the caller follows a fixed refresh plan
//!
//! Deterministic, pure logic. No IO. No chain calls.

mod engine;
mod refresh;
mod types;

pub use engine::{evaluate, max_affordable_shares, quote, validate_requested_shares};
pub use refresh::{check_contract_owner, plan_post_purchase_refresh, verify_ownership_transfer};
pub use types::*;
