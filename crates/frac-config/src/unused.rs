use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

use crate::walk::leaves;

/// JSON pointers read by code today. A leaf at or below one of these is consumed.
///
/// - `ContractSettings::from_config_json`: /contract/address, /contract/collection, /contract/token_id
/// - `BuyerSettings::from_config_json`: /buyer/address
/// - `FlowConfig::from_config_json`: /flow/ledger_read_attempts, /flow/confirmation_timeout_ms
pub const CONSUMED_POINTERS: &[&str] = &[
    "/contract/address",
    "/contract/collection",
    "/contract/token_id",
    "/buyer/address",
    "/flow/ledger_read_attempts",
    "/flow/confirmation_timeout_ms",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnusedKeyReport {
    /// Leaf pointers no reader consumes (sorted, unique).
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// List leaves of `config` that nothing in [`CONSUMED_POINTERS`] covers.
///
/// Under `Fail` a non-empty list is an error.
pub fn report_unused_keys(config: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut unused: Vec<String> = leaves(config)
        .into_iter()
        .map(|(ptr, _)| ptr)
        .filter(|ptr| !CONSUMED_POINTERS.iter().any(|c| covers(c, ptr)))
        .collect();
    unused.sort();
    unused.dedup();

    if policy == UnusedKeyPolicy::Fail && !unused.is_empty() {
        let first: Vec<&String> = unused.iter().take(12).collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
             Remove them or teach a reader to consume them. First few: {first:?}",
            unused.len()
        );
    }

    Ok(UnusedKeyReport {
        unused_leaf_pointers: unused,
    })
}

/// "/a/b" covers "/a/b" and "/a/b/c" but not "/a/bc".
fn covers(consumed: &str, leaf: &str) -> bool {
    leaf.strip_prefix(consumed)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
