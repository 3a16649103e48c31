//! Command handler modules for the `frac` CLI.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod evaluate;
#[cfg(feature = "testkit")]
pub mod simulate;

use anyhow::{Context, Result};
use frac_config::{load_layered_yaml, report_unused_keys, UnusedKeyPolicy};
use frac_ledger::RawLedger;
use std::fs;
use tracing::warn;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Read a `RawLedger` JSON file. Validation happens later, in `from_raw`.
pub fn load_raw_ledger(path: &str) -> Result<RawLedger> {
    let bytes = fs::read(path).with_context(|| format!("read ledger file failed: {}", path))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let raw = std::str::from_utf8(bytes).context("ledger file must be UTF-8 text")?;
    serde_json::from_str(raw.trim()).context("ledger file must contain a valid RawLedger JSON object")
}

/// Load layered config and report unused keys: warn, or fail when `strict`.
pub fn load_config(paths: &[&str], strict: bool) -> Result<frac_config::LoadedConfig> {
    let loaded = load_layered_yaml(paths)?;
    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;
    if !report.is_clean() {
        warn!(
            unused = ?report.unused_leaf_pointers,
            "config carries keys nothing reads"
        );
    }
    Ok(loaded)
}

pub fn config_hash(paths: &[&str], strict: bool) -> Result<()> {
    let loaded = load_config(paths, strict)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}
