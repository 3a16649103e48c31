//! Typed views over the merged config JSON.
//!
//! Each reader pulls only the pointers listed in [`crate::CONSUMED_POINTERS`].

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_LEDGER_READ_ATTEMPTS: u32 = 3;
const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 120_000;

/// Knobs for one purchase flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    /// Ledger reads attempted before a malformed snapshot is surfaced. At least 1.
    pub ledger_read_attempts: u32,
    /// Upper bound on waiting for a submitted transaction.
    pub confirmation_timeout: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            ledger_read_attempts: DEFAULT_LEDGER_READ_ATTEMPTS,
            confirmation_timeout: Duration::from_millis(DEFAULT_CONFIRMATION_TIMEOUT_MS),
        }
    }
}

impl FlowConfig {
    /// Read `/flow/*`. Missing keys fall back to defaults; present keys must be valid.
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let mut out = Self::default();

        if let Some(v) = config.pointer("/flow/ledger_read_attempts") {
            let n = v
                .as_u64()
                .context("CONFIG_INVALID: /flow/ledger_read_attempts must be a non-negative integer")?;
            if n == 0 || n > u64::from(u32::MAX) {
                bail!("CONFIG_INVALID: /flow/ledger_read_attempts must be between 1 and {}", u32::MAX);
            }
            out.ledger_read_attempts = n as u32;
        }

        if let Some(v) = config.pointer("/flow/confirmation_timeout_ms") {
            let ms = v
                .as_u64()
                .context("CONFIG_INVALID: /flow/confirmation_timeout_ms must be a non-negative integer")?;
            if ms == 0 {
                bail!("CONFIG_INVALID: /flow/confirmation_timeout_ms must be > 0");
            }
            out.confirmation_timeout = Duration::from_millis(ms);
        }

        Ok(out)
    }
}

/// Which fractional contract a flow targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSettings {
    pub address: String,
    pub collection: String,
    pub token_id: u64,
}

impl ContractSettings {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        Ok(Self {
            address: required_str(config, "/contract/address")?,
            collection: required_str(config, "/contract/collection")?,
            token_id: config
                .pointer("/contract/token_id")
                .and_then(Value::as_u64)
                .context("CONFIG_MISSING: /contract/token_id (non-negative integer)")?,
        })
    }
}

/// The wallet address purchases are made from. Never a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerSettings {
    pub address: String,
}

impl BuyerSettings {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        Ok(Self {
            address: required_str(config, "/buyer/address")?,
        })
    }
}

fn required_str(config: &Value, ptr: &str) -> Result<String> {
    let s = config
        .pointer(ptr)
        .and_then(Value::as_str)
        .with_context(|| format!("CONFIG_MISSING: {ptr} (string)"))?;
    if s.trim().is_empty() {
        bail!("CONFIG_INVALID: {ptr} must not be empty");
    }
    Ok(s.trim().to_string())
}
