//! Literal-secret guard.
//!
//! Config carries addresses and env-var names, never key material. A leaf
//! that looks like a key, extended key or seed phrase fails the load. The
//! value is never echoed back.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::walk::leaves;

/// Literal prefixes that identify key material.
const KEY_PREFIXES: &[&str] = &[
    "-----BEGIN", // PEM
    "xprv",       // BIP-32 extended private key
    "tprv",       // BIP-32 extended private key (testnet)
];

/// Seed phrase lengths allowed by BIP-39.
const MNEMONIC_WORD_COUNTS: &[usize] = &[12, 15, 18, 21, 24];

pub(crate) fn refuse_secret_literals(config: &Value) -> Result<()> {
    for (ptr, v) in leaves(config) {
        if let Value::String(s) = v {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={ptr} value=REDACTED");
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    KEY_PREFIXES.iter().any(|p| t.starts_with(p)) || is_raw_key(t) || is_mnemonic(t)
}

/// 32 bytes of hex, `0x` optional. Addresses (20 bytes) do not match.
fn is_raw_key(t: &str) -> bool {
    let digits = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);
    digits.len() == 64 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_mnemonic(t: &str) -> bool {
    let words: Vec<&str> = t.split_whitespace().collect();
    MNEMONIC_WORD_COUNTS.contains(&words.len())
        && words.iter().all(|w| w.bytes().all(|b| b.is_ascii_lowercase()))
}
