//! Serde adapter for wei amounts (`u128`).
//!
//! Serialized as a decimal string so values above `u64::MAX` survive JSON
//! consumers that parse numbers as doubles. Deserialization accepts either a
//! decimal string or a JSON integer that fits in `u64`. Floats are rejected.
//!
//! Use with `#[serde(with = "frac_ledger::wei")]`.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(WeiVisitor)
}

struct WeiVisitor;

impl<'de> Visitor<'de> for WeiVisitor {
    type Value = u128;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer wei amount (decimal string or integer)")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
        Ok(v as u128)
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
        u128::try_from(v).map_err(|_| E::custom(format!("wei amount must be >= 0, got {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u128, E> {
        Err(E::custom(format!(
            "wei amount {v} is not an exact integer; pass large values as a decimal string"
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
        v.trim()
            .parse::<u128>()
            .map_err(|_| E::custom(format!("invalid wei amount '{v}'")))
    }
}
