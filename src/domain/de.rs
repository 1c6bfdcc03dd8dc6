//! Lenient integer decoding for chain and schedule JSON.
//!
//! Sui JSON-RPC renders `u64` fields as strings and smaller integers as numbers,
//! and the static schedule document mixes both.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_u64(value: &Value) -> Result<Option<u64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("expected unsigned integer, got {}", n)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<u64>()
                .map(Some)
                .map_err(|e| format!("invalid integer {:?}: {}", s, e))
        }
        // Move `Option<u64>` as rendered by some RPC versions: {"vec": [..]}
        Value::Object(map) => match map.get("vec") {
            Some(Value::Array(items)) => match items.first() {
                Some(inner) => value_to_u64(inner),
                None => Ok(None),
            },
            _ => Err(format!("unexpected object for integer field: {}", value)),
        },
        other => Err(format!("unexpected value for integer field: {}", other)),
    }
}

pub fn u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_u64(&value)
        .map_err(D::Error::custom)?
        .ok_or_else(|| D::Error::custom("missing integer value"))
}

pub fn opt_u64_lenient<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_u64(&value).map_err(D::Error::custom)
}
