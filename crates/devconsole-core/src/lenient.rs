//! Serde helpers for fields whose wire type the server does not guarantee
//!
//! Servers in other languages send `null` for empty lists, floats for
//! durations and strings for numbers. None of that should cost a frame.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` reads as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer, float (truncated) or numeric string; anything else reads as 0
pub(crate) fn number_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_u64(&value).unwrap_or(0))
}

/// Like [`number_u64`], with values above `u16::MAX` reading as 0
pub(crate) fn number_u16<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_u64(&value)
        .and_then(|n| u16::try_from(n).ok())
        .unwrap_or(0))
}

fn to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(float_to_u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_u64))
        }
        _ => None,
    }
}

fn float_to_u64(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then(|| f as u64)
}
