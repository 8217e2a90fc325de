//! Lenient deserializers for daemon payloads.
//!
//! Deluge 1.x and 2.x disagree on whether some fields (eta, queue, counters)
//! are sent as integers or floats, and both send `null` for fields the
//! daemon cannot compute yet. These deserializers accept either shape.

use serde::{Deserialize, Deserializer};

/// Treats an explicit `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn deserialize_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let num = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(num.map(|n| number_to_i64(&n)).unwrap_or_default())
}

pub fn deserialize_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let num = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(num.and_then(|n| n.as_f64()).unwrap_or_default())
}

fn number_to_i64(num: &serde_json::Number) -> i64 {
    num.as_i64()
        .or_else(|| num.as_u64().map(|u| u.min(i64::MAX as u64) as i64))
        .or_else(|| num.as_f64().map(|f| f.round() as i64))
        .unwrap_or_default()
}
