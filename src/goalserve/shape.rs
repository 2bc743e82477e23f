//! Serde helpers for the feed's loosely typed JSON.
//!
//! The upstream serializes a list holding exactly one element as a bare object,
//! an empty list as `null` (or omits it), and numbers as strings or numbers
//! depending on the endpoint. Everything here resolves those shapes before the
//! typed structs see them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Normalize an optional JSON value into a list by inspecting its shape:
/// array → its items, object → one item, null/absent/scalar → empty.
pub fn into_list(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(object @ Value::Object(_)) => vec![object],
        Some(_) | None => Vec::new(),
    }
}

/// `deserialize_with` adapter for fields that hold either one object or an array.
///
/// Items stay raw so that each one can be decoded, and fail, on its own.
pub fn raw_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(into_list(Option::<Value>::deserialize(deserializer)?))
}

/// Accept strings, numbers and booleans as text; null or absent becomes empty.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    })
}

/// Treat an explicit `null` like an absent field.
pub fn default_on_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
