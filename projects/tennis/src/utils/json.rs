//! Helpers for the loosely shaped payloads the RapidAPI feeds return.
//!
//! Collections arrive either as arrays or as objects keyed by id, numbers
//! arrive either as JSON numbers or as strings such as `"64.5%"` or `"1,024"`.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Items of a collection that may be an array or an id-keyed object.
pub fn collection_items(payload: &Value) -> Option<Vec<&Value>> {
    match payload {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(map) => Some(map.values().collect()),
        _ => None,
    }
}

/// Truthiness as the upstream payloads use it: null, false, zero, and empty
/// strings or collections all count as "nothing there".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Non-empty string or number rendered as text.
pub fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_stat_number(s),
        _ => None,
    }
}

/// Parses `"64.5%"`, `"1,024"` or `" 12 "` style figures.
pub fn parse_stat_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().trim_end_matches('%').chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

pub fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(lenient_string)
}

pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_f64))
}

pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_string))
}
