//! Key subtraction over JSON objects.
//!
//! The resolver explains a payload piece by piece: whatever a decoded shape
//! consumed is subtracted, and the remainder is handed to the next shape.
//! Consumed keys always come from re-serialising the decoded value, never
//! from the raw payload, so only keys a shape actually declares are removed.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::matcher::Decoded;

/// Returns the top-level keys a decoded value serialises to.
///
/// # Example
///
/// ```
/// use prototype_sdk::diff::keys_of;
/// use serde_json::json;
///
/// let encoded = json!({"foo": "x", "bar": 0});
/// let keys = keys_of(encoded.as_object().expect("object"));
/// assert!(keys.contains("foo") && keys.contains("bar"));
/// ```
#[must_use]
pub fn keys_of(encoded: &Map<String, Value>) -> BTreeSet<String> {
    encoded.keys().cloned().collect()
}

/// Returns the keys consumed by a decoded shape.
#[must_use]
pub fn consumed_keys(decoded: &Decoded) -> BTreeSet<String> {
    keys_of(decoded.json())
}

/// Returns `raw` without the consumed keys. The input is left untouched.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
///
/// use prototype_sdk::diff::subtract;
/// use serde_json::json;
///
/// let raw = json!({"foo": "x", "baz": "y"});
/// let consumed = BTreeSet::from([String::from("foo")]);
/// let remaining = subtract(raw.as_object().expect("object"), &consumed);
/// assert_eq!(remaining.len(), 1);
/// assert!(remaining.contains_key("baz"));
/// ```
#[must_use]
pub fn subtract(raw: &Map<String, Value>, consumed: &BTreeSet<String>) -> Map<String, Value> {
    raw.iter()
        .filter(|(key, _)| !consumed.contains(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Returns `true` when every remaining value is a zero value.
#[must_use]
pub fn is_empty(remaining: &Map<String, Value>) -> bool {
    remaining.values().all(is_zero)
}

/// Returns the keys whose values are not zero values, in key order.
#[must_use]
pub fn unexplained_keys(remaining: &Map<String, Value>) -> Vec<String> {
    remaining
        .iter()
        .filter(|(_, value)| !is_zero(value))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Returns `true` for `null`, `false`, `0`, `""`, `[]` and `{}`.
///
/// # Example
///
/// ```
/// use prototype_sdk::diff::is_zero;
/// use serde_json::json;
///
/// assert!(is_zero(&json!(0.0)));
/// assert!(is_zero(&json!({})));
/// assert!(!is_zero(&json!([0])));
/// ```
#[must_use]
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}
