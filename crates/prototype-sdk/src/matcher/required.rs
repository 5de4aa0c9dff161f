//! Mandatory-field validation over re-encoded shapes.

use serde_json::{Map, Value};

use crate::diff::is_zero;
use crate::schema::{Field, Schema};

/// Checks every mandatory field of `schema`, descending into nested shapes.
///
/// Returns the dotted path of the first mandatory field that is missing or
/// holds its zero value.
pub(crate) fn validate(schema: &Schema, encoded: &Map<String, Value>) -> Result<(), String> {
    validate_at(schema, encoded, "")
}

fn validate_at(schema: &Schema, encoded: &Map<String, Value>, prefix: &str) -> Result<(), String> {
    for field in schema.fields() {
        let path = format!("{prefix}{}", field.key());
        let value = encoded.get(field.key());
        if field.is_required() && value.is_none_or(|held| is_unset(field, held)) {
            return Err(path);
        }
        if let (Some(nested), Some(value)) = (field.nested(), value) {
            validate_nested(nested, value, &path)?;
        }
    }
    Ok(())
}

/// A nested shape is unset when every field it encodes is zero, recursively.
fn is_unset(field: &Field, value: &Value) -> bool {
    if field.nested().is_some() {
        is_zero_shape(value)
    } else {
        is_zero(value)
    }
}

fn is_zero_shape(value: &Value) -> bool {
    match value {
        Value::Object(entries) => entries.values().all(is_zero_shape),
        other => is_zero(other),
    }
}

fn validate_nested(schema: &Schema, value: &Value, path: &str) -> Result<(), String> {
    match value {
        Value::Object(entries) => validate_at(schema, entries, &format!("{path}.")),
        Value::Array(items) => items.iter().enumerate().try_for_each(|(index, item)| {
            validate_nested(schema, item, &format!("{path}[{index}]"))
        }),
        _ => Ok(()),
    }
}
