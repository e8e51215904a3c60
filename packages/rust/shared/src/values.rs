//! Presence rules for loosely-typed JSON-LD values.
//!
//! Crate metadata leaves most properties optional and producers disagree on
//! whether "nothing" is `null`, `""`, `[]` or `{}`. Every summary stage asks
//! these helpers instead of inspecting values directly.

use serde_json::Value;

/// Whether a value is `null`, an empty string, an empty list, or an empty object.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Keep a value only when it is not blank.
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !is_blank(v))
}

/// Keep a string only when it is non-empty.
pub fn non_empty<S: AsRef<str>>(value: Option<S>) -> Option<S> {
    value.filter(|s| !s.as_ref().is_empty())
}

/// Render a scalar as text: non-empty strings as-is, numbers in decimal.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The `@id` of a `{"@id": ...}` reference object.
pub fn reference_id(value: &Value) -> Option<&str> {
    value.as_object()?.get("@id")?.as_str()
}

/// Parse a `position` property into an integer.
///
/// Integers pass through, finite floats are truncated, booleans count as
/// 0 or 1, and strings are parsed after trimming surrounding whitespace.
/// Anything else has no position.
pub fn parse_position(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
