//! Coercion helpers for loosely-typed input values

use serde_json::Value;

/// String form of a value, computed at insertion time.
///
/// Arrays and objects keep their JSON representation; null becomes empty.
pub fn string_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Normalize a value into a flat list of strings.
///
/// Null yields nothing, a sequence is used element by element, and any
/// scalar becomes a one-element list.
pub fn wrap(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(string_of).collect(),
        other => vec![string_of(&other)],
    }
}
