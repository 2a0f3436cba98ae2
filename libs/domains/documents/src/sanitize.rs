//! Metadata sanitization: coerce arbitrary JSON into the flat scalar mapping
//! the store accepts.

use serde_json::Value;

use crate::models::Metadata;

/// Sanitize caller-supplied metadata into a flat scalar mapping.
///
/// Non-object input (including arrays) is dropped entirely. Scalar values
/// (string, number, boolean, null) pass through unchanged. Array and object
/// values are lossily replaced by their compact JSON text, so round-tripping
/// is not guaranteed. An empty surviving map is reported as `None`, making
/// "no metadata" and "all keys dropped" indistinguishable downstream.
pub fn sanitize_metadata(input: Option<&Value>) -> Option<Metadata> {
    let map = match input {
        Some(Value::Object(map)) => map,
        _ => return None,
    };

    let mut out = Metadata::new();
    for (key, value) in map {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                out.insert(key.clone(), value.clone());
            }
            Value::Array(_) | Value::Object(_) => {
                out.insert(key.clone(), Value::String(value.to_string()));
            }
        }
    }

    if out.is_empty() { None } else { Some(out) }
}
