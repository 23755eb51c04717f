//! Pure recursive merge of JSON values.
//!
//! Rules, applied field by field:
//! - a field only in `incoming` is added as is
//! - a field only in `base` is carried through
//! - an incoming `null` always wins and records an explicit null
//! - two objects merge recursively, two arrays concatenate
//! - two scalars of the same type take the incoming value
//! - a non-null base whose type differs from incoming is a conflict
//!
//! Inputs are never modified.

use serde_json::Value;

use super::{JsonError, Object, ValueType};
use crate::path::Path;

/// Merge `incoming` into a copy of `base`.
///
/// Existing fields keep their position; new fields are appended in the order
/// `incoming` lists them.
pub fn merge_objects(base: &Object, incoming: &Object) -> Result<Object, JsonError> {
    merge_objects_at(&Path::empty(), base, incoming)
}

/// Concatenate two arrays, base elements first.
pub fn merge_arrays(base: &[Value], incoming: &[Value]) -> Vec<Value> {
    let mut merged = Vec::with_capacity(base.len() + incoming.len());
    merged.extend_from_slice(base);
    merged.extend_from_slice(incoming);
    merged
}

/// Merge two arbitrary values under the same rules as a single field.
pub fn merge_values(base: &Value, incoming: &Value) -> Result<Value, JsonError> {
    merge_field(&Path::empty(), base, incoming)
}

fn merge_objects_at(prefix: &Path, base: &Object, incoming: &Object) -> Result<Object, JsonError> {
    let mut merged = base.clone();
    for (name, value) in incoming {
        let next = match base.get(name) {
            Some(existing) => merge_field(&prefix.with(name), existing, value)?,
            None => value.clone(),
        };
        merged.insert(name.clone(), next);
    }
    Ok(merged)
}

fn merge_field(field: &Path, existing: &Value, incoming: &Value) -> Result<Value, JsonError> {
    let incoming_type = ValueType::of(incoming);
    if incoming_type == ValueType::Null {
        return Ok(Value::Null);
    }

    let existing_type = ValueType::of(existing);
    if existing_type != ValueType::Null && existing_type != incoming_type {
        return Err(JsonError::TypeConflict {
            field: field.to_string(),
            existing: existing_type,
            incoming: incoming_type,
        });
    }

    Ok(match (existing, incoming) {
        (Value::Object(base), Value::Object(update)) => {
            Value::Object(merge_objects_at(field, base, update)?)
        }
        (Value::Array(base), Value::Array(update)) => Value::Array(merge_arrays(base, update)),
        _ => incoming.clone(),
    })
}
