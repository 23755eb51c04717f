//! JSON value helpers: path lookup, copy-on-write overlays and merge.
//!
//! Values are plain [`serde_json::Value`] trees. Objects keep insertion order,
//! which makes merged output and overlay materialization deterministic.
//!
//! Two field encodings sit on top of plain JSON: binary data is stored as
//! base64 text and dates are stored as milliseconds since the Unix epoch.

mod editable;
mod errors;
mod merge;

use std::fmt;

use base64ct::{Base64, Encoding};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use serde_json::{Map, Value};

pub use editable::{EditableArray, EditableObject};
pub use errors::JsonError;
pub use merge::{merge_arrays, merge_objects, merge_values};

use crate::path::{Path, parse_index};

/// A JSON object with string keys.
pub type Object = Map<String, Value>;

/// The kind of a JSON value, used to detect merge conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }

    /// Objects and arrays.
    pub fn is_composite(self) -> bool {
        matches!(self, ValueType::Array | ValueType::Object)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Walk `path` from `root`.
///
/// Objects are entered by field name and arrays by numeric segment. A missing
/// field, an out-of-range index or a scalar in the middle of the path all
/// yield `Ok(None)`. A non-numeric segment applied to an array is an error.
/// The empty path addresses `root` itself.
pub fn value_at_path<'a>(root: &'a Value, path: &Path) -> Result<Option<&'a Value>, JsonError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => match parse_index(segment) {
                Some(index) => items.get(index),
                None => {
                    return Err(JsonError::NotAnArrayIndex {
                        path: path_prefix(path, depth + 1),
                        segment: segment.to_string(),
                    });
                }
            },
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Walk `path` starting from the fields of an object.
///
/// Unlike [`value_at_path`] the root here is a bare map, so the empty path
/// has nothing to address and yields `Ok(None)`.
pub fn field_at_path<'a>(root: &'a Object, path: &Path) -> Result<Option<&'a Value>, JsonError> {
    let Some(first) = path.first() else {
        return Ok(None);
    };
    let Some(value) = root.get(first) else {
        return Ok(None);
    };
    let mut current = Some(value);
    for (depth, segment) in path.iter().enumerate().skip(1) {
        current = match current {
            Some(Value::Object(map)) => map.get(segment),
            Some(Value::Array(items)) => match parse_index(segment) {
                Some(index) => items.get(index),
                None => {
                    return Err(JsonError::NotAnArrayIndex {
                        path: path_prefix(path, depth + 1),
                        segment: segment.to_string(),
                    });
                }
            },
            _ => return Ok(None),
        };
    }
    Ok(current)
}

fn path_prefix(path: &Path, size: usize) -> String {
    path.ancestor_of_size(size)
        .map(|prefix| prefix.to_string())
        .unwrap_or_else(|_| path.to_string())
}

/// Encode bytes the way binary fields are stored.
pub fn binary_value(data: &[u8]) -> Value {
    Value::String(Base64::encode_string(data))
}

/// Decode a binary field. `field` names it in the error.
pub fn decode_binary(field: &str, value: &Value) -> Result<Vec<u8>, JsonError> {
    let Value::String(text) = value else {
        return Err(JsonError::InvalidBinary {
            field: field.to_string(),
            reason: format!("expected a base64 string, found {}", ValueType::of(value)),
        });
    };
    Base64::decode_vec(text).map_err(|e| JsonError::InvalidBinary {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a date the way date fields are stored.
pub fn date_value(date: DateTime<Utc>) -> Value {
    Value::from(date.timestamp_millis())
}

/// Decode a date field. `field` names it in the error.
pub fn decode_date(field: &str, value: &Value) -> Result<DateTime<Utc>, JsonError> {
    value
        .as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| JsonError::InvalidDate {
            field: field.to_string(),
        })
}

/// Require an object, as document bodies must be.
pub fn into_object(value: Value) -> Result<Object, JsonError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(JsonError::NotAnObject {
            found: ValueType::of(&other),
        }),
    }
}
