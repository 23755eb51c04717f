//! Error types for value access, overlays and merges.

use thiserror::Error;

use super::ValueType;

/// Structured errors raised while reading or combining JSON values.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonError {
    /// A path walked into an array with a segment that is not an index.
    #[error("Path '{path}' indexes an array with non-numeric segment '{segment}'")]
    NotAnArrayIndex { path: String, segment: String },

    /// Both sides of a merge hold incompatible types for the same field.
    #[error("Cannot merge field '{field}': existing {existing} conflicts with incoming {incoming}")]
    TypeConflict {
        field: String,
        existing: ValueType,
        incoming: ValueType,
    },

    /// A binary field did not hold valid base64 text.
    #[error("Field '{field}' is not valid binary data: {reason}")]
    InvalidBinary { field: String, reason: String },

    /// A date field did not hold epoch milliseconds in range.
    #[error("Field '{field}' is not a valid date")]
    InvalidDate { field: String },

    /// Document content must be an object.
    #[error("Expected a JSON object but found {found}")]
    NotAnObject { found: ValueType },
}

impl JsonError {
    /// Check if this error is a merge type conflict.
    pub fn is_type_conflict(&self) -> bool {
        matches!(self, JsonError::TypeConflict { .. })
    }

    /// Check if this error is a bad array index in a path.
    pub fn is_array_index_error(&self) -> bool {
        matches!(self, JsonError::NotAnArrayIndex { .. })
    }

    /// Check if this error came from decoding a typed field.
    pub fn is_field_decode_error(&self) -> bool {
        matches!(
            self,
            JsonError::InvalidBinary { .. } | JsonError::InvalidDate { .. }
        )
    }

    /// Check if this error rejects caller-supplied input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            JsonError::NotAnArrayIndex { .. } | JsonError::NotAnObject { .. }
        )
    }

    /// Get the field or path this error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            JsonError::NotAnArrayIndex { path, .. } => Some(path),
            JsonError::TypeConflict { field, .. }
            | JsonError::InvalidBinary { field, .. }
            | JsonError::InvalidDate { field } => Some(field),
            JsonError::NotAnObject { .. } => None,
        }
    }
}

impl From<JsonError> for crate::Error {
    fn from(err: JsonError) -> Self {
        crate::Error::Json(err)
    }
}
