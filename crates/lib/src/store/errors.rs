//! Error types for document stores.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document is stored under the key.
    #[error("Document not found: {key}")]
    DocumentNotFound {
        /// The key that was looked up
        key: String,
    },

    /// The key cannot be stored.
    #[error("Invalid document key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// A batch was requested with a size that has no statement shape.
    #[error("No statement shape for a batch of {size} keys (supported: {supported:?})")]
    InvalidBatchSize {
        size: usize,
        supported: &'static [usize],
    },

    /// A statement template needed by the adapter is missing.
    #[error("No SQL statement configured for '{name}'")]
    MissingStatement { name: String },

    /// The configuration cannot produce a store.
    #[error("Invalid store configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The store has been closed.
    #[error("Store is closed")]
    Closed,

    /// Serializing a store snapshot failed.
    #[error("Snapshot serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Reading a store snapshot failed.
    #[error("Snapshot deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// SQL database operation failed.
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context and error message
        reason: String,
        /// The underlying sqlx error
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl StoreError {
    /// Check if this error indicates a document was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::DocumentNotFound { .. })
    }

    /// Check if this error rejects caller or configuration input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidKey { .. }
                | StoreError::InvalidBatchSize { .. }
                | StoreError::MissingStatement { .. }
                | StoreError::InvalidConfig { .. }
        )
    }

    /// Check if this error came from the database engine.
    pub fn is_database_error(&self) -> bool {
        matches!(self, StoreError::SqlxError { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, StoreError::Closed)
    }

    /// Get the document key associated with this error, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreError::DocumentNotFound { key } | StoreError::InvalidKey { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
