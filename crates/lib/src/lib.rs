//!
//! Tabula: a document store over a single relational table.
//!
//! Documents are JSON objects identified by a caller-assigned key, persisted as
//! opaque encoded blobs, and combined with a deterministic merge.
//!
//! ## Core Concepts
//!
//! * **Paths (`path::Path`)**: Immutable dotted field addresses such as
//!   `address.city` or `tags.0`, specialized by segment count.
//! * **Documents (`document::Document`)**: A key, an object body, and an
//!   optional schema key. Identity is the key alone.
//! * **Overlays (`json::EditableObject`, `json::EditableArray`)**: Copy-on-write
//!   views that record edits without touching the base value.
//! * **Merge (`json::merge_objects`)**: Pure recursive combination where an
//!   incoming null wins, arrays concatenate and scalars overwrite.
//! * **Stores (`store::DocumentStore`)**: Key-based persistence, backed either by
//!   memory or by a SQL table reached through sqlx.

pub mod clock;
pub mod codec;
pub mod constants;
pub mod document;
pub mod json;
pub mod path;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::DocumentFormat;
pub use document::Document;
pub use path::Path;
pub use store::{BulkWriteReport, DocumentStore, StoreConfig, WriteOutcome};

/// Result type used throughout the Tabula library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Tabula library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured path errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Structured value errors from the json module
    #[error(transparent)]
    Json(json::JsonError),

    /// Structured encoding errors from the codec module
    #[error(transparent)]
    Codec(codec::CodecError),

    /// Structured persistence errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Json(_) => "json",
            Error::Codec(_) => "codec",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates that caller input was rejected.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Path(_) => true,
            Error::Json(json_err) => json_err.is_validation_error(),
            Error::Store(store_err) => store_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error indicates two values could not be reconciled.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Json(json_err) => json_err.is_type_conflict(),
            _ => false,
        }
    }

    /// Check if this error is database/store-related.
    pub fn is_database_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_database_error(),
            _ => false,
        }
    }

    /// Check if this error came from encoding or decoding a payload.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Error::Codec(_))
    }
}
