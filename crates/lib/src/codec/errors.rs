//! Error types for payload encoding.

use thiserror::Error;

use super::DocumentFormat;

/// Errors raised while turning documents into payloads and back.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// A stored format code has no codec.
    #[error("Unknown document format code {code}")]
    UnknownFormat { code: i64 },

    /// A format name from configuration was not recognized.
    #[error("Unknown document format name '{name}'")]
    UnknownFormatName { name: String },

    /// Encoding a document failed.
    #[error("Failed to encode document '{key}' as {format}: {reason}")]
    EncodeFailed {
        key: String,
        format: DocumentFormat,
        reason: String,
    },

    /// Decoding a payload failed.
    #[error("Failed to decode document '{key}' from {format}: {reason}")]
    DecodeFailed {
        key: String,
        format: DocumentFormat,
        reason: String,
    },
}

impl CodecError {
    /// Check if this error is due to an unrecognized format.
    pub fn is_unknown_format(&self) -> bool {
        matches!(
            self,
            CodecError::UnknownFormat { .. } | CodecError::UnknownFormatName { .. }
        )
    }

    /// Check if this error came from reading a stored payload.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, CodecError::DecodeFailed { .. })
    }

    pub fn is_encode_error(&self) -> bool {
        matches!(self, CodecError::EncodeFailed { .. })
    }
}

impl From<CodecError> for crate::Error {
    fn from(err: CodecError) -> Self {
        crate::Error::Codec(err)
    }
}
