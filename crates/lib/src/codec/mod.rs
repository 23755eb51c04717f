//! Payload formats for stored documents.
//!
//! Every stored record carries a numeric format code next to its payload so
//! records written in different formats can share one table. Only the content
//! object is encoded; key and schema key live in their own columns.

mod errors;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use errors::CodecError;

use crate::{document::Document, json::Object};

/// Encoding used for a document payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// UTF-8 JSON text, code 0.
    #[default]
    Json,
    /// Binary CBOR (DAG-CBOR encoding), code 1.
    Cbor,
}

impl DocumentFormat {
    /// All supported formats.
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Json, DocumentFormat::Cbor];

    /// The code stored in the `format` column.
    pub const fn code(self) -> i64 {
        match self {
            DocumentFormat::Json => 0,
            DocumentFormat::Cbor => 1,
        }
    }

    /// Resolve a stored format code.
    pub fn from_code(code: i64) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|format| format.code() == code)
            .ok_or(CodecError::UnknownFormat { code })
    }

    pub const fn name(self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Cbor => "cbor",
        }
    }

    /// Encode a document's content.
    pub fn encode(self, document: &Document) -> Result<Vec<u8>, CodecError> {
        let encoded = match self {
            DocumentFormat::Json => {
                serde_json::to_vec(document.content()).map_err(|e| e.to_string())
            }
            DocumentFormat::Cbor => {
                serde_ipld_dagcbor::to_vec(document.content()).map_err(|e| e.to_string())
            }
        };
        encoded.map_err(|reason| CodecError::EncodeFailed {
            key: document.key().to_string(),
            format: self,
            reason,
        })
    }

    /// Decode a payload back into a document.
    pub fn decode(
        self,
        key: &str,
        payload: &[u8],
        schema_key: Option<String>,
    ) -> Result<Document, CodecError> {
        let content: Object = match self {
            DocumentFormat::Json => serde_json::from_slice(payload).map_err(|e| e.to_string()),
            DocumentFormat::Cbor => {
                serde_ipld_dagcbor::from_slice(payload).map_err(|e| e.to_string())
            }
        }
        .map_err(|reason| CodecError::DecodeFailed {
            key: key.to_string(),
            format: self,
            reason,
        })?;

        let document = Document::new(key, content);
        Ok(match schema_key {
            Some(schema_key) => document.with_schema_key(schema_key),
            None => document,
        })
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CodecError::UnknownFormatName {
                name: s.to_string(),
            })
    }
}
