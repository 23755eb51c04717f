//! Snapshot files for the in-memory store.
//!
//! A snapshot is a JSON file mapping each key to its stored record, with the
//! payload as base64 text.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};

use super::{InMemory, StoredRecord};
use crate::{Error, Result, store::StoreError};

/// The current snapshot file format version.
const SNAPSHOT_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

fn validate_snapshot_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != SNAPSHOT_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported snapshot version {version}; only version {SNAPSHOT_VERSION} is supported"
        )));
    }
    Ok(version)
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_snapshot_version"
    )]
    version: u8,
    records: BTreeMap<String, StoredRecord>,
}

/// Payload bytes as base64 text.
pub(crate) mod base64_payload {
    use base64ct::{Base64, Encoding};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Base64::encode_string(payload))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Base64::decode_vec(&text).map_err(serde::de::Error::custom)
    }
}

impl InMemory {
    /// Save every record to `path` as a JSON snapshot.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            records: self.records()?.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| -> Error { StoreError::SerializationFailed { source: e }.into() })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })
    }

    /// Load a store from a snapshot written by [`InMemory::save_to_file`].
    ///
    /// A missing file yields a new, empty store.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => {
                let snapshot: Snapshot = serde_json::from_str(&json).map_err(|e| -> Error {
                    StoreError::DeserializationFailed { source: e }.into()
                })?;
                let mut store = InMemory::new();
                store.records = snapshot.records;
                Ok(store)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
            Err(e) => Err(StoreError::FileIo { source: e }.into()),
        }
    }
}
