//! In-memory document store
//!
//! Records live in a sorted map and are encoded exactly as the SQL store
//! encodes them, so codecs and timestamps behave the same in tests as in a
//! database. State can be saved to and loaded from a JSON snapshot file.

mod persistence;

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    clock::{Clock, SystemClock},
    codec::DocumentFormat,
    document::Document,
    store::{
        DocumentStore, RecordMetadata, StoreError, WriteOutcome, distinct_keys, validate_key,
    },
};

/// One stored document, as the table row would hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) schema_key: Option<String>,
    pub(crate) format: i64,
    pub(crate) created_at: i64,
    pub(crate) modified_at: i64,
    #[serde(with = "persistence::base64_payload")]
    pub(crate) payload: Vec<u8>,
}

impl StoredRecord {
    fn decode(&self, key: &str) -> Result<Document> {
        let format = DocumentFormat::from_code(self.format)?;
        Ok(format.decode(key, &self.payload, self.schema_key.clone())?)
    }

    fn metadata(&self) -> RecordMetadata {
        RecordMetadata {
            schema_key: self.schema_key.clone(),
            format: self.format,
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

/// A document store held entirely in process memory.
#[derive(Debug)]
pub struct InMemory {
    pub(crate) records: BTreeMap<String, StoredRecord>,
    format: DocumentFormat,
    clock: Arc<dyn Clock>,
    closed: bool,
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemory {
    /// Creates a new, empty store writing JSON payloads.
    pub fn new() -> Self {
        Self::with_format(DocumentFormat::default())
    }

    /// Creates a new, empty store writing payloads in `format`.
    pub fn with_format(format: DocumentFormat) -> Self {
        Self {
            records: BTreeMap::new(),
            format,
            clock: Arc::new(SystemClock),
            closed: false,
        }
    }

    /// Write new payloads in `format`. Stored records keep theirs.
    pub fn with_write_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    /// Use `clock` for record timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Format used for new writes.
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    fn records(&self) -> std::result::Result<&BTreeMap<String, StoredRecord>, StoreError> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(&self.records)
        }
    }

    fn records_mut(&mut self) -> std::result::Result<&mut BTreeMap<String, StoredRecord>, StoreError> {
        if self.closed {
            Err(StoreError::Closed)
        } else {
            Ok(&mut self.records)
        }
    }

    fn encode(&self, document: &Document) -> Result<(Vec<u8>, i64)> {
        validate_key(document.key())?;
        Ok((self.format.encode(document)?, self.clock.now_timestamp()))
    }
}

#[async_trait]
impl DocumentStore for InMemory {
    async fn size(&mut self) -> Result<u64> {
        Ok(self.records()?.len() as u64)
    }

    async fn has(&mut self, key: &str) -> Result<bool> {
        Ok(self.records()?.contains_key(key))
    }

    async fn read(&mut self, key: &str) -> Result<Document> {
        match self.records()?.get(key) {
            Some(record) => record.decode(key),
            None => Err(StoreError::DocumentNotFound {
                key: key.to_string(),
            }
            .into()),
        }
    }

    async fn read_multiple(&mut self, keys: &[String]) -> Result<Vec<Document>> {
        let records = self.records()?;
        distinct_keys(keys)
            .into_iter()
            .filter_map(|key| records.get(key).map(|record| record.decode(key)))
            .collect()
    }

    async fn all_keys(&mut self) -> Result<Vec<String>> {
        Ok(self.records()?.keys().cloned().collect())
    }

    async fn all_documents(&mut self) -> Result<Vec<Document>> {
        self.records()?
            .iter()
            .map(|(key, record)| record.decode(key))
            .collect()
    }

    async fn metadata(&mut self, key: &str) -> Result<RecordMetadata> {
        self.records()?
            .get(key)
            .map(StoredRecord::metadata)
            .ok_or_else(|| {
                StoreError::DocumentNotFound {
                    key: key.to_string(),
                }
                .into()
            })
    }

    async fn write(&mut self, document: &Document) -> Result<WriteOutcome> {
        let (payload, now) = self.encode(document)?;
        let format = self.format.code();
        let schema_key = document.schema_key().map(str::to_string);
        let records = self.records_mut()?;

        let outcome = match records.get_mut(document.key()) {
            Some(record) => {
                record.schema_key = schema_key;
                record.format = format;
                record.modified_at = now;
                record.payload = payload;
                WriteOutcome::Overwritten
            }
            None => {
                records.insert(
                    document.key().to_string(),
                    StoredRecord {
                        schema_key,
                        format,
                        created_at: now,
                        modified_at: now,
                        payload,
                    },
                );
                WriteOutcome::Inserted
            }
        };
        debug!(key = document.key(), ?outcome, "wrote document");
        Ok(outcome)
    }

    async fn write_if_absent(&mut self, document: &Document) -> Result<bool> {
        if self.records()?.contains_key(document.key()) {
            return Ok(false);
        }
        self.write(document).await?;
        Ok(true)
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        self.records_mut()?.remove(key);
        Ok(())
    }

    async fn remove_multiple(&mut self, keys: &[String]) -> Result<()> {
        let records = self.records_mut()?;
        for key in keys {
            records.remove(key);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.records()?;
        self.closed = true;
        Ok(())
    }
}
