//! Key-based document persistence.
//!
//! [`DocumentStore`] is the single seam between documents and storage. Two
//! implementations exist:
//!
//! - [`InMemory`]: records in a sorted map, for tests and ephemeral use
//! - [`SqlStore`]: one relational table reached through sqlx
//!
//! Both store each document as an encoded payload alongside its format code,
//! schema key and creation/modification timestamps.
//!
//! Stores take `&mut self` for every operation. One store owns one connection
//! and is used by one task at a time; wrap it in a lock to share it.

pub mod batch;
pub mod config;
mod errors;
mod in_memory;
pub mod sql;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

pub use config::{Backend, StoreConfig};
pub use errors::StoreError;
pub use in_memory::InMemory;
pub use sql::SqlStore;

use crate::{
    Result,
    constants::MAX_KEY_LENGTH,
    document::Document,
    json::Object,
};

/// What a single write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// No document existed under the key.
    Inserted,
    /// An existing document was replaced.
    Overwritten,
}

impl WriteOutcome {
    /// Interpret the affected-row count of an upsert.
    ///
    /// Engines like MySQL count an upsert that updates an existing row as two
    /// affected rows and a fresh insert as one.
    pub fn from_upsert_rows(rows_affected: u64) -> Self {
        if rows_affected > 1 {
            WriteOutcome::Overwritten
        } else {
            WriteOutcome::Inserted
        }
    }

    pub fn is_overwritten(self) -> bool {
        self == WriteOutcome::Overwritten
    }

    pub fn is_inserted(self) -> bool {
        self == WriteOutcome::Inserted
    }
}

/// Per-key outcomes of a bulk write.
///
/// Empty unless the write was asked to capture outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkWriteReport {
    outcomes: HashMap<String, WriteOutcome>,
}

impl BulkWriteReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `key`, replacing an earlier one.
    pub fn record(&mut self, key: impl Into<String>, outcome: WriteOutcome) {
        self.outcomes.insert(key.into(), outcome);
    }

    /// What the write did for `key`, if it was captured.
    pub fn outcome(&self, key: &str) -> Option<WriteOutcome> {
        self.outcomes.get(key).copied()
    }

    pub fn is_inserted(&self, key: &str) -> bool {
        self.outcome(key).is_some_and(WriteOutcome::is_inserted)
    }

    pub fn is_overwritten(&self, key: &str) -> bool {
        self.outcome(key).is_some_and(WriteOutcome::is_overwritten)
    }

    /// Keys that were newly inserted, sorted.
    pub fn inserted_keys(&self) -> Vec<&str> {
        self.keys_with(WriteOutcome::Inserted)
    }

    /// Keys whose documents were replaced, sorted.
    pub fn overwritten_keys(&self) -> Vec<&str> {
        self.keys_with(WriteOutcome::Overwritten)
    }

    fn keys_with(&self, outcome: WriteOutcome) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .outcomes
            .iter()
            .filter(|(_, o)| **o == outcome)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Bookkeeping columns stored next to a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMetadata {
    pub schema_key: Option<String>,
    /// Format code of the stored payload.
    pub format: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch.
    pub modified_at: i64,
}

/// Reject keys that cannot be stored.
pub fn validate_key(key: &str) -> std::result::Result<(), StoreError> {
    let reason = if key.is_empty() {
        "key must not be empty".to_string()
    } else if key.len() > MAX_KEY_LENGTH {
        format!("key is longer than {MAX_KEY_LENGTH} bytes")
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

/// The listed keys without repeats, in first-seen order.
pub fn distinct_keys(keys: &[String]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect()
}

/// Persistence operations over documents addressed by key.
#[async_trait]
pub trait DocumentStore: Send {
    /// Number of stored documents.
    async fn size(&mut self) -> Result<u64>;

    async fn has(&mut self, key: &str) -> Result<bool>;

    /// Read one document. A missing key is `StoreError::DocumentNotFound`.
    async fn read(&mut self, key: &str) -> Result<Document>;

    /// Read every listed document that exists. Missing keys are skipped,
    /// each document is returned once however often its key is listed, and
    /// the result order is unspecified.
    async fn read_multiple(&mut self, keys: &[String]) -> Result<Vec<Document>>;

    async fn all_keys(&mut self) -> Result<Vec<String>>;

    async fn all_documents(&mut self) -> Result<Vec<Document>>;

    /// Timestamps and format of a stored record.
    async fn metadata(&mut self, key: &str) -> Result<RecordMetadata>;

    /// Store a document, replacing any previous one under its key.
    async fn write(&mut self, document: &Document) -> Result<WriteOutcome>;

    /// Store a document only if its key is unused. Returns whether it was
    /// inserted.
    async fn write_if_absent(&mut self, document: &Document) -> Result<bool>;

    async fn remove(&mut self, key: &str) -> Result<()>;

    /// Remove every listed key. Missing and repeated keys are ignored.
    async fn remove_multiple(&mut self, keys: &[String]) -> Result<()>;

    /// Release the underlying resources. Further calls fail with
    /// `StoreError::Closed`.
    async fn close(&mut self) -> Result<()>;

    /// Merge `incoming` into the stored document under `key` and persist the
    /// result. When nothing is stored yet, `incoming` is written as is.
    async fn merge(&mut self, key: &str, incoming: &Object) -> Result<Document> {
        let merged = match self.read(key).await {
            Ok(existing) => existing.merged_with(incoming)?,
            Err(e) if e.is_not_found() => Document::new(key, incoming.clone()),
            Err(e) => return Err(e),
        };
        self.write(&merged).await?;
        debug!(key, "merged document");
        Ok(merged)
    }

    /// Write each document in turn. Outcomes are recorded only when
    /// `capture` is set. Documents already written stay written when a later
    /// one fails.
    async fn write_multiple(
        &mut self,
        documents: &[Document],
        capture: bool,
    ) -> Result<BulkWriteReport> {
        let mut report = BulkWriteReport::new();
        for document in documents {
            let outcome = self.write(document).await?;
            if capture {
                report.record(document.key(), outcome);
            }
        }
        Ok(report)
    }
}

/// Open the store described by `config`.
pub async fn open(config: &StoreConfig) -> Result<Box<dyn DocumentStore>> {
    match &config.backend {
        Backend::InMemory => Ok(Box::new(InMemory::with_format(config.format))),
        _ => Ok(Box::new(SqlStore::open(config).await?)),
    }
}
