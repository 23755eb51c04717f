use std::sync::Arc;

use serde_json::{Value, json};
use tabula::{
    Document, DocumentStore, FixedClock, StoreConfig,
    json::Object,
    store::{InMemory, SqlStore},
};

// ==========================
// CORE TEST FACTORIES
// ==========================

/// Creates a test store based on the TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory store (default)
/// - "sqlite": SQLite in-memory store
/// - "postgres": PostgreSQL store at TEST_POSTGRES_URL, in a table with a
///   unique prefix so tests never see each other's rows
///
/// ```bash
/// TEST_BACKEND=sqlite cargo test
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/tabula_test" cargo test
/// ```
pub async fn test_store() -> Box<dyn DocumentStore> {
    let clock = Arc::new(FixedClock::default());
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => Box::new(sqlite_store().await.with_clock(clock)),
        Ok("postgres") => {
            let url = std::env::var("TEST_POSTGRES_URL")
                .unwrap_or_else(|_| "postgres://localhost/tabula_test".to_string());
            let prefix = format!("T{}_", uuid::Uuid::new_v4().simple());
            let config = StoreConfig::postgres(url).with_table_prefix(prefix);
            Box::new(
                SqlStore::open(&config)
                    .await
                    .expect("Failed to connect to PostgreSQL")
                    .with_clock(clock),
            )
        }
        Ok("inmemory") | Ok("") | Err(_) => Box::new(InMemory::new().with_clock(clock)),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// A fresh SQLite in-memory store.
pub async fn sqlite_store() -> SqlStore {
    SqlStore::sqlite_in_memory()
        .await
        .expect("Failed to create SQLite store")
}

/// A fresh SQLite in-memory store with a controllable clock.
pub async fn sqlite_store_with_clock(clock: Arc<FixedClock>) -> SqlStore {
    sqlite_store().await.with_clock(clock)
}

// ==========================
// DOCUMENT HELPERS
// ==========================

/// Build a document from a JSON object literal.
pub fn doc(key: &str, content: Value) -> Document {
    Document::from_value(key, content).expect("document content must be an object")
}

/// Unwrap a JSON object literal.
pub fn object(value: Value) -> Object {
    value
        .as_object()
        .cloned()
        .expect("value must be a JSON object")
}

/// `count` documents keyed `doc-000`, `doc-001`, ...
pub fn numbered_docs(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| doc(&format!("doc-{i:03}"), json!({ "n": i })))
        .collect()
}

pub fn keys_of(documents: &[Document]) -> Vec<String> {
    documents.iter().map(|d| d.key().to_string()).collect()
}

/// Sorted keys, for comparing unordered results.
pub fn sorted_keys(documents: &[Document]) -> Vec<String> {
    let mut keys = keys_of(documents);
    keys.sort();
    keys
}

/// The Jane document used by the end-to-end scenarios.
pub fn jane() -> Document {
    doc(
        "person:jane",
        json!({
            "name": "Jane",
            "address": { "city": "Springfield", "state": "IL" },
            "tags": ["customer"]
        }),
    )
    .with_schema_key("person")
}
