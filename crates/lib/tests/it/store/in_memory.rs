//! Snapshot files and other in-memory store specifics.

use serde_json::json;
use tabula::{DocumentFormat, DocumentStore, store::InMemory};

use crate::helpers::{jane, numbered_docs};

#[tokio::test]
async fn test_snapshot_keeps_documents_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let mut store = InMemory::with_format(DocumentFormat::Cbor);
    store.write(&jane()).await.unwrap();
    store.write_multiple(&numbered_docs(4), false).await.unwrap();
    let before = store.metadata("person:jane").await.unwrap();
    store.save_to_file(&path).await.unwrap();

    let mut loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.size().await.unwrap(), 5);
    assert_eq!(loaded.metadata("person:jane").await.unwrap(), before);

    let person = loaded.read("person:jane").await.unwrap();
    assert_eq!(person.content(), jane().content());
    assert_eq!(person.schema_key(), Some("person"));
}

#[tokio::test]
async fn test_missing_snapshot_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = InMemory::load_from_file(dir.path().join("absent.json"))
        .await
        .unwrap();
    assert_eq!(store.size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_corrupt_snapshot_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.json");
    std::fs::write(&path, r#"{ "_v": 9, "records": {} }"#).unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert_eq!(err.module(), "store");
}

#[tokio::test]
async fn test_keys_come_back_sorted() {
    let mut store = InMemory::new();
    for key in ["b", "c", "a"] {
        store
            .write(&crate::helpers::doc(key, json!({})))
            .await
            .unwrap();
    }
    assert_eq!(store.all_keys().await.unwrap(), ["a", "b", "c"]);
}

#[tokio::test]
async fn test_closed_store_cannot_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = InMemory::new();
    store.close().await.unwrap();
    assert!(store.save_to_file(dir.path().join("x.json")).await.is_err());
}
