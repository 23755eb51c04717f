//! Single-document operations, run against whichever backend
//! `TEST_BACKEND` selects.

use serde_json::json;
use tabula::{DocumentStore, WriteOutcome, store::StoreError};

use crate::helpers::{doc, jane, test_store};

#[tokio::test]
async fn test_write_reports_insert_then_overwrite() {
    let mut store = test_store().await;
    let person = jane();

    assert_eq!(store.write(&person).await.unwrap(), WriteOutcome::Inserted);
    assert_eq!(
        store.write(&person).await.unwrap(),
        WriteOutcome::Overwritten
    );
    assert_eq!(store.size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_read_returns_written_document() {
    let mut store = test_store().await;
    let person = jane();
    store.write(&person).await.unwrap();

    let read = store.read(person.key()).await.unwrap();
    assert_eq!(read.key(), "person:jane");
    assert_eq!(read.schema_key(), Some("person"));
    assert_eq!(read.content(), person.content());
}

#[tokio::test]
async fn test_missing_document() {
    let mut store = test_store().await;

    assert!(!store.has("nobody").await.unwrap());
    let err = store.read("nobody").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "store");

    // Removing a missing key is not an error
    store.remove("nobody").await.unwrap();
}

#[tokio::test]
async fn test_write_if_absent() {
    let mut store = test_store().await;
    let first = doc("config", json!({ "version": 1 }));
    let second = doc("config", json!({ "version": 2 }));

    assert!(store.write_if_absent(&first).await.unwrap());
    assert!(!store.write_if_absent(&second).await.unwrap());
    assert_eq!(
        store.read("config").await.unwrap().content()["version"],
        json!(1)
    );
}

#[tokio::test]
async fn test_remove() {
    let mut store = test_store().await;
    store.write(&jane()).await.unwrap();
    store.write(&doc("other", json!({}))).await.unwrap();

    store.remove("person:jane").await.unwrap();
    assert!(!store.has("person:jane").await.unwrap());
    assert!(store.has("other").await.unwrap());
    assert_eq!(store.size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_merge_creates_then_merges() {
    let mut store = test_store().await;
    let incoming = crate::helpers::object(json!({ "visits": [1] }));

    let created = store.merge("counter", &incoming).await.unwrap();
    assert_eq!(created.content()["visits"], json!([1]));

    let merged = store.merge("counter", &incoming).await.unwrap();
    assert_eq!(merged.content()["visits"], json!([1, 1]));
    assert_eq!(
        store.read("counter").await.unwrap().content(),
        merged.content()
    );
}

#[tokio::test]
async fn test_merge_conflict_leaves_stored_document() {
    let mut store = test_store().await;
    store.write(&jane()).await.unwrap();

    let incoming = crate::helpers::object(json!({ "address": "Memphis" }));
    let err = store.merge("person:jane", &incoming).await.unwrap_err();
    assert!(err.is_conflict());

    let stored = store.read("person:jane").await.unwrap();
    assert_eq!(stored.content()["address"]["city"], "Springfield");
}

#[tokio::test]
async fn test_invalid_keys_are_rejected() {
    let mut store = test_store().await;
    let err = store.write(&doc("", json!({}))).await.unwrap_err();
    assert!(err.is_validation_error());

    let long = "k".repeat(tabula::constants::MAX_KEY_LENGTH + 1);
    assert!(store.write(&doc(&long, json!({}))).await.is_err());
    assert_eq!(store.size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_metadata_tracks_timestamps() {
    let mut store = test_store().await;
    let person = jane();
    store.write(&person).await.unwrap();
    let first = store.metadata(person.key()).await.unwrap();
    assert_eq!(first.created_at, first.modified_at);
    assert_eq!(first.schema_key.as_deref(), Some("person"));

    store.write(&person).await.unwrap();
    let second = store.metadata(person.key()).await.unwrap();
    assert_eq!(second.created_at, first.created_at);
    assert!(second.modified_at > first.modified_at);

    assert!(store.metadata("nobody").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_closed_store_rejects_operations() {
    let mut store = test_store().await;
    store.write(&jane()).await.unwrap();
    store.close().await.unwrap();

    let err = store.read("person:jane").await.unwrap_err();
    assert!(matches!(err, tabula::Error::Store(StoreError::Closed)));
    assert!(store.size().await.is_err());
    assert!(store.write(&jane()).await.is_err());
}
