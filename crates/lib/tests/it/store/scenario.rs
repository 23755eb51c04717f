//! End-to-end flow: write a document, edit it through an overlay, merge the
//! edit back and observe the store.

use std::sync::Arc;

use serde_json::json;
use tabula::{DocumentStore, FixedClock, Path, WriteOutcome};

use crate::helpers::{doc, jane, object, sqlite_store_with_clock, test_store};

#[tokio::test]
async fn test_move_jane_to_memphis() {
    let mut store = test_store().await;
    let person = jane();
    store.write(&person).await.unwrap();

    let stored = store.read(person.key()).await.unwrap();
    let mut edit = stored.edit();
    edit.add("address", json!({ "city": "Memphis", "state": "TN" }));
    let moved = stored.with_content(edit.materialize().unwrap());

    assert_eq!(store.write(&moved).await.unwrap(), WriteOutcome::Overwritten);

    let reread = store.read(person.key()).await.unwrap();
    let city = reread
        .value_at_path(&Path::parse("address.city").unwrap())
        .unwrap();
    assert_eq!(city, Some(&json!("Memphis")));
    assert_eq!(reread.content()["name"], "Jane");
    assert_eq!(reread.content()["tags"], json!(["customer"]));
    assert_eq!(reread.schema_key(), Some("person"));
}

#[tokio::test]
async fn test_store_merge_appends_tags_and_tombstones() {
    let mut store = test_store().await;
    store.write(&jane()).await.unwrap();

    let incoming = object(json!({
        "tags": ["vip"],
        "address": { "state": null }
    }));
    let merged = store.merge("person:jane", &incoming).await.unwrap();

    assert_eq!(merged.content()["tags"], json!(["customer", "vip"]));
    assert_eq!(merged.content()["address"]["city"], "Springfield");
    assert!(merged.content()["address"]["state"].is_null());
    assert_eq!(
        store.read("person:jane").await.unwrap().content(),
        merged.content()
    );
}

#[tokio::test]
async fn test_merge_moves_p1_to_memphis() {
    let mut store = test_store().await;
    let p1 = doc(
        "p1",
        json!({ "name": "Jane", "address": { "city": "Springfield" } }),
    );
    store.write(&p1).await.unwrap();

    let incoming = object(json!({ "address": { "city": "Memphis", "zip": "12345" } }));
    let merged = store.merge("p1", &incoming).await.unwrap();

    let expected = object(json!({
        "name": "Jane",
        "address": { "city": "Memphis", "zip": "12345" }
    }));
    assert_eq!(merged.content(), &expected);
    assert_eq!(store.read("p1").await.unwrap().content(), &expected);
}

#[tokio::test]
async fn test_overwrite_keeps_creation_time() {
    let clock = Arc::new(FixedClock::new(1_000));
    let mut store = sqlite_store_with_clock(clock.clone()).await;
    let person = jane();

    store.write(&person).await.unwrap();
    clock.set(5_000);
    store.write(&person).await.unwrap();

    let meta = store.metadata(person.key()).await.unwrap();
    assert_eq!(meta.created_at, 1_000);
    assert_eq!(meta.modified_at, 5_000);
}

#[tokio::test]
async fn test_modified_time_follows_clock() {
    let clock = Arc::new(FixedClock::new(10_000));
    let mut store = sqlite_store_with_clock(clock.clone()).await;
    let person = jane();

    store.write(&person).await.unwrap();
    let created = store.metadata(person.key()).await.unwrap();
    assert_eq!(created.created_at, 10_000);

    // An hour later; the write reads the clock once
    clock.advance(3_600_000);
    store.write(&person).await.unwrap();
    let updated = store.metadata(person.key()).await.unwrap();
    assert_eq!(updated.created_at, 10_000);
    assert_eq!(updated.modified_at, 10_001 + 3_600_000);
}
