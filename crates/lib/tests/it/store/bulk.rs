//! Multi-key reads, removals and writes across batch boundaries.

use serde_json::json;
use tabula::{DocumentStore, store::batch::batch_sizes};

use crate::helpers::{doc, keys_of, numbered_docs, sorted_keys, test_store};

/// Counts around each batch shape boundary.
const COUNTS: [usize; 8] = [1, 4, 5, 11, 12, 51, 52, 110];

#[test]
fn test_ladder_splits() {
    assert_eq!(batch_sizes(110), [51, 51, 4, 4]);
    assert_eq!(batch_sizes(12), [11, 1]);
    assert_eq!(batch_sizes(52), [51, 1]);
    assert!(batch_sizes(0).is_empty());
}

#[tokio::test]
async fn test_read_multiple_across_batches() {
    for count in COUNTS {
        let mut store = test_store().await;
        let docs = numbered_docs(count);
        store.write_multiple(&docs, false).await.unwrap();

        let read = store.read_multiple(&keys_of(&docs)).await.unwrap();
        assert_eq!(read.len(), count, "count {count}");
        assert_eq!(sorted_keys(&read), sorted_keys(&docs));
        for document in &read {
            let original = docs.iter().find(|d| d.key() == document.key()).unwrap();
            assert_eq!(document.content(), original.content());
        }
    }
}

#[tokio::test]
async fn test_read_multiple_skips_missing() {
    let mut store = test_store().await;
    let docs = numbered_docs(6);
    store.write_multiple(&docs[..3], false).await.unwrap();

    let read = store.read_multiple(&keys_of(&docs)).await.unwrap();
    assert_eq!(sorted_keys(&read), sorted_keys(&docs[..3]));

    assert!(store.read_multiple(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_keys_read_once() {
    let mut store = test_store().await;
    let docs = numbered_docs(2);
    store.write_multiple(&docs, false).await.unwrap();

    let repeated: Vec<String> = ["doc-000"; 5].map(String::from).to_vec();
    let read = store.read_multiple(&repeated).await.unwrap();
    assert_eq!(keys_of(&read), ["doc-000"]);

    let mut mixed = keys_of(&docs);
    mixed.extend(keys_of(&docs));
    mixed.push("missing".to_string());
    let read = store.read_multiple(&mixed).await.unwrap();
    assert_eq!(sorted_keys(&read), sorted_keys(&docs));

    store.remove_multiple(&mixed).await.unwrap();
    assert_eq!(store.size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_remove_multiple_across_batches() {
    for count in COUNTS {
        let mut store = test_store().await;
        let docs = numbered_docs(count + 2);
        store.write_multiple(&docs, false).await.unwrap();

        store.remove_multiple(&keys_of(&docs[..count])).await.unwrap();
        assert_eq!(store.size().await.unwrap(), 2, "count {count}");
        let mut remaining = store.all_keys().await.unwrap();
        remaining.sort();
        assert_eq!(remaining, sorted_keys(&docs[count..]));
    }
}

#[tokio::test]
async fn test_write_multiple_capture() {
    let mut store = test_store().await;
    store
        .write(&doc("doc-001", json!({ "old": true })))
        .await
        .unwrap();

    let docs = numbered_docs(3);
    let report = store.write_multiple(&docs, true).await.unwrap();
    assert_eq!(report.len(), 3);
    assert_eq!(report.inserted_keys(), ["doc-000", "doc-002"]);
    assert_eq!(report.overwritten_keys(), ["doc-001"]);

    let quiet = store.write_multiple(&docs, false).await.unwrap();
    assert!(quiet.is_empty());
}

#[tokio::test]
async fn test_all_keys_and_documents() {
    let mut store = test_store().await;
    assert!(store.all_keys().await.unwrap().is_empty());

    let docs = numbered_docs(7);
    store.write_multiple(&docs, false).await.unwrap();

    let mut keys = store.all_keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, sorted_keys(&docs));
    assert_eq!(sorted_keys(&store.all_documents().await.unwrap()), keys);
    assert_eq!(store.size().await.unwrap(), 7);
}
