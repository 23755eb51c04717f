use chrono::{TimeZone, Utc};
use serde_json::json;
use tabula::json::{EditableArray, merge_objects};

use crate::helpers::{doc, jane, object};

#[test]
fn test_overlay_materialize_equals_direct_merge() {
    let person = jane();
    let mut edit = person.edit();
    edit.add("address", json!({ "city": "Memphis" }))
        .add("tags", json!(["vip"]))
        .add("age", 41);

    let changes = edit.changes().clone();
    let materialized = edit.materialize().unwrap();
    assert_eq!(
        materialized,
        merge_objects(person.content(), &changes).unwrap()
    );
    assert_eq!(materialized["address"]["city"], "Memphis");
    assert_eq!(materialized["address"]["state"], "IL");
    assert_eq!(materialized["tags"], json!(["customer", "vip"]));

    // The document itself is unchanged
    assert_eq!(person.content()["address"]["city"], "Springfield");
}

#[test]
fn test_overlay_dates_and_binary_survive_materialize() {
    let document = doc("k", json!({}));
    let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let mut edit = document.edit();
    edit.add_date("signed_at", when).add_binary("signature", &[9, 8, 7]);

    let content = edit.materialize().unwrap();
    let stored = document.with_content(content);
    let reread = stored.edit();
    assert_eq!(reread.get_date("signed_at").unwrap(), Some(when));
    assert_eq!(reread.get_binary("signature").unwrap(), Some(vec![9, 8, 7]));
}

#[test]
fn test_overlay_merge_then_other() {
    let base = object(json!({ "n": 1, "tags": ["a"] }));
    let document = doc("k", json!(base));
    let mut edit = document.edit();
    edit.add("n", 2);

    let other = object(json!({ "tags": ["b"], "extra": true }));
    let merged = edit.merge(&other).unwrap();
    assert_eq!(
        merged,
        object(json!({ "n": 2, "tags": ["a", "b"], "extra": true }))
    );
}

#[test]
fn test_array_overlay_over_document_field() {
    let person = jane();
    let tags = person.content()["tags"].as_array().unwrap();
    let mut edit = EditableArray::new(tags);
    edit.add("vip").add("newsletter");

    assert_eq!(edit.len(), 3);
    assert_eq!(edit.get_str(2), Some("newsletter"));
    assert_eq!(
        edit.materialize(),
        vec![json!("customer"), json!("vip"), json!("newsletter")]
    );
}
