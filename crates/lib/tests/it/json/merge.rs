use serde_json::json;
use tabula::json::{ValueType, merge_objects};

use crate::helpers::object;

#[test]
fn test_merge_property_identity() {
    let bases = [
        json!({}),
        json!({ "a": 1 }),
        json!({ "a": { "b": [1, { "c": null }] }, "d": "x" }),
    ];
    for base in bases {
        let base = object(base);
        assert_eq!(merge_objects(&base, &object(json!({}))).unwrap(), base);
    }
}

#[test]
fn test_tombstone_replaces_subtree() {
    let base = object(json!({ "profile": { "email": "jane@example.com", "phone": "555" } }));
    let incoming = object(json!({ "profile": { "phone": null } }));
    let merged = merge_objects(&base, &incoming).unwrap();
    assert_eq!(
        merged,
        object(json!({ "profile": { "email": "jane@example.com", "phone": null } }))
    );
}

#[test]
fn test_conflict_converts_to_crate_error() {
    let base = object(json!({ "settings": { "limit": "10" } }));
    let incoming = object(json!({ "settings": { "limit": 10 } }));
    let err = merge_objects(&base, &incoming).unwrap_err();
    assert_eq!(err.field(), Some("settings.limit"));
    assert!(err.to_string().contains("string"));
    assert!(err.to_string().contains("number"));

    let err: tabula::Error = err.into();
    assert!(err.is_conflict());
    assert!(!err.is_not_found());
}

#[test]
fn test_conflict_reports_types() {
    let base = object(json!({ "list": [1] }));
    let incoming = object(json!({ "list": { "0": 1 } }));
    match merge_objects(&base, &incoming).unwrap_err() {
        tabula::json::JsonError::TypeConflict {
            existing, incoming, ..
        } => {
            assert_eq!(existing, ValueType::Array);
            assert_eq!(incoming, ValueType::Object);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_merge_order_matters_for_arrays() {
    let a = object(json!({ "log": ["a"] }));
    let b = object(json!({ "log": ["b"] }));
    assert_eq!(merge_objects(&a, &b).unwrap()["log"], json!(["a", "b"]));
    assert_eq!(merge_objects(&b, &a).unwrap()["log"], json!(["b", "a"]));
}
