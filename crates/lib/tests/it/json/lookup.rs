use serde_json::json;
use tabula::{
    Path,
    json::{JsonError, value_at_path},
};

use crate::helpers::doc;

#[test]
fn test_document_lookup_by_parsed_path() {
    let document = doc(
        "order:1",
        json!({
            "customer": { "name": "Jane" },
            "items": [
                { "sku": "A-1", "qty": 2 },
                { "sku": "B-7", "qty": 1 }
            ]
        }),
    );

    let sku = document
        .value_at_path(&"items.1.sku".parse().unwrap())
        .unwrap();
    assert_eq!(sku, Some(&json!("B-7")));

    let missing = document
        .value_at_path(&"items.5.sku".parse().unwrap())
        .unwrap();
    assert_eq!(missing, None);

    let name = document
        .value_at_path(&"customer.name".parse().unwrap())
        .unwrap();
    assert_eq!(name, Some(&json!("Jane")));
}

#[test]
fn test_array_needs_numeric_segment() {
    let document = doc("k", json!({ "items": [1, 2, 3] }));
    let err = document
        .value_at_path(&"items.last".parse().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        JsonError::NotAnArrayIndex { ref segment, .. } if segment == "last"
    ));

    let as_error: tabula::Error = err.into();
    assert_eq!(as_error.module(), "json");
    assert!(as_error.is_validation_error());
}

#[test]
fn test_lookup_from_array_root() {
    let root = json!([[1, 2], [3, 4]]);
    let path = Path::from_segments(["1", "0"]).unwrap();
    assert_eq!(value_at_path(&root, &path).unwrap(), Some(&json!(3)));
}
