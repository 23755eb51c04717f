//! Path behavior through the public API.

use std::collections::{BTreeSet, HashSet};

use tabula::{Path, path::PathError};

#[test]
fn test_parse_display_round_trip() {
    let texts = [
        "a",
        "address.city",
        "a.b.c",
        "orders.0.items.3.sku",
        r"config.file\.name.value",
    ];
    for text in texts {
        let path: Path = text.parse().unwrap();
        assert_eq!(path.to_string(), text);
        assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
    }
}

#[test]
fn test_segments_with_dots_survive_display() {
    let path = Path::from_segments(["host.name", "port"]).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path.get(0), Some("host.name"));
    assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
}

#[test]
fn test_blank_segments_are_rejected() {
    assert_eq!(
        Path::parse("a..b").unwrap_err(),
        PathError::InvalidSegment {
            segment: String::new()
        }
    );
    assert!(Path::from_segments(["ok", "\t"]).is_err());
    assert!(Path::parse("").is_err());
}

#[test]
fn test_with_ignores_blank_segment() {
    let path = Path::parse("a.b").unwrap();
    assert_eq!(path.with(""), path);
    assert_eq!(path.with("   "), path);
    assert_eq!(path.with("c"), Path::parse("a.b.c").unwrap());
}

#[test]
fn test_parent_and_ancestors() {
    let path = Path::parse("a.b.c.d.e").unwrap();
    assert_eq!(path.parent(), Path::parse("a.b.c.d").unwrap());
    assert_eq!(path.ancestor_of_size(2).unwrap(), Path::parse("a.b").unwrap());
    assert_eq!(path.ancestor_of_size(0).unwrap(), Path::empty());
    assert_eq!(path.ancestor_of_size(5).unwrap(), path);
    assert_eq!(
        path.ancestor_of_size(6).unwrap_err(),
        PathError::AncestorTooLarge { size: 6, len: 5 }
    );
    assert_eq!(Path::empty().parent(), Path::empty());
}

#[test]
fn test_equal_paths_from_any_construction() {
    let parsed = Path::parse("a.b.c.d").unwrap();
    let built = Path::from_segments(["a", "b", "c", "d"]).unwrap();
    let chained = Path::empty().with("a").with("b").with("c").with("d");
    let child = Path::child_of(&Path::parse("a").unwrap(), "b", ["c", "d"]).unwrap();

    let set: HashSet<Path> = [parsed.clone(), built, chained, child].into_iter().collect();
    assert_eq!(set.len(), 1);
    assert!(set.contains(&parsed));
}

#[test]
fn test_sorted_paths_group_by_depth() {
    let paths: BTreeSet<Path> = ["b.a", "c", "a.b.c", "a", "a.z"]
        .into_iter()
        .map(|text| Path::parse(text).unwrap())
        .collect();
    let ordered: Vec<String> = paths.iter().map(ToString::to_string).collect();
    assert_eq!(ordered, ["a", "c", "a.z", "b.a", "a.b.c"]);
}

#[test]
fn test_paths_are_shareable_across_threads() {
    let path = Path::parse("shared.across.threads.deeply").unwrap();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let path = path.clone();
            std::thread::spawn(move || path.with(&i.to_string()).len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 5);
    }
}
