//! Property and scenario tests for the key-path codec

use cms_content::path::{
    FlattenedContent, KeyPath, PathSegment, flatten, merge_sublist, select_sublist, unflatten,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ]
}

fn arb_tree() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_root() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,4}", arb_tree(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

fn arb_segments() -> impl Strategy<Value = Vec<PathSegment>> {
    let segment = prop_oneof![
        r#"[a-z0-9.\[\]"\\]{0,5}"#.prop_map(PathSegment::Key),
        (0usize..50).prop_map(PathSegment::Index),
    ];
    prop::collection::vec(segment, 0..5)
}

fn belongs_to_list(path: &KeyPath, prefix: &KeyPath) -> bool {
    match path.strip_prefix(prefix) {
        Some([]) => true,
        Some([PathSegment::Index(_), ..]) => true,
        _ => false,
    }
}

proptest! {
    #[test]
    fn test_flatten_unflatten_round_trip(tree in arb_root()) {
        prop_assert_eq!(unflatten(&flatten(&tree)), tree);
    }

    #[test]
    fn test_flatten_leaves_are_never_filled_containers(tree in arb_root()) {
        for value in flatten(&tree).values() {
            let filled = match value {
                Value::Object(map) => !map.is_empty(),
                Value::Array(items) => !items.is_empty(),
                _ => false,
            };
            prop_assert!(!filled);
        }
    }

    #[test]
    fn test_select_sublist_is_partition(tree in arb_root(), prefix in "[a-z]{1,4}") {
        let content = flatten(&tree);
        let prefix = KeyPath::parse(&prefix);
        let (_, remainder) = select_sublist(&content, &prefix);

        for (path, value) in &remainder {
            prop_assert_eq!(content.get(path), Some(value));
            prop_assert!(!belongs_to_list(path, &prefix));
        }
        for path in content.keys() {
            prop_assert_eq!(remainder.contains_key(path), !belongs_to_list(path, &prefix));
        }
    }

    #[test]
    fn test_select_then_merge_restores_list(
        items in prop::collection::vec(arb_tree(), 0..5),
        other in arb_tree(),
    ) {
        let tree = json!({"list": items, "other": other});
        let content = flatten(&tree);
        let prefix = KeyPath::parse("list");
        let (selected, remainder) = select_sublist(&content, &prefix);
        prop_assert_eq!(merge_sublist(&prefix, &selected, remainder), content);
    }

    #[test]
    fn test_display_parse_keeps_segment_kinds(segments in arb_segments()) {
        let path = KeyPath::from_segments(segments);
        prop_assert_eq!(KeyPath::parse(&path.to_string()), path);
    }
}

#[test]
fn test_splice_insert_shifts_following_items() {
    let content = flatten(&json!({"items": [{"name": "a"}, {"name": "c"}], "title": "T"}));
    let prefix = KeyPath::parse("items");
    let (mut items, remainder) = select_sublist(&content, &prefix);
    items.insert(1, Some(json!({"name": "b"})));

    let merged = merge_sublist(&prefix, &items, remainder);
    assert_eq!(
        unflatten(&merged),
        json!({"items": [{"name": "a"}, {"name": "b"}, {"name": "c"}], "title": "T"})
    );
}

#[test]
fn test_reorder_nested_list_items() {
    let content = flatten(&json!({"items": [{"tags": ["x"]}, {"tags": ["y", "z"]}]}));
    let prefix = KeyPath::parse("items");
    let (mut items, remainder) = select_sublist(&content, &prefix);
    items.swap(0, 1);

    let merged = merge_sublist(&prefix, &items, remainder);
    assert_eq!(merged.get(&KeyPath::parse("items.0.tags.1")), Some(&json!("z")));
    assert_eq!(merged.get(&KeyPath::parse("items.1.tags.0")), Some(&json!("x")));
    assert!(!merged.contains_key(&KeyPath::parse("items.1.tags.1")));
}

#[test]
fn test_holes_survive_splice_of_other_items() {
    let mut content = FlattenedContent::new();
    content.insert(KeyPath::parse("tags.0"), json!("a"));
    content.insert(KeyPath::parse("tags.2"), json!("c"));
    content.insert(KeyPath::parse("tags.3"), json!("d"));
    let prefix = KeyPath::parse("tags");

    let (mut items, remainder) = select_sublist(&content, &prefix);
    items.remove(3);
    let merged = merge_sublist(&prefix, &items, remainder);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged.get(&KeyPath::parse("tags.2")), Some(&json!("c")));
    assert!(!merged.contains_key(&KeyPath::parse("tags.1")));
}

#[test]
fn test_key_path_serde_as_string() {
    let mut content = FlattenedContent::new();
    content.insert(KeyPath::parse("items.0.name"), json!("x"));
    let text = serde_json::to_string(&content).unwrap();
    assert_eq!(text, r#"{"items.0.name":"x"}"#);
    let back: FlattenedContent = serde_json::from_str(&text).unwrap();
    assert_eq!(back, content);
}

#[test]
fn test_numeric_object_key_survives_serde() {
    let content = flatten(&json!({"archive": {"2024": "x"}, "tags": ["a"]}));
    let year = KeyPath::root().child("archive").child("2024");
    assert!(content.contains_key(&year));

    let text = serde_json::to_string(&content).unwrap();
    let back: FlattenedContent = serde_json::from_str(&text).unwrap();
    assert_eq!(back, content);
    assert_eq!(
        back.keys().last().unwrap().segments(),
        &[PathSegment::Key("tags".to_string()), PathSegment::Index(0)]
    );
    assert_eq!(unflatten(&back), json!({"archive": {"2024": "x"}, "tags": ["a"]}));
}

#[test]
fn test_quoted_key_syntax() {
    let path = KeyPath::parse(r#"archive["2024"].posts[1]["a.b"]"#);
    assert_eq!(
        path.segments(),
        &[
            PathSegment::Key("archive".to_string()),
            PathSegment::Key("2024".to_string()),
            PathSegment::Key("posts".to_string()),
            PathSegment::Index(1),
            PathSegment::Key("a.b".to_string()),
        ]
    );
    assert_eq!(path.to_string(), r#"archive["2024"].posts.1["a.b"]"#);
}

#[test]
fn test_index_below_scalar_replaces_it() {
    let mut content = FlattenedContent::new();
    content.insert(KeyPath::parse("tags"), json!("x"));
    content.insert(KeyPath::parse("tags.0"), json!("y"));
    content.insert(KeyPath::parse("title"), json!("T"));
    content.insert(KeyPath::parse("title.text"), json!("U"));

    assert_eq!(
        unflatten(&content),
        json!({"tags": ["y"], "title": {"text": "U"}})
    );
}
