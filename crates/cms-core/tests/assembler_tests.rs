//! Integration tests for entry assembly

mod common;

use cms_content::FormatParser;
use cms_content::path::KeyPath;
use cms_core::{EntryAssembler, Error};
use common::{foreign, front_matter, raw, schema};
use pretty_assertions::assert_eq;
use serde_json::json;

fn key(path: &str) -> KeyPath {
    KeyPath::parse(path)
}

#[test]
fn test_localized_files_merge_into_one_entry() {
    let schema = schema();
    let files = vec![
        raw(&schema, "posts/a.en.md", &front_matter("title: Hello")),
        raw(&schema, "posts/a.ja.md", &front_matter("title: こんにちは")),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    assert!(result.errors.is_empty());
    assert_eq!(result.entries.len(), 1);
    let entry = &result.entries[0];
    assert_eq!(entry.slug, "a");
    assert_eq!(entry.sub_path, "a");
    assert_eq!(entry.sha, "sha-posts/a.en.md");
    assert_eq!(entry.collection_name, "posts");
    assert_eq!(entry.locales.keys().collect::<Vec<_>>(), vec!["en", "ja"]);
    assert_eq!(entry.locales["ja"].path, "posts/a.ja.md");
    assert_eq!(entry.locales["ja"].content[&key("title")], json!("こんにちは"));
    assert!(!entry.id.is_empty());
}

#[test]
fn test_default_locale_wins_regardless_of_order() {
    let schema = schema();
    let files = vec![
        raw(&schema, "posts/a.ja.md", &front_matter("title: こんにちは")),
        raw(&schema, "posts/a.en.md", &front_matter("title: Hello")),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].slug, "a");
    assert_eq!(result.entries[0].sha, "sha-posts/a.en.md");
}

#[test]
fn test_entry_without_default_locale_is_dropped() {
    let schema = schema();
    let files = vec![raw(&schema, "posts/only.ja.md", &front_matter("title: x"))];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);
    assert!(result.entries.is_empty());
    assert!(result.errors.is_empty());
}

#[test]
fn test_canonical_slug_links_differently_named_files() {
    let schema = schema();
    let files = vec![
        raw(
            &schema,
            "posts/hello.en.md",
            &front_matter("title: Hello\ntranslationKey: greeting"),
        ),
        raw(
            &schema,
            "posts/konnichiwa.ja.md",
            &front_matter("title: こんにちは\ntranslationKey: greeting"),
        ),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    assert_eq!(result.entries.len(), 1);
    let entry = &result.entries[0];
    assert_eq!(entry.slug, "hello");
    assert_eq!(entry.locales["ja"].slug, "konnichiwa");
}

#[test]
fn test_multiple_folders_layout() {
    let schema = schema();
    let files = vec![
        raw(&schema, "blog/en/first.md", &front_matter("title: First")),
        raw(&schema, "blog/ja/first.md", &front_matter("title: 最初")),
        raw(&schema, "blog/en/second.md", &front_matter("title: Second")),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    let slugs: Vec<_> = result.entries.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["first", "second"]);
    assert_eq!(result.entries[0].locales.len(), 2);
    assert_eq!(result.entries[1].locales.len(), 1);
}

#[test]
fn test_index_files_are_dropped_unless_included() {
    let schema = schema();
    let files = vec![
        raw(&schema, "posts/_index.en.md", &front_matter("title: Posts")),
        raw(&schema, "pages/_index.md", &front_matter("title: Pages")),
        raw(&schema, "pages/about.md", &front_matter("title: About")),
        raw(&schema, "docs/_index.md", &front_matter("title: Docs")),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    let found: Vec<_> = result
        .entries
        .iter()
        .map(|e| (e.collection_name.as_str(), e.slug.as_str()))
        .collect();
    assert_eq!(found, vec![("pages", "about"), ("docs", "_index")]);
}

#[test]
fn test_disabled_i18n_uses_default_locale_key() {
    let schema = schema();
    let files = vec![raw(&schema, "pages/about.md", &front_matter("title: About"))];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    let entry = &result.entries[0];
    assert_eq!(entry.locales.keys().collect::<Vec<_>>(), vec!["_default"]);
    assert_eq!(entry.locales["_default"].slug, "about");
}

#[test]
fn test_slug_from_path_template() {
    let schema = schema();
    let files = vec![raw(&schema, "notes/hello/index.md", &front_matter("title: Hi"))];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    assert_eq!(result.entries[0].slug, "hello");
    assert_eq!(result.entries[0].sub_path, "hello/index");
}

#[test]
fn test_parse_errors_are_collected_per_file() {
    let schema = schema();
    let files = vec![
        raw(&schema, "pages/broken.md", "---\ntitle: never closed\n"),
        raw(&schema, "pages/fine.md", &front_matter("title: Fine")),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].slug, "fine");
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        Error::EntryParse { path, .. } => assert_eq!(path, "pages/broken.md"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_files_of_unknown_collections_are_ignored() {
    let schema = schema();
    let files = vec![foreign("ghost/a.md", &front_matter("title: Boo"))];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);
    assert!(result.entries.is_empty());
    assert!(result.errors.is_empty());
}

#[test]
fn test_single_file_root_list() {
    let schema = schema();
    let files = vec![raw(
        &schema,
        "data/nav.yml",
        "en:\n  - Home\n  - Blog\nja:\n  - ホーム\n",
    )];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    assert_eq!(result.entries.len(), 1);
    let entry = &result.entries[0];
    assert_eq!(entry.slug, "nav");
    assert_eq!(entry.file_name.as_deref(), Some("nav"));
    assert_eq!(entry.locales["en"].content[&key("items.1")], json!("Blog"));
    assert_eq!(entry.locales["ja"].content[&key("items.0")], json!("ホーム"));
}

#[test]
fn test_root_list_shape_mismatch_is_dropped() {
    let schema = schema();
    let files = vec![raw(&schema, "data/nav.yml", "en: Home\n")];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);
    assert!(result.entries.is_empty());
    assert!(result.errors.is_empty());
}

#[test]
fn test_file_item_per_locale_files() {
    let schema = schema();
    let files = vec![
        raw(&schema, "data/about.en.json", r#"{"heading": "About"}"#),
        raw(&schema, "data/about.ja.json", r#"{"heading": "概要"}"#),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);

    assert_eq!(result.entries.len(), 1);
    let entry = &result.entries[0];
    assert_eq!(entry.slug, "about");
    assert_eq!(entry.locales["ja"].content[&key("heading")], json!("概要"));
}

#[test]
fn test_ids_are_unique() {
    let schema = schema();
    let files = vec![
        raw(&schema, "pages/a.md", &front_matter("title: A")),
        raw(&schema, "pages/b.md", &front_matter("title: B")),
    ];
    let result = EntryAssembler::new(&schema, &FormatParser::new()).assemble(&files);
    assert_ne!(result.entries[0].id, result.entries[1].id);
}
