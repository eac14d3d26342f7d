//! Tests for entry file parsing and rendering

use cms_content::{EntryParser, Format, FormatParser, render_entry};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("posts/a.md", "---\ntitle: A\n---\nBody", json!({"title": "A", "body": "Body"}))]
#[case("data/a.yml", "title: A\n", json!({"title": "A"}))]
#[case("data/a.yaml", "- x\n- y\n", json!(["x", "y"]))]
#[case("data/a.toml", "title = \"A\"\n", json!({"title": "A"}))]
#[case("data/a.json", r#"{"title": "A"}"#, json!({"title": "A"}))]
fn test_parse_by_extension(
    #[case] path: &str,
    #[case] text: &str,
    #[case] expected: serde_json::Value,
) {
    let parser = FormatParser::new();
    assert_eq!(parser.parse_entry(path, text).unwrap(), expected);
}

#[rstest]
#[case("posts/a.md")]
#[case("data/a.yml")]
#[case("data/a.json")]
fn test_malformed_content_is_error(#[case] path: &str) {
    let parser = FormatParser::new();
    assert!(parser.parse_entry(path, "---\n{ [unclosed").is_err());
}

#[rstest]
#[case(Format::Yaml)]
#[case(Format::Toml)]
#[case(Format::Json)]
#[case(Format::YamlFrontMatter)]
fn test_render_then_parse(#[case] format: Format) {
    let value = json!({"title": "Hello", "tags": ["a", "b"], "author": {"name": "Ann"}});
    let text = render_entry(&value, format).unwrap();
    let parsed = format.handler().parse(&text).unwrap();
    assert_eq!(parsed, value);
}

#[test]
fn test_config_names() {
    assert_eq!(Format::from_config_name("yml"), Some(Format::Yaml));
    assert_eq!(
        Format::from_config_name("toml-frontmatter"),
        Some(Format::TomlFrontMatter)
    );
    assert_eq!(Format::from_config_name("frontmatter").map(|f| f.extension()), Some("md"));
    assert_eq!(Format::from_config_name("xml"), None);
}
