//! Integration tests for schema resolution

use cms_content::path::{FlattenedContent, KeyPath};
use cms_meta::i18n::I18nStructure;
use cms_meta::{I18nMode, SiteConfig, SiteSchema, get_field};
use pretty_assertions::assert_eq;
use serde_json::json;

fn schema() -> SiteSchema {
    let config = SiteConfig::from_yaml_str(
        r#"
media_folder: static/images
i18n:
  structure: multiple_folders
  locales: [en, fr]
collections:
  - name: posts
    folder: content/posts
    i18n: true
    media_folder: /static/posts
    index_file: true
    fields:
      - { name: title, i18n: true }
  - name: docs
    folder: content/docs
    index_file:
      fields:
        - { name: heading }
    fields:
      - { name: title }
  - divider: true
    name: ""
  - name: settings
    i18n: true
    files:
      - name: site
        file: data/site.{{locale}}.json
        fields:
          - name: menu
            widget: list
            i18n: true
            fields:
              - { name: label }
"#,
    )
    .unwrap();
    SiteSchema::new(config).unwrap()
}

#[test]
fn test_resolves_collections_without_dividers() {
    let schema = schema();
    let names: Vec<_> = schema.collections().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["posts", "docs", "settings"]);
}

#[test]
fn test_entry_target() {
    let schema = schema();
    let target = schema.target("posts", None).unwrap();
    assert_eq!(target.i18n().structure, I18nStructure::MultipleFolders);
    assert_eq!(target.i18n().default_locale, "en");
    let file = target.file_config().unwrap();
    assert_eq!(
        file.match_path("content/posts/fr/hello.md"),
        Some(("hello", Some("fr")))
    );
}

#[test]
fn test_file_target() {
    let schema = schema();
    let target = schema.target("settings", Some("site")).unwrap();
    assert_eq!(target.file_name(), Some("site"));
    assert_eq!(target.i18n().structure, I18nStructure::MultipleFiles);
    assert_eq!(target.file_config().unwrap().extension, "json");

    assert!(schema.target("settings", Some("missing")).is_none());
    assert!(schema.target("nope", None).is_none());
    assert!(schema.require_target("settings", Some("missing")).is_err());
}

#[test]
fn test_index_file_fields() {
    let schema = schema();
    let docs = schema.target("docs", None).unwrap();
    assert_eq!(docs.fields_for(true)[0].name, "heading");
    assert_eq!(docs.fields_for(false)[0].name, "title");

    let posts = schema.target("posts", None).unwrap();
    assert_eq!(posts.fields_for(true)[0].name, "title");
    assert!(posts.collection.is_index_slug("_index"));
}

#[test]
fn test_folders() {
    let schema = schema();
    let folder = schema.entry_folder_for("data/site.fr.json").unwrap();
    assert_eq!(folder.file_name.as_deref(), Some("site"));
    assert_eq!(
        schema.entry_folder_for("content/posts/en/a.md").unwrap().collection_name,
        "posts"
    );
    assert!(schema.entry_folder_for("README.md").is_none());

    let posts_assets = schema.asset_folder_for("posts").unwrap();
    assert_eq!(posts_assets.internal_path.as_deref(), Some("static/posts"));
    let docs_assets = schema.asset_folder_for("docs").unwrap();
    assert_eq!(docs_assets.internal_path.as_deref(), Some("static/images"));
}

#[test]
fn test_field_lookup_through_schema() {
    let schema = schema();
    let target = schema.target("settings", Some("site")).unwrap();
    let mut values = FlattenedContent::new();
    values.insert(KeyPath::parse("menu.0.label"), json!("Home"));

    let field = get_field(target.fields(), &KeyPath::parse("menu.0.label"), &values).unwrap();
    assert_eq!(field.field.name, "label");
    assert_eq!(field.i18n, I18nMode::True);
}
