#![allow(dead_code)]

use cms_core::RawEntryFile;
use cms_meta::{EntryFolderInfo, SiteConfig, SiteSchema};

pub const SITE_YAML: &str = r#"
media_folder: static/images
public_folder: /images
i18n:
  structure: multiple_files
  locales: [en, ja]
  default_locale: en
collections:
  - name: posts
    folder: posts
    i18n: true
    fields:
      - { name: title, i18n: true }
      - { name: summary, widget: text, i18n: translate }
      - { name: tags, widget: list, i18n: duplicate }
      - { name: rating, widget: number, i18n: false, default: 3 }
      - name: author
        widget: object
        i18n: false
        fields:
          - { name: name }
          - { name: email }
      - name: links
        widget: list
        i18n: true
        fields:
          - { name: label }
          - { name: url }
      - { name: body, widget: markdown, i18n: true }
  - name: blog
    folder: blog
    i18n:
      structure: multiple_folders
    media_folder: /static/blog
    public_folder: /blog-media
    fields:
      - { name: title, i18n: true }
      - { name: cover, widget: image, i18n: duplicate }
  - name: pages
    folder: pages
    fields:
      - { name: title }
      - { name: image, widget: image }
  - name: docs
    folder: docs
    index_file: true
    fields:
      - { name: title }
  - name: notes
    folder: notes
    path: "{{slug}}/index"
    fields:
      - { name: title }
  - name: data
    i18n: true
    files:
      - name: nav
        file: data/nav.yml
        fields:
          - name: items
            widget: list
            root: true
      - name: about
        file: data/about.{{locale}}.json
        fields:
          - { name: heading, i18n: true }
"#;

pub fn schema() -> SiteSchema {
    let config = SiteConfig::from_yaml_str(SITE_YAML).unwrap();
    SiteSchema::new(config).unwrap()
}

/// A raw file placed in whatever entry folder contains `path`
pub fn raw(schema: &SiteSchema, path: &str, text: &str) -> RawEntryFile {
    let folder = schema
        .entry_folder_for(path)
        .cloned()
        .unwrap_or_else(|| panic!("no entry folder for {path}"));
    RawEntryFile {
        path: path.to_string(),
        sha: format!("sha-{path}"),
        text: text.to_string(),
        folder,
    }
}

/// A raw file claiming to belong to a collection the site does not have
pub fn foreign(path: &str, text: &str) -> RawEntryFile {
    RawEntryFile {
        path: path.to_string(),
        sha: format!("sha-{path}"),
        text: text.to_string(),
        folder: EntryFolderInfo {
            collection_name: "ghost".to_string(),
            folder_path: Some("ghost".to_string()),
            ..Default::default()
        },
    }
}

pub fn front_matter(yaml: &str) -> String {
    format!("---\n{yaml}\n---\n")
}
