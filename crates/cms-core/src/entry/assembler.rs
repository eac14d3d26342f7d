//! Entry assembly
//!
//! Turns raw entry files into [`Entry`] records. Files are parsed and
//! prepared in parallel; localized files of the same entry are then merged
//! in a single ordered pass keyed by a temporary merge key:
//!
//! ```text
//! posts/en/hello.md ─┐                      ┌─ Entry { slug: "hello",
//!                    ├─ merge key ──────────┤    locales: { en, ja } }
//! posts/ja/hello.md ─┘  "posts/hello"       └─ id assigned after merge
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use cms_content::EntryParser;
use cms_content::path::flatten;
use cms_meta::config::{Field, has_root_list_field};
use cms_meta::i18n::{DEFAULT_LOCALE_KEY, I18nStructure};
use cms_meta::schema::{EntryTarget, SiteSchema};
use rayon::prelude::*;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Entry, LocalizedEntry, RawEntryFile};
use crate::error::Error;

/// Hugo's special index files: `_index.md` and `_index.{locale}.md`
static INDEX_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/_index(?:\.[\w-]+)?\.md$").unwrap());

/// Entries assembled from a batch of raw files, plus the parse errors of the
/// files that were skipped
#[derive(Debug, Default)]
pub struct AssembleResult {
    pub entries: Vec<Entry>,
    pub errors: Vec<Error>,
}

/// Outcome of preparing a single raw file
enum Prepared {
    Failed(Error),
    Skipped,
    /// A file holding a whole entry
    Whole(Entry),
    /// One locale of an entry spread over several files
    Localized {
        merge_key: String,
        locale: String,
        is_default_locale: bool,
        entry: Entry,
    },
}

/// Builds entries from raw files of a site
pub struct EntryAssembler<'a> {
    schema: &'a SiteSchema,
    parser: &'a dyn EntryParser,
}

impl<'a> EntryAssembler<'a> {
    pub fn new(schema: &'a SiteSchema, parser: &'a dyn EntryParser) -> Self {
        Self { schema, parser }
    }

    /// Assemble the entries of `files`.
    ///
    /// Malformed files are reported in [`AssembleResult::errors`] and never
    /// abort the batch. Files of unknown collections and files with an
    /// unexpected shape are dropped silently.
    pub fn assemble(&self, files: &[RawEntryFile]) -> AssembleResult {
        let prepared: Vec<Prepared> = files.par_iter().map(|file| self.prepare(file)).collect();

        let mut entries: Vec<Entry> = Vec::new();
        let mut errors = Vec::new();
        let mut merge_index: HashMap<String, usize> = HashMap::new();

        for outcome in prepared {
            match outcome {
                Prepared::Failed(error) => errors.push(error),
                Prepared::Skipped => {}
                Prepared::Whole(entry) => entries.push(entry),
                Prepared::Localized {
                    merge_key,
                    locale,
                    is_default_locale,
                    mut entry,
                } => {
                    let Some(&index) = merge_index.get(&merge_key) else {
                        merge_index.insert(merge_key, entries.len());
                        entries.push(entry);
                        continue;
                    };
                    let existing = &mut entries[index];
                    if let Some(localized) = entry.locales.remove(&locale) {
                        if is_default_locale {
                            existing.sha = localized.sha.clone();
                            existing.slug = localized.slug.clone();
                            existing.sub_path = entry.sub_path;
                        }
                        existing.locales.insert(locale, localized);
                    }
                }
            }
        }

        let entries: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| !entry.slug.is_empty() && !entry.locales.is_empty())
            .map(|mut entry| {
                entry.id = Uuid::new_v4().to_string();
                entry
            })
            .collect();

        info!(
            files = files.len(),
            entries = entries.len(),
            errors = errors.len(),
            "Assembled entries"
        );

        AssembleResult { entries, errors }
    }

    fn prepare(&self, file: &RawEntryFile) -> Prepared {
        let tree = match self.parser.parse_entry(&file.path, &file.text) {
            Ok(tree) => tree,
            Err(source) => {
                warn!(path = %file.path, error = %source, "Failed to parse entry file");
                return Prepared::Failed(Error::EntryParse {
                    path: file.path.clone(),
                    source,
                });
            }
        };

        let folder = &file.folder;
        let Some(target) = self
            .schema
            .target(&folder.collection_name, folder.file_name.as_deref())
        else {
            debug!(
                path = %file.path,
                collection = %folder.collection_name,
                "Skipping file of unknown collection"
            );
            return Prepared::Skipped;
        };
        let i18n = target.i18n();

        let Some(Value::Object(raw)) = wrap_root_list(tree, target.fields(), i18n.is_single_file())
        else {
            debug!(path = %file.path, "Skipping file with unexpected content shape");
            return Prepared::Skipped;
        };

        if INDEX_FILE_REGEX.is_match(&file.path) && !includes_index_file(&target) {
            debug!(path = %file.path, "Skipping index file");
            return Prepared::Skipped;
        }

        let Some((sub_path, locale)) = locate(&target, file) else {
            debug!(path = %file.path, "Skipping file outside of the collection layout");
            return Prepared::Skipped;
        };

        let template = target
            .file_config()
            .and_then(|config| config.sub_path_template.as_deref());
        let slug = match target.file_name() {
            Some(name) => name.to_string(),
            None => get_slug(&sub_path, template),
        };
        let localized = |content: &Value| LocalizedEntry {
            slug: slug.clone(),
            path: file.path.clone(),
            sha: file.sha.clone(),
            content: flatten(content),
        };
        let mut entry = Entry {
            sha: file.sha.clone(),
            sub_path,
            collection_name: target.collection_name().to_string(),
            file_name: target.file_name().map(str::to_string),
            ..Default::default()
        };

        if !i18n.enabled {
            entry.slug = slug.clone();
            entry.locales.insert(
                DEFAULT_LOCALE_KEY.to_string(),
                localized(&Value::Object(raw)),
            );
            return Prepared::Whole(entry);
        }

        match i18n.structure {
            I18nStructure::SingleFile | I18nStructure::None => {
                entry.slug = slug.clone();
                entry.locales = i18n
                    .all_locales
                    .iter()
                    .filter_map(|locale| Some((locale.clone(), localized(raw.get(locale)?))))
                    .collect();
                Prepared::Whole(entry)
            }
            I18nStructure::MultipleFiles
            | I18nStructure::MultipleFolders
            | I18nStructure::MultipleFoldersI18nRoot => {
                let Some(locale) = locale else {
                    return Prepared::Skipped;
                };
                let canonical_slug = raw.get(&i18n.canonical_slug_key).and_then(Value::as_str);
                let merge_key = format!(
                    "{}/{}",
                    target.collection_name(),
                    canonical_slug.unwrap_or(&slug)
                );
                let is_default_locale = i18n.is_default_locale(&locale);
                if is_default_locale {
                    entry.slug = slug.clone();
                }
                entry
                    .locales
                    .insert(locale.clone(), localized(&Value::Object(raw)));
                Prepared::Localized {
                    merge_key,
                    locale,
                    is_default_locale,
                    entry,
                }
            }
        }
    }
}

/// Wrap a top-level array under the name of the sole root list field. With
/// a single i18n file every locale must hold an array.
fn wrap_root_list(tree: Value, fields: &[Field], single_file: bool) -> Option<Value> {
    let [field] = fields else {
        return Some(tree);
    };
    if !has_root_list_field(fields) {
        return Some(tree);
    }
    let wrap = |items: Value| Value::Object(Map::from_iter([(field.name.clone(), items)]));

    if single_file {
        let Value::Object(locales) = tree else {
            return None;
        };
        if !locales.values().all(Value::is_array) {
            return None;
        }
        Some(Value::Object(
            locales
                .into_iter()
                .map(|(locale, items)| (locale, wrap(items)))
                .collect(),
        ))
    } else if tree.is_array() {
        Some(wrap(tree))
    } else {
        None
    }
}

/// Index files are kept for file collections, for collections including
/// their index file, and when the path template itself ends with `_index`
/// and the extension is `md`
fn includes_index_file(target: &EntryTarget<'_>) -> bool {
    let file_config = target.file_config();
    let template_is_index = file_config.is_some_and(|config| {
        config
            .sub_path_template
            .as_deref()
            .and_then(|template| template.rsplit('/').next())
            == Some("_index")
            && config.extension == "md"
    });

    target.file_name().is_some()
        || target.collection.collection.index_file_name() == Some("_index")
        || template_is_index
}

/// Sub-path and locale of a raw file. The locale is `None` for layouts
/// without per-locale files.
fn locate(target: &EntryTarget<'_>, file: &RawEntryFile) -> Option<(String, Option<String>)> {
    let i18n = target.i18n();

    let (sub_path, locale) = if target.file_name().is_some() {
        if i18n.is_per_locale_file() {
            let (locale, path) = file
                .folder
                .file_path_map
                .iter()
                .find(|(_, path)| **path == file.path)?;
            (path.clone(), Some(locale.clone()))
        } else {
            (file.path.clone(), None)
        }
    } else {
        let (sub_path, locale) = target.file_config()?.match_path(&file.path)?;
        let locale = locale.unwrap_or(&i18n.default_locale);
        (sub_path.to_string(), Some(locale.to_string()))
    };

    (!sub_path.is_empty()).then_some((sub_path, locale))
}

/// Extract the slug from a sub-path using a `path` template containing
/// `{{slug}}`; otherwise the sub-path is the slug
fn get_slug(sub_path: &str, template: Option<&str>) -> String {
    let Some(template) = template.filter(|t| t.contains("{{slug}}")) else {
        return sub_path.to_string();
    };
    let pattern = format!(
        "^{}$",
        regex::escape(template).replacen(r"\{\{slug\}\}", "(.+)", 1)
    );
    Regex::new(&pattern)
        .ok()
        .and_then(|regex| {
            regex
                .captures(sub_path)
                .and_then(|captures| captures.get(1))
                .map(|slug| slug.as_str().to_string())
        })
        .unwrap_or_else(|| sub_path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_file_pattern() {
        assert!(INDEX_FILE_REGEX.is_match("content/posts/_index.md"));
        assert!(INDEX_FILE_REGEX.is_match("content/posts/_index.pt-br.md"));
        assert!(!INDEX_FILE_REGEX.is_match("content/posts/_index.json"));
        assert!(!INDEX_FILE_REGEX.is_match("content/posts/my_index.md"));
    }

    #[test]
    fn test_get_slug_from_template() {
        assert_eq!(get_slug("hello/index", Some("{{slug}}/index")), "hello");
        assert_eq!(get_slug("2024/hello", Some("{{year}}/{{slug}}")), "2024/hello");
        assert_eq!(get_slug("other", Some("{{slug}}/index")), "other");
        assert_eq!(get_slug("plain", None), "plain");
    }

    #[test]
    fn test_wrap_root_list() {
        let fields = vec![{
            let mut field = Field::new("items", cms_meta::config::Widget::List);
            field.root = true;
            field
        }];
        assert_eq!(
            wrap_root_list(json!([1, 2]), &fields, false),
            Some(json!({"items": [1, 2]}))
        );
        assert_eq!(wrap_root_list(json!({"a": 1}), &fields, false), None);
        assert_eq!(
            wrap_root_list(json!({"en": [1], "ja": [2]}), &fields, true),
            Some(json!({"en": {"items": [1]}, "ja": {"items": [2]}}))
        );
        assert_eq!(wrap_root_list(json!({"en": [1], "ja": "x"}), &fields, true), None);

        let plain = vec![Field::new("title", cms_meta::config::Widget::String)];
        assert_eq!(wrap_root_list(json!([1]), &plain, false), Some(json!([1])));
    }
}
