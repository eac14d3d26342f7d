//! Save pipeline: turns a draft into a replacement entry and the file
//! changes that persist it

use std::collections::BTreeMap;

use cms_content::path::unflatten;
use cms_content::{Format, render_entry};
use cms_meta::config::has_root_list_field;
use cms_meta::i18n::{DEFAULT_LOCALE_KEY, I18nStructure};
use cms_meta::schema::{EntryTarget, SiteSchema};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::{Entry, LocalizedEntry};
use crate::draft::Draft;
use crate::error::{Error, Result};

/// Kind of a file change committed to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Move,
    Delete,
}

/// File contents of a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    Text(String),
    Binary(Vec<u8>),
}

/// One file change of a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub action: ChangeAction,
    pub path: String,
    /// Source path of a move
    pub previous_path: Option<String>,
    /// Unset for deletions and for moves without content changes
    pub data: Option<FileData>,
}

impl FileChange {
    /// Create, update or move a text file depending on where it was before
    pub fn write(path: String, previous_path: Option<&str>, text: String) -> Self {
        let (action, previous_path) = match previous_path {
            None => (ChangeAction::Create, None),
            Some(previous) if previous == path => (ChangeAction::Update, None),
            Some(previous) => (ChangeAction::Move, Some(previous.to_string())),
        };
        Self {
            action,
            path,
            previous_path,
            data: Some(FileData::Text(text)),
        }
    }

    pub fn delete(path: String) -> Self {
        Self {
            action: ChangeAction::Delete,
            path,
            previous_path: None,
            data: None,
        }
    }
}

/// A replacement entry and the changes persisting it
#[derive(Debug, Clone, PartialEq)]
pub struct SavingEntry {
    pub entry: Entry,
    pub changes: Vec<FileChange>,
}

/// Join non-empty path parts with `/`
fn join_path(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// Repository path of a `locale` file of a new entry, or of a locale added
/// to an existing one
fn new_file_path(
    schema: &SiteSchema,
    target: &EntryTarget<'_>,
    sub_path: &str,
    locale: &str,
) -> Option<String> {
    if let Some(file_name) = target.file_name() {
        let folder = schema.entry_folders().iter().find(|folder| {
            folder.collection_name == target.collection_name()
                && folder.file_name.as_deref() == Some(file_name)
        })?;
        return folder
            .file_path_map
            .get(locale)
            .or_else(|| folder.file_path_map.get(DEFAULT_LOCALE_KEY))
            .cloned();
    }

    let file_config = target.file_config()?;
    let i18n = target.i18n();
    let folder = file_config.base_path.as_str();
    let ext = &file_config.extension;
    let structure = if i18n.enabled {
        i18n.structure
    } else {
        I18nStructure::None
    };

    let path = match structure {
        I18nStructure::MultipleFolders => {
            format!("{}.{ext}", join_path(&[folder, locale, sub_path]))
        }
        I18nStructure::MultipleFoldersI18nRoot => {
            format!("{}.{ext}", join_path(&[locale, folder, sub_path]))
        }
        I18nStructure::MultipleFiles
            if i18n.omit_default_locale_from_filename && i18n.is_default_locale(locale) =>
        {
            format!("{}.{ext}", join_path(&[folder, sub_path]))
        }
        I18nStructure::MultipleFiles => {
            format!("{}.{locale}.{ext}", join_path(&[folder, sub_path]))
        }
        I18nStructure::SingleFile | I18nStructure::None => {
            format!("{}.{ext}", join_path(&[folder, sub_path]))
        }
    };
    Some(path)
}

/// Build the replacement entry and file changes for `draft`.
///
/// Each enabled locale is written to its own file in per-locale layouts; a
/// single i18n file holds a map of every enabled locale. Disabled locales
/// that had files are deleted. A new entry needs a slug.
pub fn saving_entry_data(schema: &SiteSchema, draft: &Draft) -> Result<SavingEntry> {
    let target = schema.require_target(&draft.collection_name, draft.file_name.as_deref())?;
    let i18n = &draft.i18n;
    let original = draft.original_entry.as_ref();
    let missing_slug = || Error::MissingSlug {
        collection: draft.collection_name.clone(),
    };

    let slug = match target.file_name() {
        Some(name) => name.to_string(),
        None => draft.slug().ok_or_else(missing_slug)?.to_string(),
    };
    let sub_path = match original {
        Some(entry) => entry.sub_path.clone(),
        None => match target.file_config().and_then(|c| c.sub_path_template.as_deref()) {
            Some(template) => template.replace("{{slug}}", &slug),
            None => slug.clone(),
        },
    };

    let format_for = |path: &str| {
        target
            .file_config()
            .and_then(|config| config.format)
            .or_else(|| Format::from_path(path))
            .ok_or_else(|| cms_content::Error::UnsupportedFormat(path.to_string()))
    };
    let root_list_name = has_root_list_field(&draft.fields)
        .then(|| draft.fields.first().map(|field| field.name.as_str()))
        .flatten();
    let tree_of = |locale: &str| {
        let tree = draft
            .current_values
            .get(locale)
            .map(unflatten)
            .unwrap_or_else(|| Value::Object(Map::new()));
        match root_list_name {
            Some(name) => tree
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())),
            None => tree,
        }
    };
    let path_for = |locale: &str| -> Result<String> {
        let existing = original
            .and_then(|entry| entry.locale(locale))
            .map(|localized| localized.path.clone());
        match existing {
            Some(path) => Ok(path),
            None => new_file_path(schema, &target, &sub_path, locale).ok_or_else(missing_slug),
        }
    };

    let enabled_locales = draft.enabled_locales();
    let mut locales = BTreeMap::new();
    let mut changes = Vec::new();

    let localized = |locale: &str, path: &str| LocalizedEntry {
        slug: draft
            .current_slugs
            .get(locale)
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| slug.clone()),
        path: path.to_string(),
        sha: original
            .and_then(|entry| entry.locale(locale))
            .map(|l| l.sha.clone())
            .unwrap_or_default(),
        content: draft.current_values.get(locale).cloned().unwrap_or_default(),
    };

    if i18n.is_single_file() {
        let default_locale = i18n.default_locale.as_str();
        let previous_path = original.and_then(|entry| {
            entry
                .locale(default_locale)
                .or_else(|| entry.locales.values().next())
                .map(|l| l.path.clone())
        });
        let path = match &previous_path {
            Some(path) => path.clone(),
            None => new_file_path(schema, &target, &sub_path, default_locale)
                .ok_or_else(missing_slug)?,
        };

        let combined: Map<String, Value> = enabled_locales
            .iter()
            .map(|&locale| (locale.to_string(), tree_of(locale)))
            .collect();
        let text = render_entry(&Value::Object(combined), format_for(&path)?)?;
        changes.push(FileChange::write(path.clone(), previous_path.as_deref(), text));

        for &locale in &enabled_locales {
            locales.insert(locale.to_string(), localized(locale, &path));
        }
    } else {
        for &locale in &enabled_locales {
            let path = path_for(locale)?;
            let previous_path = original
                .and_then(|entry| entry.locale(locale))
                .map(|l| l.path.as_str());
            let text = render_entry(&tree_of(locale), format_for(&path)?)?;
            changes.push(FileChange::write(path.clone(), previous_path, text));
            locales.insert(locale.to_string(), localized(locale, &path));
        }

        if let Some(entry) = original {
            for (locale, localized) in &entry.locales {
                if !draft.is_locale_enabled(locale) {
                    changes.push(FileChange::delete(localized.path.clone()));
                }
            }
        }
    }

    let sha = locales
        .get(i18n.default_locale.as_str())
        .map(|l: &LocalizedEntry| l.sha.clone())
        .or_else(|| original.map(|entry| entry.sha.clone()))
        .unwrap_or_default();
    let entry = Entry {
        id: original
            .map(|entry| entry.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        slug,
        sub_path,
        sha,
        locales,
        collection_name: draft.collection_name.clone(),
        file_name: draft.file_name.clone(),
    };

    debug!(
        collection = %entry.collection_name,
        slug = %entry.slug,
        changes = changes.len(),
        "Prepared entry for saving"
    );

    Ok(SavingEntry { entry, changes })
}
