//! Drafts
//!
//! A [`Draft`] is the editable copy of one entry across its locales. Values
//! are kept flattened per locale so per-field i18n rules, reverts and list
//! splices can all be expressed as key path filters.
//!
//! The reconciliation operations live in submodules:
//! - [`reconcile`]: locale toggling, default-locale seeding, reverts and
//!   list splicing
//! - [`copy`]: copying or machine-translating values between locales

mod copy;
mod reconcile;

use std::collections::BTreeMap;

use cms_content::path::{FlattenedContent, KeyPath};
use cms_meta::config::Field;
use cms_meta::field::get_field;
use cms_meta::i18n::I18nConfig;
use cms_meta::schema::{EntryTarget, SiteSchema};
use serde_json::Value;

pub use copy::CopyOptions;

use crate::defaults::{DynamicValues, get_default_values};
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::notification::Notification;

/// Per-locale validation state: key path to validity
pub type Validities = BTreeMap<String, BTreeMap<KeyPath, bool>>;

/// Whether editing the default locale mirrors `duplicate` fields into the
/// other locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossLocaleSync {
    #[default]
    Enabled,
    /// Used for structural edits such as list splicing
    Suppressed,
}

/// Editable staging copy of one entry, or of a new entry
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub is_new: bool,
    pub collection_name: String,
    pub file_name: Option<String>,
    pub is_index_file: bool,
    pub fields: Vec<Field>,
    pub i18n: I18nConfig,
    pub original_entry: Option<Entry>,
    pub original_locales: BTreeMap<String, bool>,
    pub current_locales: BTreeMap<String, bool>,
    pub original_slugs: BTreeMap<String, String>,
    pub current_slugs: BTreeMap<String, String>,
    pub original_values: BTreeMap<String, FlattenedContent>,
    pub current_values: BTreeMap<String, FlattenedContent>,
    /// Expanded state of list items and objects, keyed like the default
    /// locale's values
    pub expander_states: FlattenedContent,
    pub validities: Validities,
}

impl Draft {
    /// Draft of an existing entry. Locales the entry lacks start disabled
    /// and without values.
    pub fn for_entry(schema: &SiteSchema, entry: &Entry) -> Result<Self> {
        let target = schema.require_target(&entry.collection_name, entry.file_name.as_deref())?;
        let is_index_file =
            entry.file_name.is_none() && target.collection.is_index_slug(&entry.slug);
        let i18n = target.i18n().clone();

        let locales: BTreeMap<String, bool> = i18n
            .all_locales
            .iter()
            .map(|locale| (locale.clone(), entry.locales.contains_key(locale)))
            .collect();
        let values: BTreeMap<String, FlattenedContent> = entry
            .locales
            .iter()
            .map(|(locale, localized)| (locale.clone(), localized.content.clone()))
            .collect();
        let slugs: BTreeMap<String, String> = entry
            .locales
            .iter()
            .map(|(locale, localized)| (locale.clone(), localized.slug.clone()))
            .collect();

        Ok(Self {
            is_new: false,
            collection_name: entry.collection_name.clone(),
            file_name: entry.file_name.clone(),
            is_index_file,
            fields: target.fields_for(is_index_file).to_vec(),
            i18n,
            original_entry: Some(entry.clone()),
            original_locales: locales.clone(),
            current_locales: locales,
            original_slugs: slugs.clone(),
            current_slugs: slugs,
            original_values: values.clone(),
            current_values: values,
            expander_states: FlattenedContent::new(),
            validities: Validities::new(),
        })
    }

    /// Draft of a new entry with every locale enabled and populated with
    /// default values
    pub fn for_new_entry(target: EntryTarget<'_>, dynamic_values: &DynamicValues) -> Self {
        let i18n = target.i18n().clone();
        let fields = target.fields().to_vec();

        let locales: BTreeMap<String, bool> = i18n
            .all_locales
            .iter()
            .map(|locale| (locale.clone(), true))
            .collect();
        let mut draft = Self {
            is_new: true,
            collection_name: target.collection_name().to_string(),
            file_name: target.file_name().map(str::to_string),
            is_index_file: false,
            fields,
            i18n,
            original_entry: None,
            original_locales: locales.clone(),
            current_locales: locales,
            original_slugs: BTreeMap::new(),
            current_slugs: BTreeMap::new(),
            original_values: BTreeMap::new(),
            current_values: BTreeMap::new(),
            expander_states: FlattenedContent::new(),
            validities: Validities::new(),
        };

        let default_locale = draft.i18n.default_locale.clone();
        let defaults = get_default_values(&draft.fields, &default_locale, dynamic_values);
        draft.original_values.insert(default_locale.clone(), defaults.clone());
        draft.current_values.insert(default_locale.clone(), defaults);

        for locale in draft.i18n.all_locales.clone() {
            if locale == default_locale {
                continue;
            }
            let defaults = get_default_values(&draft.fields, &locale, dynamic_values);
            let seeded = draft.copy_default_locale_values(&defaults);
            draft.original_values.insert(locale.clone(), seeded.clone());
            draft.current_values.insert(locale, seeded);
        }

        draft
    }

    pub fn default_locale(&self) -> &str {
        &self.i18n.default_locale
    }

    pub fn is_locale_enabled(&self, locale: &str) -> bool {
        self.current_locales.get(locale).copied().unwrap_or(false)
    }

    /// Enabled locales in configuration order
    pub fn enabled_locales(&self) -> Vec<&str> {
        self.i18n
            .all_locales
            .iter()
            .map(String::as_str)
            .filter(|locale| self.is_locale_enabled(locale))
            .collect()
    }

    pub fn values(&self, locale: &str) -> Option<&FlattenedContent> {
        self.current_values.get(locale)
    }

    /// The slug the entry is saved under: the default locale's, else the
    /// original entry's
    pub fn slug(&self) -> Option<&str> {
        self.current_slugs
            .get(self.default_locale())
            .map(String::as_str)
            .filter(|slug| !slug.is_empty())
            .or_else(|| self.original_entry.as_ref().map(|entry| entry.slug.as_str()))
            .filter(|slug| !slug.is_empty())
    }

    pub fn set_slug(&mut self, locale: &str, slug: impl Into<String>) {
        self.current_slugs.insert(locale.to_string(), slug.into());
    }

    /// Set one value. With [`CrossLocaleSync::Enabled`], a value of a
    /// `duplicate` field set in the default locale is mirrored into every
    /// other enabled locale.
    pub fn set_value(
        &mut self,
        locale: &str,
        key_path: &KeyPath,
        value: Value,
        sync: CrossLocaleSync,
    ) -> Result<()> {
        let values = self
            .current_values
            .get_mut(locale)
            .ok_or_else(|| Error::LocaleNotFound {
                locale: locale.to_string(),
            })?;
        values.insert(key_path.clone(), value.clone());

        if sync == CrossLocaleSync::Suppressed
            || !self.i18n.enabled
            || !self.i18n.is_default_locale(locale)
        {
            return Ok(());
        }

        let is_duplicate = get_field(&self.fields, key_path, values)
            .is_some_and(|field| field.i18n.is_duplicate());
        if !is_duplicate {
            return Ok(());
        }

        let targets: Vec<String> = self
            .enabled_locales()
            .into_iter()
            .filter(|other| *other != locale)
            .map(str::to_string)
            .collect();
        for other in targets {
            if let Some(other_values) = self.current_values.get_mut(&other) {
                other_values.insert(key_path.clone(), value.clone());
            }
        }
        Ok(())
    }

    /// Replace all values of `locale`. With [`CrossLocaleSync::Enabled`],
    /// changed values of `duplicate` fields in the default locale are
    /// mirrored like [`Draft::set_value`] does.
    pub(crate) fn replace_values(
        &mut self,
        locale: &str,
        content: FlattenedContent,
        sync: CrossLocaleSync,
    ) {
        if sync == CrossLocaleSync::Enabled
            && self.i18n.enabled
            && self.i18n.is_default_locale(locale)
        {
            let previous = self.current_values.get(locale);
            let mirrored: Vec<(KeyPath, Value)> = content
                .iter()
                .filter(|(key_path, value)| previous.and_then(|p| p.get(*key_path)) != Some(*value))
                .filter(|(key_path, _)| {
                    get_field(&self.fields, key_path, &content)
                        .is_some_and(|field| field.i18n.is_duplicate())
                })
                .map(|(key_path, value)| (key_path.clone(), value.clone()))
                .collect();

            if !mirrored.is_empty() {
                let targets: Vec<String> = self
                    .enabled_locales()
                    .into_iter()
                    .filter(|other| *other != locale)
                    .map(str::to_string)
                    .collect();
                for other in targets {
                    if let Some(other_values) = self.current_values.get_mut(&other) {
                        other_values.extend(mirrored.iter().cloned());
                    }
                }
            }
        }
        self.current_values.insert(locale.to_string(), content);
    }

    /// Whether values, slugs or enabled locales differ from the originals
    pub fn is_modified(&self) -> bool {
        self.current_values != self.original_values
            || self.current_locales != self.original_locales
            || self.current_slugs != self.original_slugs
    }
}

/// Holds the draft of the single active editing session
#[derive(Debug, Default)]
pub struct DraftSession {
    draft: Option<Draft>,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `draft`, replacing any previous one
    pub fn load(&mut self, draft: Draft) {
        self.draft = Some(draft);
    }

    pub fn close(&mut self) -> Option<Draft> {
        self.draft.take()
    }

    pub fn is_loaded(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Result<&Draft> {
        self.draft.as_ref().ok_or(Error::NoDraft)
    }

    pub fn draft_mut(&mut self) -> Result<&mut Draft> {
        self.draft.as_mut().ok_or(Error::NoDraft)
    }

    pub fn set_value(
        &mut self,
        locale: &str,
        key_path: &KeyPath,
        value: Value,
        sync: CrossLocaleSync,
    ) -> Result<()> {
        self.draft_mut()?.set_value(locale, key_path, value, sync)
    }

    pub fn toggle_locale(&mut self, locale: &str) -> Result<()> {
        self.draft_mut()?.toggle_locale(locale)
    }

    pub fn revert_changes(
        &mut self,
        locale: Option<&str>,
        key_path: Option<&KeyPath>,
    ) -> Result<()> {
        self.draft_mut()?.revert_changes(locale, key_path);
        Ok(())
    }

    pub fn update_list_field<F>(
        &mut self,
        locale: &str,
        key_path: &KeyPath,
        manipulate: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Vec<Option<Value>>, &mut Vec<Option<Value>>),
    {
        self.draft_mut()?.update_list_field(locale, key_path, manipulate)
    }

    pub async fn copy_from_locale(
        &mut self,
        source_locale: &str,
        target_locale: &str,
        options: CopyOptions<'_>,
    ) -> Result<Vec<Notification>> {
        self.draft_mut()?
            .copy_from_locale(source_locale, target_locale, options)
            .await
    }
}
