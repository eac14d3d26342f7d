//! Locale toggling, default-locale seeding, reverts and list splicing

use std::collections::BTreeMap;

use cms_content::path::{FlattenedContent, KeyPath, merge_sublist, select_sublist};
use cms_meta::config::Field;
use cms_meta::field::get_field;
use serde_json::Value;
use tracing::debug;

use super::{CrossLocaleSync, Draft};
use crate::defaults::{DynamicValues, get_default_values};
use crate::error::{Error, Result};

/// Keys of `values` matching `filter` that `locale` may hold: everything
/// in the default locale, translatable fields elsewhere
fn revertible_keys(
    fields: &[Field],
    values: &FlattenedContent,
    filter: Option<&KeyPath>,
    is_default_locale: bool,
) -> Vec<KeyPath> {
    values
        .keys()
        .filter(|key_path| filter.is_none_or(|prefix| key_path.starts_with(prefix)))
        .filter(|key_path| {
            is_default_locale
                || get_field(fields, key_path, values).is_some_and(|f| f.i18n.is_translatable())
        })
        .cloned()
        .collect()
}

impl Draft {
    /// Enable or disable `locale`.
    ///
    /// Enabling a locale that has no values yet seeds it with defaults, and
    /// then with the default locale's values via
    /// [`Draft::copy_default_locale_values`]. Any other toggle only flips
    /// the flag and clears the locale's validities; values are retained.
    pub fn toggle_locale(&mut self, locale: &str) -> Result<()> {
        if !self.i18n.all_locales.iter().any(|l| l == locale) {
            return Err(Error::LocaleNotFound {
                locale: locale.to_string(),
            });
        }
        let enabled = !self.is_locale_enabled(locale);

        if enabled && !self.current_values.contains_key(locale) {
            let defaults = get_default_values(&self.fields, locale, &DynamicValues::new());
            let seeded = self.copy_default_locale_values(&defaults);
            self.original_values.insert(locale.to_string(), defaults);
            self.current_values.insert(locale.to_string(), seeded);
        } else {
            self.validities.insert(locale.to_string(), BTreeMap::new());
        }
        self.current_locales.insert(locale.to_string(), enabled);

        debug!(locale, enabled, "Toggled locale");
        Ok(())
    }

    /// Merge the default locale's current values over `content`.
    ///
    /// Free-text fields that are translated per locale keep `content`'s
    /// value (or an empty string). Fields stored in the default locale
    /// only are removed along with everything below them. Keys without a
    /// matching field are kept.
    pub fn copy_default_locale_values(&self, content: &FlattenedContent) -> FlattenedContent {
        let mut merged = content.clone();
        if let Some(defaults) = self.current_values.get(self.default_locale()) {
            merged.extend(defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let key_paths: Vec<KeyPath> = merged.keys().cloned().collect();
        let mut excluded: Vec<KeyPath> = Vec::new();

        for key_path in key_paths {
            let Some(field) = get_field(&self.fields, &key_path, &merged) else {
                continue;
            };

            if field.widget().is_free_text() && field.i18n.is_translatable() {
                let own = content
                    .get(&key_path)
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new()));
                merged.insert(key_path.clone(), own);
            }

            if field.i18n.is_excluded()
                || excluded.iter().any(|prefix| key_path.starts_with(prefix))
            {
                merged.remove(&key_path);
                excluded.push(key_path);
            }
        }

        merged
    }

    /// Revert values to the originals.
    ///
    /// `locale` limits the revert to one locale and `key_path` to the values
    /// at or below a path. Matching current values are removed, then the
    /// matching original values restored. Outside the default locale only
    /// translatable fields are touched.
    pub fn revert_changes(&mut self, locale: Option<&str>, key_path: Option<&KeyPath>) {
        let locales: Vec<String> = match locale {
            Some(locale) => vec![locale.to_string()],
            None => self.i18n.all_locales.clone(),
        };

        for locale in locales {
            let is_default_locale = self.i18n.is_default_locale(&locale);

            if let Some(current) = self.current_values.get(&locale) {
                let reset = revertible_keys(&self.fields, current, key_path, is_default_locale);
                if let Some(current) = self.current_values.get_mut(&locale) {
                    for key in &reset {
                        current.remove(key);
                    }
                }
            }

            if let Some(original) = self.original_values.get(&locale) {
                let restored: Vec<(KeyPath, Value)> =
                    revertible_keys(&self.fields, original, key_path, is_default_locale)
                        .into_iter()
                        .filter_map(|key| {
                            let value = original.get(&key)?.clone();
                            Some((key, value))
                        })
                        .collect();
                self.current_values
                    .entry(locale.clone())
                    .or_default()
                    .extend(restored);
            }

            debug!(locale = %locale, "Reverted changes");
        }
    }

    /// Splice the list at `key_path` in `locale`.
    ///
    /// `manipulate` receives the list items and the parallel expander
    /// states. Expander states are only tracked for the default locale;
    /// other locales get a placeholder of the same length that is dropped
    /// afterwards, so one splice closure works for every locale. The result
    /// never mirrors values across locales.
    pub fn update_list_field<F>(
        &mut self,
        locale: &str,
        key_path: &KeyPath,
        manipulate: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Vec<Option<Value>>, &mut Vec<Option<Value>>),
    {
        let values = self
            .current_values
            .get(locale)
            .ok_or_else(|| Error::LocaleNotFound {
                locale: locale.to_string(),
            })?;
        let (mut items, remainder) = select_sublist(values, key_path);

        let is_default_locale = self.i18n.is_default_locale(locale);
        let (mut states, states_remainder) = if is_default_locale {
            let (mut states, remainder) = select_sublist(&self.expander_states, key_path);
            if states.len() < items.len() {
                states.resize(items.len(), None);
            }
            (states, remainder)
        } else {
            (vec![None; items.len()], FlattenedContent::new())
        };

        manipulate(&mut items, &mut states);

        let content = merge_sublist(key_path, &items, remainder);
        self.replace_values(locale, content, CrossLocaleSync::Suppressed);
        if is_default_locale {
            self.expander_states = merge_sublist(key_path, &states, states_remainder);
        }

        debug!(locale, key_path = %key_path, items = items.len(), "Updated list field");
        Ok(())
    }
}
