//! Copying and translating values between locales

use cms_content::path::KeyPath;
use cms_meta::field::get_field;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{CrossLocaleSync, Draft};
use crate::defaults::is_truthy;
use crate::error::{Error, Result};
use crate::notification::Notification;
use crate::translator::{TranslateOptions, Translation};

/// Options of [`Draft::copy_from_locale`]
#[derive(Clone, Copy, Default)]
pub struct CopyOptions<'a> {
    /// Only copy values at or below this path
    pub key_path: Option<&'a KeyPath>,
    /// Machine-translate instead of copying verbatim
    pub translation: Option<Translation<'a>>,
}

impl<'a> CopyOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_path(mut self, key_path: &'a KeyPath) -> Self {
        self.key_path = Some(key_path);
        self
    }

    pub fn translate(mut self, translation: Translation<'a>) -> Self {
        self.translation = Some(translation);
        self
    }
}

impl Draft {
    /// Copy, or translate, text values from `source_locale` into
    /// `target_locale`.
    ///
    /// Only non-empty strings of string, text and markdown fields and of
    /// simple lists are candidates. A plain copy skips values the target
    /// already has; translating every field skips populated target values.
    ///
    /// Returns the notifications to show. A cancelled credential prompt
    /// returns none and leaves the draft untouched, as does a failed
    /// translation (reported as an error notification).
    pub async fn copy_from_locale(
        &mut self,
        source_locale: &str,
        target_locale: &str,
        options: CopyOptions<'_>,
    ) -> Result<Vec<Notification>> {
        let locale_not_found = |locale: &str| Error::LocaleNotFound {
            locale: locale.to_string(),
        };
        let source_values = self
            .current_values
            .get(source_locale)
            .ok_or_else(|| locale_not_found(source_locale))?;
        let target_values = self
            .current_values
            .get(target_locale)
            .ok_or_else(|| locale_not_found(target_locale))?;

        let prefix = options.key_path.filter(|key_path| !key_path.is_empty());
        let translating = options.translation.is_some();

        let candidates: Vec<(KeyPath, String)> = source_values
            .iter()
            .filter_map(|(key_path, value)| {
                if prefix.is_some_and(|prefix| !key_path.starts_with(prefix)) {
                    return None;
                }
                let text = value.as_str().filter(|text| !text.is_empty())?;
                let copyable = match get_field(&self.fields, key_path, source_values) {
                    Some(field) => field.widget().is_free_text() || field.field.is_simple_list(),
                    None => true,
                };
                if !copyable {
                    return None;
                }
                let target_value = target_values.get(key_path);
                if !translating && target_value == Some(value) {
                    return None;
                }
                if translating && prefix.is_none() && target_value.is_some_and(is_truthy) {
                    return None;
                }
                Some((key_path.clone(), text.to_string()))
            })
            .collect();

        let count = candidates.len();
        let mut updated = target_values.clone();

        let Some(translation) = options.translation else {
            if count == 0 {
                return Ok(vec![Notification::nothing_to_copy(source_locale)]);
            }
            for (key_path, text) in candidates {
                updated.insert(key_path, Value::String(text));
            }
            self.replace_values(target_locale, updated, CrossLocaleSync::Enabled);
            debug!(source_locale, target_locale, count, "Copied values");
            return Ok(vec![Notification::copy_complete(count, source_locale)]);
        };

        if count == 0 {
            return Ok(vec![Notification::nothing_to_translate(source_locale)]);
        }

        let Some(api_key) = translation.api_key(count > 1).await else {
            debug!(
                service = translation.translator.service_id(),
                "Translation cancelled without an API key"
            );
            return Ok(Vec::new());
        };

        let started = Notification::translation_started(count, source_locale);
        let texts: Vec<String> = candidates.iter().map(|(_, text)| text.clone()).collect();
        let request = TranslateOptions {
            api_key,
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
        };

        let translated = translation
            .translator
            .translate(&texts, &request)
            .await
            .and_then(|translated| {
                if translated.len() == count {
                    Ok(translated)
                } else {
                    Err(Error::Translation {
                        message: format!("expected {count} translations, got {}", translated.len()),
                    })
                }
            });

        match translated {
            Ok(translated) => {
                for ((key_path, _), text) in candidates.into_iter().zip(translated) {
                    updated.insert(key_path, Value::String(text));
                }
                self.replace_values(target_locale, updated, CrossLocaleSync::Enabled);
                info!(
                    service = translation.translator.service_id(),
                    source_locale,
                    target_locale,
                    count,
                    "Translated values"
                );
                Ok(vec![
                    started,
                    Notification::translation_complete(count, source_locale),
                ])
            }
            Err(error) => {
                warn!(
                    service = translation.translator.service_id(),
                    error = %error,
                    "Translation failed"
                );
                Ok(vec![
                    started,
                    Notification::translation_failed(count, source_locale),
                ])
            }
        }
    }
}
