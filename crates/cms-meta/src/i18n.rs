//! Effective i18n settings of a collection or collection file

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Collection, CollectionFile, I18nOption, SiteConfig};

/// Locale key used for content of collections without i18n
pub const DEFAULT_LOCALE_KEY: &str = "_default";

/// Canonical slug key used when the site does not configure one
pub const DEFAULT_CANONICAL_SLUG_KEY: &str = "translationKey";

/// File layout of localized content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum I18nStructure {
    /// i18n disabled: one file, no locale keys
    None,
    /// One file holding a map of locale to content
    SingleFile,
    /// `folder/slug.locale.ext`
    MultipleFiles,
    /// `folder/locale/slug.ext`
    #[default]
    MultipleFolders,
    /// `locale/folder/slug.ext`
    MultipleFoldersI18nRoot,
}

impl I18nStructure {
    /// One file per locale
    pub fn is_per_locale_file(&self) -> bool {
        matches!(
            self,
            I18nStructure::MultipleFiles
                | I18nStructure::MultipleFolders
                | I18nStructure::MultipleFoldersI18nRoot
        )
    }
}

impl fmt::Display for I18nStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            I18nStructure::None => write!(f, "none"),
            I18nStructure::SingleFile => write!(f, "single_file"),
            I18nStructure::MultipleFiles => write!(f, "multiple_files"),
            I18nStructure::MultipleFolders => write!(f, "multiple_folders"),
            I18nStructure::MultipleFoldersI18nRoot => write!(f, "multiple_folders_i18n_root"),
        }
    }
}

/// Resolved i18n settings of one collection or collection file.
///
/// A pure function of the configuration; built once per schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I18nConfig {
    pub enabled: bool,
    /// Configured locales, or `["_default"]` when disabled
    pub all_locales: Vec<String>,
    pub default_locale: String,
    pub structure: I18nStructure,
    pub canonical_slug_key: String,
    pub omit_default_locale_from_filename: bool,
}

impl I18nConfig {
    /// Settings of content without localization
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            all_locales: vec![DEFAULT_LOCALE_KEY.to_string()],
            default_locale: DEFAULT_LOCALE_KEY.to_string(),
            structure: I18nStructure::None,
            canonical_slug_key: DEFAULT_CANONICAL_SLUG_KEY.to_string(),
            omit_default_locale_from_filename: false,
        }
    }

    /// Resolve the settings of `collection`, or of one of its files.
    ///
    /// i18n is enabled only when the site configures it, the collection opts
    /// in and the file (if any) does not opt out. A file item stores one file
    /// per locale when its path contains `{{locale}}` and a single
    /// locale-keyed file otherwise.
    pub fn resolve(
        site: &SiteConfig,
        collection: &Collection,
        file: Option<&CollectionFile>,
    ) -> Self {
        let Some(site_i18n) = site.i18n.as_ref() else {
            return Self::disabled();
        };
        let collection_opt_in = collection.i18n.as_ref().is_some_and(I18nOption::is_enabled);
        let file_opt_out = file
            .and_then(|f| f.i18n.as_ref())
            .is_some_and(|option| !option.is_enabled());
        if !collection_opt_in || file_opt_out {
            return Self::disabled();
        }

        let overrides = [
            collection.i18n.as_ref().and_then(I18nOption::overrides),
            file.and_then(|f| f.i18n.as_ref()).and_then(I18nOption::overrides),
        ];

        let mut structure = site_i18n.structure;
        let mut locales = site_i18n.locales.clone();
        let mut default_locale = site_i18n.default_locale.clone();
        for o in overrides.into_iter().flatten() {
            if let Some(s) = o.structure {
                structure = s;
            }
            if let Some(l) = &o.locales {
                locales = l.clone();
            }
            if let Some(d) = &o.default_locale {
                default_locale = Some(d.clone());
            }
        }

        if locales.is_empty() || structure == I18nStructure::None {
            return Self::disabled();
        }

        if let Some(file) = file {
            structure = if file.file.contains("{{locale}}") {
                I18nStructure::MultipleFiles
            } else {
                I18nStructure::SingleFile
            };
        }

        let default_locale = default_locale
            .filter(|d| locales.contains(d))
            .unwrap_or_else(|| locales[0].clone());

        let canonical_slug_key = site_i18n
            .canonical_slug
            .as_ref()
            .and_then(|c| c.key.clone())
            .unwrap_or_else(|| DEFAULT_CANONICAL_SLUG_KEY.to_string());

        Self {
            enabled: true,
            all_locales: locales,
            default_locale,
            structure,
            canonical_slug_key,
            omit_default_locale_from_filename: structure == I18nStructure::MultipleFiles
                && site_i18n.omit_default_locale_from_filename,
        }
    }

    pub fn is_default_locale(&self, locale: &str) -> bool {
        self.default_locale == locale
    }

    /// One file holds every locale
    pub fn is_single_file(&self) -> bool {
        self.enabled && self.structure == I18nStructure::SingleFile
    }

    /// One file per locale
    pub fn is_per_locale_file(&self) -> bool {
        self.enabled && self.structure.is_per_locale_file()
    }
}
