//! File layout of a collection: base path, extension and the full-path
//! regular expression used to split a file path into locale and sub-path

use cms_content::Format;
use regex::Regex;

use crate::config::{Collection, CollectionFile};
use crate::error::{Error, Result};
use crate::i18n::{I18nConfig, I18nStructure};

/// Resolved file settings of a collection or collection file
#[derive(Debug, Clone)]
pub struct FileConfig {
    /// Collection folder, or the file path of a file item
    pub base_path: String,
    /// The collection `path` template, e.g. `{{slug}}/index`
    pub sub_path_template: Option<String>,
    pub extension: String,
    pub format: Option<Format>,
    /// Matches entry file paths with `locale` and `subPath` groups.
    /// File items are located through their path map instead.
    pub full_path_regex: Option<Regex>,
}

/// Remove leading and trailing slashes
pub(crate) fn strip_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

fn extension_of(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next()?;
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

impl FileConfig {
    /// Build the file settings of `collection`, or of one of its files
    pub fn new(
        collection: &Collection,
        file: Option<&CollectionFile>,
        i18n: &I18nConfig,
    ) -> Result<Self> {
        let format = collection.format.as_deref().and_then(Format::from_config_name);

        if let Some(file) = file {
            let path = strip_slashes(&file.file).to_string();
            let extension = extension_of(&path)
                .map(str::to_string)
                .or_else(|| format.map(|f| f.extension().to_string()))
                .unwrap_or_else(|| "md".to_string());
            return Ok(Self {
                base_path: path,
                sub_path_template: None,
                extension,
                format,
                full_path_regex: None,
            });
        }

        let base_path =
            strip_slashes(collection.folder.as_deref().unwrap_or_default()).to_string();
        let sub_path_template = collection
            .path
            .as_deref()
            .map(|p| strip_slashes(p).to_string());
        let extension = collection
            .extension
            .clone()
            .or_else(|| format.map(|f| f.extension().to_string()))
            .unwrap_or_else(|| "md".to_string());

        let regex = Self::full_path_pattern(
            &base_path,
            sub_path_template.is_some(),
            &extension,
            i18n,
        );
        let full_path_regex = Regex::new(&regex).map_err(|source| Error::InvalidPathTemplate {
            collection: collection.name.clone(),
            source,
        })?;

        Ok(Self {
            base_path,
            sub_path_template,
            extension,
            format,
            full_path_regex: Some(full_path_regex),
        })
    }

    fn full_path_pattern(
        base_path: &str,
        has_template: bool,
        extension: &str,
        i18n: &I18nConfig,
    ) -> String {
        let locales = i18n
            .all_locales
            .iter()
            .map(|l| regex::escape(l.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        let sub_path = if has_template { ".+" } else { "[^/]+" };
        let folder = if base_path.is_empty() {
            String::new()
        } else {
            format!("{}/", regex::escape(base_path))
        };
        let ext = regex::escape(extension);

        let structure = if i18n.enabled {
            i18n.structure
        } else {
            I18nStructure::None
        };

        match structure {
            I18nStructure::MultipleFolders => {
                format!("^{folder}(?P<locale>{locales})/(?P<subPath>{sub_path})\\.{ext}$")
            }
            I18nStructure::MultipleFoldersI18nRoot => {
                format!("^(?P<locale>{locales})/{folder}(?P<subPath>{sub_path})\\.{ext}$")
            }
            I18nStructure::MultipleFiles if i18n.omit_default_locale_from_filename => {
                format!("^{folder}(?P<subPath>{sub_path}?)(?:\\.(?P<locale>{locales}))?\\.{ext}$")
            }
            I18nStructure::MultipleFiles => {
                format!("^{folder}(?P<subPath>{sub_path}?)\\.(?P<locale>{locales})\\.{ext}$")
            }
            I18nStructure::SingleFile | I18nStructure::None => {
                format!("^{folder}(?P<subPath>{sub_path})\\.{ext}$")
            }
        }
    }

    /// Split an entry file path into `(sub_path, locale)`.
    ///
    /// The locale is `None` when the pattern has no locale group or the
    /// default locale was omitted from the file name.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<(&'p str, Option<&'p str>)> {
        let captures = self.full_path_regex.as_ref()?.captures(path)?;
        let sub_path = captures.name("subPath")?.as_str();
        let locale = captures.name("locale").map(|m| m.as_str());
        Some((sub_path, locale))
    }
}
