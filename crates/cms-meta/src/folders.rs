//! Entry and asset folder derivation
//!
//! Entry folders tell which repository paths belong to which collection (and
//! collection file); they become the folder metadata of raw entry files.
//! Asset folders map repository paths of media files to public URLs.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::file::strip_slashes;
use crate::i18n::{DEFAULT_LOCALE_KEY, I18nConfig, I18nStructure};

/// Where the files of a collection or collection file live
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryFolderInfo {
    pub collection_name: String,
    /// Set for file collection items
    pub file_name: Option<String>,
    /// Collection folder (entry collections)
    pub folder_path: Option<String>,
    /// Locale to folder (entry collections)
    pub folder_path_map: BTreeMap<String, String>,
    /// Locale to file path (file collection items)
    pub file_path_map: BTreeMap<String, String>,
}

impl EntryFolderInfo {
    /// Whether the file at `path` belongs to this folder
    pub fn contains(&self, path: &str) -> bool {
        if self.file_name.is_some() {
            return self.file_path_map.values().any(|p| p == path);
        }
        self.folder_path_map.values().any(|folder| {
            folder.is_empty()
                || path
                    .strip_prefix(folder.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Entry folders of every collection, entry collections first, each group
/// sorted by path
pub fn entry_folders(config: &SiteConfig) -> Vec<EntryFolderInfo> {
    let mut entry_collection_folders: Vec<EntryFolderInfo> = config
        .collections
        .iter()
        .filter_map(|collection| {
            let folder = collection.folder.as_deref()?;
            let folder_path = strip_slashes(folder).to_string();
            let i18n = I18nConfig::resolve(config, collection, None);
            let i18n_root =
                i18n.enabled && i18n.structure == I18nStructure::MultipleFoldersI18nRoot;

            let folder_path_map = i18n
                .all_locales
                .iter()
                .map(|locale| {
                    let path = if i18n_root {
                        format!("{locale}/{folder_path}")
                    } else {
                        folder_path.clone()
                    };
                    (locale.clone(), path)
                })
                .collect();

            Some(EntryFolderInfo {
                collection_name: collection.name.clone(),
                folder_path: Some(folder_path),
                folder_path_map,
                ..Default::default()
            })
        })
        .collect();
    entry_collection_folders.sort_by(|a, b| a.folder_path.cmp(&b.folder_path));

    let mut file_collection_folders: Vec<EntryFolderInfo> = config
        .collections
        .iter()
        .filter(|c| c.is_file_collection())
        .flat_map(|collection| {
            collection.files.iter().flatten().map(move |file| {
                let path = strip_slashes(&file.file).to_string();
                let file_path_map = if path.contains("{{locale}}") {
                    let i18n = I18nConfig::resolve(config, collection, Some(file));
                    i18n.all_locales
                        .iter()
                        .map(|locale| {
                            let localized = if i18n.omit_default_locale_from_filename
                                && i18n.is_default_locale(locale)
                            {
                                path.replacen(".{{locale}}", "", 1)
                            } else {
                                path.replacen("{{locale}}", locale, 1)
                            };
                            (locale.clone(), localized)
                        })
                        .collect()
                } else {
                    BTreeMap::from([(DEFAULT_LOCALE_KEY.to_string(), path)])
                };

                EntryFolderInfo {
                    collection_name: collection.name.clone(),
                    file_name: Some(file.name.clone()),
                    file_path_map,
                    ..Default::default()
                }
            })
        })
        .collect();
    file_collection_folders.sort_by(|a, b| {
        a.file_path_map
            .values()
            .next()
            .cmp(&b.file_path_map.values().next())
    });

    entry_collection_folders.extend(file_collection_folders);
    entry_collection_folders
}

/// Where the media files of the site, a collection or a collection file live
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetFolderInfo {
    /// `None` for the global folders
    pub collection_name: Option<String>,
    pub file_name: Option<String>,
    /// Repository path; `None` for the "all assets" pseudo folder
    pub internal_path: Option<String>,
    /// URL prefix used in entry content
    pub public_path: Option<String>,
    /// Assets are stored next to the entry file
    pub entry_relative: bool,
    /// The media folder contains template tags such as `{{slug}}`
    pub has_template_tags: bool,
}

struct GlobalFolders {
    media_folder: String,
    public_folder: String,
}

/// Replace `{{media_folder}}` and `{{public_folder}}`; the result starts with
/// `/` so it is not treated as entry-relative
fn replace_tags(folder: &str, globals: &GlobalFolders) -> String {
    folder
        .trim()
        .replacen("{{media_folder}}", &format!("/{}", globals.media_folder), 1)
        .replacen("{{public_folder}}", &format!("/{}", globals.public_folder), 1)
        .replacen("//", "/", 1)
}

fn normalize_asset_folder(
    collection_name: &str,
    file_name: Option<&str>,
    media_folder: &str,
    public_folder: Option<&str>,
    base_folder: Option<&str>,
    globals: &GlobalFolders,
) -> AssetFolderInfo {
    let media_folder = replace_tags(media_folder, globals);
    let public_folder = match public_folder {
        Some(folder) => replace_tags(folder, globals),
        None => media_folder.clone(),
    };
    let entry_relative = !media_folder.starts_with('/');

    let internal_path = if entry_relative {
        strip_slashes(base_folder.unwrap_or_default())
    } else {
        strip_slashes(&media_folder)
    };
    let public_path = if public_folder.is_empty()
        || public_folder.starts_with('.')
        || public_folder.starts_with('@')
    {
        public_folder.clone()
    } else {
        format!("/{}", strip_slashes(&public_folder))
    };
    let has_template_tags = Regex::new(r"\{\{.+?\}\}")
        .map(|re| re.is_match(&media_folder))
        .unwrap_or(false);

    AssetFolderInfo {
        collection_name: Some(collection_name.to_string()),
        file_name: file_name.map(str::to_string),
        internal_path: Some(internal_path.to_string()),
        public_path: Some(public_path),
        entry_relative,
        has_template_tags,
    }
}

fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Asset folders: the "all assets" pseudo folder, the global media folder,
/// then collection- and file-level folders that differ from the global one
pub fn asset_folders(config: &SiteConfig) -> Vec<AssetFolderInfo> {
    let media_folder = strip_slashes(&config.media_folder);
    let media_folder = if media_folder == "." { "" } else { media_folder };
    let public_folder = match config.public_folder.as_deref() {
        Some(folder) if !folder.is_empty() => {
            let folder = format!("/{}", strip_slashes(folder));
            match folder.strip_prefix("/@") {
                Some(rest) => format!("@{rest}"),
                None => folder,
            }
        }
        _ => format!("/{media_folder}"),
    };
    let globals = GlobalFolders {
        media_folder: media_folder.to_string(),
        public_folder: public_folder.clone(),
    };

    let all_assets = AssetFolderInfo::default();
    let global = AssetFolderInfo {
        internal_path: Some(globals.media_folder.clone()),
        public_path: Some(globals.public_folder.clone()),
        ..Default::default()
    };

    let mut folders = Vec::new();
    let mut add_if_needed = |folder: AssetFolderInfo| {
        let same_as_global = !folder.entry_relative
            && folder.internal_path.as_deref() == Some(globals.media_folder.as_str())
            && folder.public_path.as_deref() == Some(globals.public_folder.as_str());
        if !same_as_global {
            folders.push(folder);
        }
    };

    for collection in config.collections.iter().filter(|c| !c.divider) {
        // With a `path` template, `media_folder` defaults to the entry folder
        let media_folder = match (&collection.media_folder, &collection.path) {
            (Some(folder), _) => Some(folder.as_str()),
            (None, Some(_)) => Some(""),
            (None, None) => None,
        };
        if let Some(media_folder) = media_folder {
            add_if_needed(normalize_asset_folder(
                &collection.name,
                None,
                media_folder,
                collection.public_folder.as_deref(),
                collection.folder.as_deref(),
                &globals,
            ));
        }

        for file in collection.files.iter().flatten() {
            if let Some(media_folder) = file.media_folder.as_deref() {
                add_if_needed(normalize_asset_folder(
                    &collection.name,
                    Some(&file.name),
                    media_folder,
                    file.public_folder.as_deref(),
                    Some(dirname(&file.file)),
                    &globals,
                ));
            }
        }
    }

    folders.sort_by(|a, b| a.internal_path.cmp(&b.internal_path));

    let mut all = vec![all_assets, global];
    all.extend(folders);
    all
}
