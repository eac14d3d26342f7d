//! Resolved site schema
//!
//! [`SiteSchema`] resolves every collection and collection file once: i18n
//! settings, file layout and folders. Lookups by collection name and file
//! name are what the entry assembler and the draft reconciler use.

use tracing::debug;

use crate::config::{Collection, CollectionFile, Field, SiteConfig};
use crate::error::{Error, Result};
use crate::file::FileConfig;
use crate::folders::{AssetFolderInfo, EntryFolderInfo, asset_folders, entry_folders};
use crate::i18n::I18nConfig;

/// A collection with its resolved settings
#[derive(Debug, Clone)]
pub struct ResolvedCollection {
    pub collection: Collection,
    pub i18n: I18nConfig,
    pub kind: CollectionKind,
}

#[derive(Debug, Clone)]
pub enum CollectionKind {
    /// A folder of entry files
    Entry { file: FileConfig },
    /// A fixed list of files
    Files { files: Vec<ResolvedFile> },
}

/// A file of a file collection with its resolved settings
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub file: CollectionFile,
    pub i18n: I18nConfig,
    pub file_config: FileConfig,
}

impl ResolvedCollection {
    pub fn name(&self) -> &str {
        &self.collection.name
    }

    pub fn file(&self, name: &str) -> Option<&ResolvedFile> {
        match &self.kind {
            CollectionKind::Files { files } => files.iter().find(|f| f.file.name == name),
            CollectionKind::Entry { .. } => None,
        }
    }

    /// Whether an entry with `slug` is the collection's index file
    pub fn is_index_slug(&self, slug: &str) -> bool {
        self.collection.index_file_name() == Some(slug)
    }
}

/// The collection, and for file collections the file, an entry belongs to
#[derive(Debug, Clone, Copy)]
pub struct EntryTarget<'a> {
    pub collection: &'a ResolvedCollection,
    pub file: Option<&'a ResolvedFile>,
}

impl<'a> EntryTarget<'a> {
    pub fn collection_name(&self) -> &'a str {
        self.collection.name()
    }

    pub fn file_name(&self) -> Option<&'a str> {
        self.file.map(|f| f.file.name.as_str())
    }

    pub fn i18n(&self) -> &'a I18nConfig {
        match self.file {
            Some(file) => &file.i18n,
            None => &self.collection.i18n,
        }
    }

    pub fn file_config(&self) -> Option<&'a FileConfig> {
        match (self.file, &self.collection.kind) {
            (Some(file), _) => Some(&file.file_config),
            (None, CollectionKind::Entry { file }) => Some(file),
            (None, CollectionKind::Files { .. }) => None,
        }
    }

    /// Regular fields of the collection or file
    pub fn fields(&self) -> &'a [Field] {
        match self.file {
            Some(file) => &file.file.fields,
            None => &self.collection.collection.fields,
        }
    }

    /// Fields used to edit an entry; the index file may define its own
    pub fn fields_for(&self, is_index_file: bool) -> &'a [Field] {
        if is_index_file && self.file.is_none() {
            if let Some(fields) = self.collection.collection.index_file_fields() {
                return fields;
            }
        }
        self.fields()
    }
}

/// Site configuration with every collection resolved
#[derive(Debug, Clone)]
pub struct SiteSchema {
    config: SiteConfig,
    collections: Vec<ResolvedCollection>,
    entry_folders: Vec<EntryFolderInfo>,
    asset_folders: Vec<AssetFolderInfo>,
}

impl SiteSchema {
    /// Resolve all collections of `config`. Dividers and collections with
    /// neither `folder` nor `files` are left out.
    pub fn new(config: SiteConfig) -> Result<Self> {
        let mut collections = Vec::new();

        for collection in &config.collections {
            if collection.divider {
                continue;
            }
            let i18n = I18nConfig::resolve(&config, collection, None);

            let kind = if collection.is_entry_collection() {
                CollectionKind::Entry {
                    file: FileConfig::new(collection, None, &i18n)?,
                }
            } else if let Some(files) = &collection.files {
                let files = files
                    .iter()
                    .map(|file| {
                        let i18n = I18nConfig::resolve(&config, collection, Some(file));
                        let file_config = FileConfig::new(collection, Some(file), &i18n)?;
                        Ok(ResolvedFile {
                            file: file.clone(),
                            i18n,
                            file_config,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                CollectionKind::Files { files }
            } else {
                debug!(
                    collection = %collection.name,
                    "Ignoring collection without folder or files"
                );
                continue;
            };

            debug!(
                collection = %collection.name,
                i18n = i18n.enabled,
                structure = %i18n.structure,
                "Resolved collection"
            );
            collections.push(ResolvedCollection {
                collection: collection.clone(),
                i18n,
                kind,
            });
        }

        let entry_folders = entry_folders(&config);
        let asset_folders = asset_folders(&config);

        Ok(Self {
            config,
            collections,
            entry_folders,
            asset_folders,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn collections(&self) -> &[ResolvedCollection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&ResolvedCollection> {
        self.collections.iter().find(|c| c.name() == name)
    }

    /// Resolve the target of an entry; `None` when the collection or the
    /// file is unknown
    pub fn target(
        &self,
        collection_name: &str,
        file_name: Option<&str>,
    ) -> Option<EntryTarget<'_>> {
        let collection = self.collection(collection_name)?;
        let file = match file_name {
            Some(name) => Some(collection.file(name)?),
            None => None,
        };
        Some(EntryTarget { collection, file })
    }

    /// Like [`SiteSchema::target`], with an error naming what is missing
    pub fn require_target(
        &self,
        collection_name: &str,
        file_name: Option<&str>,
    ) -> Result<EntryTarget<'_>> {
        let collection = self
            .collection(collection_name)
            .ok_or_else(|| Error::UnknownCollection {
                name: collection_name.to_string(),
            })?;
        let file = match file_name {
            Some(name) => Some(collection.file(name).ok_or_else(|| {
                Error::UnknownCollectionFile {
                    collection: collection_name.to_string(),
                    file: name.to_string(),
                }
            })?),
            None => None,
        };
        Ok(EntryTarget { collection, file })
    }

    pub fn entry_folders(&self) -> &[EntryFolderInfo] {
        &self.entry_folders
    }

    /// The entry folder a repository file belongs to
    pub fn entry_folder_for(&self, path: &str) -> Option<&EntryFolderInfo> {
        self.entry_folders.iter().find(|f| f.contains(path))
    }

    pub fn asset_folders(&self) -> &[AssetFolderInfo] {
        &self.asset_folders
    }

    /// The site-wide media folder
    pub fn global_asset_folder(&self) -> Option<&AssetFolderInfo> {
        self.asset_folders
            .iter()
            .find(|f| f.collection_name.is_none() && f.internal_path.is_some())
    }

    /// The asset folder of a collection, falling back to the global one
    pub fn asset_folder_for(&self, collection_name: &str) -> Option<&AssetFolderInfo> {
        self.asset_folders
            .iter()
            .find(|f| f.collection_name.as_deref() == Some(collection_name))
            .or_else(|| self.global_asset_folder())
    }
}
