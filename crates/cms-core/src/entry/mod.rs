//! Entry model
//!
//! An [`Entry`] is one logical piece of content, assembled from one or more
//! raw files. Each locale keeps its own flattened content.

mod assembler;
pub mod save;

use std::collections::BTreeMap;

use cms_content::path::FlattenedContent;
use cms_meta::folders::EntryFolderInfo;
use serde::{Deserialize, Serialize};

pub use assembler::{AssembleResult, EntryAssembler};

/// The content of one locale of an entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalizedEntry {
    pub slug: String,
    /// Repository path of the file holding this locale
    pub path: String,
    pub sha: String,
    pub content: FlattenedContent,
}

/// A unified, possibly multi-locale content record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entry {
    /// Fresh for every assembly; stable for the lifetime of the entry list
    pub id: String,
    pub slug: String,
    /// File path without the collection folder, locale and extension
    pub sub_path: String,
    /// Hash of the default-locale file
    pub sha: String,
    pub locales: BTreeMap<String, LocalizedEntry>,
    pub collection_name: String,
    /// Set for entries of file collections
    pub file_name: Option<String>,
}

impl Entry {
    pub fn locale(&self, locale: &str) -> Option<&LocalizedEntry> {
        self.locales.get(locale)
    }

    /// Repository paths of every locale file, deduplicated
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.locales.values().map(|l| l.path.as_str()).collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}

/// A raw entry file as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntryFile {
    pub path: String,
    pub sha: String,
    pub text: String,
    /// The entry folder the file was found in
    pub folder: EntryFolderInfo,
}
