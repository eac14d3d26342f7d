//! Asset moves and renames
//!
//! Moving an asset changes its public URL. Every entry whose content
//! references the old URL is rewritten and saved in the same commit as the
//! move itself.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cms_meta::folders::AssetFolderInfo;
use cms_meta::schema::SiteSchema;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::draft::Draft;
use crate::entry::Entry;
use crate::entry::save::{ChangeAction, FileChange, FileData, saving_entry_data};
use crate::error::Result;

/// A media file in the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: String,
    pub name: String,
    pub sha: String,
    pub size: u64,
    /// The asset folder the file lives in
    pub folder: AssetFolderInfo,
    /// File contents, when already loaded
    pub data: Option<Vec<u8>>,
}

/// An asset and its destination path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovingAsset {
    pub asset: Asset,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAction {
    Move,
    Rename,
}

/// What a commit is for; backends use it for the commit message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitType {
    CreateEntry,
    UpdateEntry,
    DeleteEntries,
    UploadMedia,
    DeleteMedia,
}

/// Per-file outcome of a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub path: String,
    /// Blob hash of the committed file
    pub sha: String,
}

/// Persistence collaborator committing file changes atomically
#[async_trait]
pub trait Backend: Send + Sync {
    async fn commit_changes(
        &self,
        changes: &[FileChange],
        commit_type: CommitType,
    ) -> Result<Vec<CommitResult>>;
}

/// The site and the loaded entries an asset move applies to
#[derive(Debug, Clone, Copy)]
pub struct AssetMoveContext<'a> {
    pub schema: &'a SiteSchema,
    pub entries: &'a [Entry],
}

/// Result of [`move_assets`]. Callers replace the moved assets and the
/// saved entries wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub action: MoveAction,
    /// Number of moved assets
    pub count: usize,
    pub saving_assets: Vec<Asset>,
    pub saving_entries: Vec<Entry>,
    /// Everything that was committed
    pub changes: Vec<FileChange>,
}

impl MoveReport {
    pub fn moved(&self) -> bool {
        self.action == MoveAction::Move
    }

    pub fn renamed(&self) -> bool {
        self.action == MoveAction::Rename
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// URL of the asset at `path` as written in entry content; `None` for
/// entry-relative folders and the "all assets" pseudo folder
fn public_url(path: &str, folder: &AssetFolderInfo) -> Option<String> {
    if folder.entry_relative {
        return None;
    }
    let internal = folder.internal_path.as_deref()?;
    let public = folder.public_path.as_deref().unwrap_or_default();
    let rest = if internal.is_empty() {
        path
    } else {
        path.strip_prefix(internal)?.trim_start_matches('/')
    };
    Some(format!("{}/{rest}", public.trim_end_matches('/')))
}

/// Replace every occurrence of `from` in the string values of `entry`.
/// Returns whether anything changed.
fn replace_url(entry: &mut Entry, from: &str, to: &str) -> bool {
    let mut changed = false;
    for localized in entry.locales.values_mut() {
        for value in localized.content.values_mut() {
            if let Value::String(text) = value {
                if text.contains(from) {
                    *text = text.replace(from, to);
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Move or rename assets and rewrite the entries referencing them.
///
/// All asset moves and entry updates are committed in a single batch.
pub async fn move_assets(
    ctx: &AssetMoveContext<'_>,
    action: MoveAction,
    moving_assets: &[MovingAsset],
    backend: &dyn Backend,
) -> Result<MoveReport> {
    let mut changes = Vec::new();
    let mut saving_assets = Vec::new();
    // Entries are updated cumulatively when several assets touch one entry
    let mut working: BTreeMap<&str, Entry> = BTreeMap::new();
    let mut touched: Vec<&str> = Vec::new();

    for MovingAsset { asset, path } in moving_assets {
        changes.push(FileChange {
            action: ChangeAction::Move,
            path: path.clone(),
            previous_path: Some(asset.path.clone()),
            data: asset.data.clone().map(FileData::Binary),
        });
        saving_assets.push(Asset {
            path: path.clone(),
            name: file_name_of(path).to_string(),
            ..asset.clone()
        });

        let Some(old_url) = public_url(&asset.path, &asset.folder) else {
            debug!(path = %asset.path, "Asset has no public URL");
            continue;
        };
        let destination = ctx
            .schema
            .asset_folders()
            .iter()
            .find(|folder| {
                !folder.entry_relative && folder.internal_path.as_deref() == Some(dirname(path))
            })
            .unwrap_or(&asset.folder);
        let Some(new_url) = public_url(path, destination) else {
            continue;
        };

        for entry in ctx.entries {
            let current = working
                .get(entry.id.as_str())
                .cloned()
                .unwrap_or_else(|| entry.clone());
            let mut updated = current;
            if replace_url(&mut updated, &old_url, &new_url) {
                if !working.contains_key(entry.id.as_str()) {
                    touched.push(entry.id.as_str());
                }
                working.insert(entry.id.as_str(), updated);
            }
        }
    }

    let mut saving_entries = Vec::new();
    for id in touched {
        let Some(entry) = working.remove(id) else {
            continue;
        };
        let draft = Draft::for_entry(ctx.schema, &entry)?;
        let saving = saving_entry_data(ctx.schema, &draft)?;
        changes.extend(saving.changes);
        saving_entries.push(saving.entry);
    }

    let results = backend.commit_changes(&changes, CommitType::UploadMedia).await?;
    for asset in &mut saving_assets {
        if let Some(result) = results.iter().find(|r| r.path == asset.path) {
            asset.sha = result.sha.clone();
        }
    }

    info!(
        action = ?action,
        assets = moving_assets.len(),
        entries = saving_entries.len(),
        "Moved assets"
    );

    Ok(MoveReport {
        action,
        count: moving_assets.len(),
        saving_assets,
        saving_entries,
        changes,
    })
}
