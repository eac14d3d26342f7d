//! Core engine of the content layer.
//!
//! - [`entry`]: the entry model, the entry assembler and the save pipeline
//! - [`defaults`]: default values of new drafts and list items
//! - [`draft`]: the draft and its reconciliation operations
//! - [`assets`]: asset moves that rewrite the entries referencing them

pub mod assets;
pub mod defaults;
pub mod draft;
pub mod entry;
pub mod error;
pub mod notification;
pub mod translator;

pub use assets::{
    Asset, AssetMoveContext, Backend, CommitResult, CommitType, MoveAction, MoveReport,
    MovingAsset, move_assets,
};
pub use defaults::{DynamicValues, get_default_values, populate_default_value};
pub use draft::{CopyOptions, CrossLocaleSync, Draft, DraftSession};
pub use entry::save::{ChangeAction, FileChange, FileData, SavingEntry, saving_entry_data};
pub use entry::{AssembleResult, Entry, EntryAssembler, LocalizedEntry, RawEntryFile};
pub use error::{Error, Result};
pub use notification::{Notification, NotificationKind, NotificationStatus};
pub use translator::{CredentialPrompt, TranslateOptions, Translation, Translator};
