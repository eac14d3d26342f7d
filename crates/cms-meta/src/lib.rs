//! Site configuration and schema resolution for the content engine.
//!
//! This crate loads the declarative site configuration, resolves the
//! effective i18n settings and file layout of every collection, and looks up
//! the field schema behind any flattened key path.

pub mod config;
pub mod error;
pub mod field;
pub mod file;
pub mod folders;
pub mod i18n;
pub mod loader;
pub mod schema;
pub mod validation;

pub use config::{
    Collection, CollectionFile, Field, I18nMode, I18nOption, IndexFileOption, SiteConfig,
    SiteI18n, Widget,
};
pub use error::{Error, Result};
pub use field::{FieldRef, get_field};
pub use file::FileConfig;
pub use folders::{AssetFolderInfo, EntryFolderInfo, asset_folders, entry_folders};
pub use i18n::{DEFAULT_LOCALE_KEY, I18nConfig, I18nStructure};
pub use loader::load_site_config;
pub use schema::{CollectionKind, EntryTarget, ResolvedCollection, ResolvedFile, SiteSchema};
