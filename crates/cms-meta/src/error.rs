//! Error types for cms-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Invalid collection {name}: {message}")]
    InvalidCollection { name: String, message: String },

    #[error("Duplicate collection name: {name}")]
    DuplicateCollection { name: String },

    #[error("Invalid i18n configuration: {message}")]
    InvalidI18n { message: String },

    #[error("Collection not found: {name}")]
    UnknownCollection { name: String },

    #[error("File {file} not found in collection {collection}")]
    UnknownCollectionFile { collection: String, file: String },

    #[error("Invalid path template for {collection}: {source}")]
    InvalidPathTemplate {
        collection: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
