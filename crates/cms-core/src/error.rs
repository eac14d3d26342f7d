//! Error types for cms-core

/// Result type for cms-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cms-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An entry file could not be parsed; collected per file by the assembler
    #[error("Failed to parse {path}: {source}")]
    EntryParse {
        path: String,
        #[source]
        source: cms_content::Error,
    },

    /// A draft operation was issued while no draft is loaded
    #[error("No draft is loaded")]
    NoDraft,

    #[error("Locale not found: {locale}")]
    LocaleNotFound { locale: String },

    /// A new entry cannot be saved before it has a slug
    #[error("No slug set for new entry in {collection}")]
    MissingSlug { collection: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    // Transparent wrappers for underlying crate errors
    /// Configuration or schema error from cms-meta
    #[error(transparent)]
    Meta(#[from] cms_meta::Error),

    /// Parse or render error from cms-content
    #[error(transparent)]
    Content(#[from] cms_content::Error),
}
