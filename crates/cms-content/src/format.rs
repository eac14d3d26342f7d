//! Format detection, handler trait and the default entry parser

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::handlers::{FrontMatterHandler, JsonHandler, TomlHandler, YamlHandler};

/// Supported entry file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Yaml,
    Toml,
    Json,
    /// Markdown with a `---` YAML front matter block
    YamlFrontMatter,
    /// Markdown with a `+++` TOML front matter block
    TomlFrontMatter,
    /// Markdown with a leading JSON object
    JsonFrontMatter,
}

impl Format {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "md" | "markdown" | "mdx" | "html" => Some(Self::YamlFrontMatter),
            _ => None,
        }
    }

    /// Detect format from the extension of a file path
    pub fn from_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit('/').next()?;
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Parse a collection `format` option such as `yml` or `toml-frontmatter`
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "yml" | "yaml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "frontmatter" | "yaml-frontmatter" => Some(Self::YamlFrontMatter),
            "toml-frontmatter" => Some(Self::TomlFrontMatter),
            "json-frontmatter" => Some(Self::JsonFrontMatter),
            _ => None,
        }
    }

    /// Default file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Toml => "toml",
            Self::Json => "json",
            Self::YamlFrontMatter | Self::TomlFrontMatter | Self::JsonFrontMatter => "md",
        }
    }

    pub fn is_front_matter(&self) -> bool {
        matches!(
            self,
            Self::YamlFrontMatter | Self::TomlFrontMatter | Self::JsonFrontMatter
        )
    }

    /// The handler implementing this format
    pub fn handler(&self) -> Box<dyn FormatHandler> {
        match self {
            Self::Yaml => Box::new(YamlHandler::new()),
            Self::Toml => Box::new(TomlHandler::new()),
            Self::Json => Box::new(JsonHandler::new()),
            Self::YamlFrontMatter | Self::TomlFrontMatter | Self::JsonFrontMatter => {
                Box::new(FrontMatterHandler::new(*self))
            }
        }
    }
}

/// Converts between file text and a nested content tree
pub trait FormatHandler: Send + Sync {
    /// The format handled
    fn format(&self) -> Format;

    /// Parse source text into a content tree
    fn parse(&self, source: &str) -> Result<Value>;

    /// Render a content tree back to source text
    fn render(&self, value: &Value) -> Result<String>;
}

/// Turns raw entry file text into an untyped content tree.
///
/// Implementations may fail on malformed content; callers collect the error
/// per file instead of aborting.
pub trait EntryParser: Send + Sync {
    fn parse_entry(&self, path: &str, text: &str) -> Result<Value>;
}

/// Default [`EntryParser`] choosing a handler by file extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatParser {
    fallback: Option<Format>,
}

impl FormatParser {
    pub fn new() -> Self {
        Self { fallback: None }
    }

    /// Use `format` for paths whose extension is not recognised
    pub fn with_fallback(format: Format) -> Self {
        Self {
            fallback: Some(format),
        }
    }
}

impl EntryParser for FormatParser {
    fn parse_entry(&self, path: &str, text: &str) -> Result<Value> {
        let format = Format::from_path(path)
            .or(self.fallback)
            .ok_or_else(|| Error::UnsupportedFormat(path.to_string()))?;
        format.handler().parse(text)
    }
}

/// Render a content tree with the handler for `format`
pub fn render_entry(value: &Value, format: Format) -> Result<String> {
    format.handler().render(value)
}
