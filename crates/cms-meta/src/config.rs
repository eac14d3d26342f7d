//! Site configuration types
//!
//! The site configuration is a declarative document describing collections,
//! their fields and their i18n settings:
//!
//! ```yaml
//! media_folder: static/images
//! i18n:
//!   structure: multiple_files
//!   locales: [en, ja]
//! collections:
//!   - name: posts
//!     folder: content/posts
//!     i18n: true
//!     fields:
//!       - { name: title, widget: string, i18n: true }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::Error;
use crate::i18n::I18nStructure;

/// Name of the index file when `index_file: true` is configured
pub const DEFAULT_INDEX_FILE_NAME: &str = "_index";

/// Root of the site configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Global media folder, relative to the repository root
    #[serde(default)]
    pub media_folder: String,
    /// Public URL prefix of the global media folder
    #[serde(default)]
    pub public_folder: Option<String>,
    /// Site-wide i18n settings
    #[serde(default)]
    pub i18n: Option<SiteI18n>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl SiteConfig {
    /// Find a collection by name
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// Site-wide i18n settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteI18n {
    #[serde(default)]
    pub structure: I18nStructure,
    #[serde(default)]
    pub locales: Vec<String>,
    /// Falls back to the first locale
    #[serde(default)]
    pub default_locale: Option<String>,
    /// Drop the locale suffix from default-locale file names (`multiple_files` only)
    #[serde(default)]
    pub omit_default_locale_from_filename: bool,
    #[serde(default)]
    pub canonical_slug: Option<CanonicalSlug>,
}

/// Field linking the per-locale files of one entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalSlug {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Collection- or file-level `i18n` option: a flag or partial overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum I18nOption {
    Enabled(bool),
    Options(I18nOverrides),
}

impl I18nOption {
    /// An options block counts as opting in
    pub fn is_enabled(&self) -> bool {
        !matches!(self, I18nOption::Enabled(false))
    }

    pub fn overrides(&self) -> Option<&I18nOverrides> {
        match self {
            I18nOption::Options(overrides) => Some(overrides),
            I18nOption::Enabled(_) => None,
        }
    }
}

/// Settings a collection may override from the site-level i18n block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct I18nOverrides {
    #[serde(default)]
    pub structure: Option<I18nStructure>,
    #[serde(default)]
    pub locales: Option<Vec<String>>,
    #[serde(default)]
    pub default_locale: Option<String>,
}

/// A collection of entries: either a folder of entry files or a list of files
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Folder holding the entry files (entry collection)
    #[serde(default)]
    pub folder: Option<String>,
    /// Individual files (file collection)
    #[serde(default)]
    pub files: Option<Vec<CollectionFile>>,
    /// Sub-path template below `folder`, e.g. `{{slug}}/index`
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub i18n: Option<I18nOption>,
    #[serde(default)]
    pub index_file: Option<IndexFileOption>,
    #[serde(default)]
    pub media_folder: Option<String>,
    #[serde(default)]
    pub public_folder: Option<String>,
    /// Menu separator; carries no content
    #[serde(default)]
    pub divider: bool,
}

impl Collection {
    pub fn is_entry_collection(&self) -> bool {
        self.folder.is_some()
    }

    pub fn is_file_collection(&self) -> bool {
        self.folder.is_none() && self.files.is_some()
    }

    /// Find a file of a file collection by name
    pub fn file(&self, name: &str) -> Option<&CollectionFile> {
        self.files.as_ref()?.iter().find(|f| f.name == name)
    }

    /// Name of the special index file, if the collection includes one
    pub fn index_file_name(&self) -> Option<&str> {
        match self.index_file.as_ref()? {
            IndexFileOption::Enabled(true) => Some(DEFAULT_INDEX_FILE_NAME),
            IndexFileOption::Enabled(false) => None,
            IndexFileOption::Options(settings) => {
                Some(settings.name.as_deref().unwrap_or(DEFAULT_INDEX_FILE_NAME))
            }
        }
    }

    /// Fields used when editing the index file
    pub fn index_file_fields(&self) -> Option<&[Field]> {
        match self.index_file.as_ref()? {
            IndexFileOption::Options(settings) => settings.fields.as_deref(),
            IndexFileOption::Enabled(_) => None,
        }
    }
}

/// One file of a file collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionFile {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Repository path, may contain `{{locale}}`
    pub file: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub i18n: Option<I18nOption>,
    #[serde(default)]
    pub media_folder: Option<String>,
    #[serde(default)]
    pub public_folder: Option<String>,
}

/// `index_file` option of an entry collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexFileOption {
    Enabled(bool),
    Options(IndexFileSettings),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexFileSettings {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<Field>>,
}

/// Widget type of a field.
///
/// Unknown names are kept as [`Widget::Custom`] so registry-extended widgets
/// survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Widget {
    Boolean,
    Code,
    Color,
    Compute,
    DateTime,
    File,
    Hidden,
    Image,
    KeyValue,
    List,
    Map,
    Markdown,
    Number,
    Object,
    Relation,
    Select,
    #[default]
    String,
    Text,
    Uuid,
    Custom(String),
}

impl Widget {
    pub fn as_str(&self) -> &str {
        match self {
            Widget::Boolean => "boolean",
            Widget::Code => "code",
            Widget::Color => "color",
            Widget::Compute => "compute",
            Widget::DateTime => "datetime",
            Widget::File => "file",
            Widget::Hidden => "hidden",
            Widget::Image => "image",
            Widget::KeyValue => "keyvalue",
            Widget::List => "list",
            Widget::Map => "map",
            Widget::Markdown => "markdown",
            Widget::Number => "number",
            Widget::Object => "object",
            Widget::Relation => "relation",
            Widget::Select => "select",
            Widget::String => "string",
            Widget::Text => "text",
            Widget::Uuid => "uuid",
            Widget::Custom(name) => name,
        }
    }

    /// Plain text, single-line string or Markdown
    pub fn is_free_text(&self) -> bool {
        matches!(self, Widget::Text | Widget::String | Widget::Markdown)
    }
}

impl From<String> for Widget {
    fn from(name: String) -> Self {
        match name.as_str() {
            "boolean" => Widget::Boolean,
            "code" => Widget::Code,
            "color" => Widget::Color,
            "compute" => Widget::Compute,
            "datetime" => Widget::DateTime,
            "file" => Widget::File,
            "hidden" => Widget::Hidden,
            "image" => Widget::Image,
            "keyvalue" => Widget::KeyValue,
            "list" => Widget::List,
            "map" => Widget::Map,
            "markdown" => Widget::Markdown,
            "number" => Widget::Number,
            "object" => Widget::Object,
            "relation" => Widget::Relation,
            "select" => Widget::Select,
            "string" => Widget::String,
            "text" => Widget::Text,
            "uuid" => Widget::Uuid,
            _ => Widget::Custom(name),
        }
    }
}

impl From<&str> for Widget {
    fn from(name: &str) -> Self {
        Widget::from(name.to_string())
    }
}

impl From<Widget> for String {
    fn from(widget: Widget) -> Self {
        widget.as_str().to_string()
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field localization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "RawI18nMode")]
pub enum I18nMode {
    /// Localized; each locale holds its own value
    True,
    /// Stored in the default locale only
    #[default]
    False,
    /// Localized, with machine translation offered
    Translate,
    /// Copied from the default locale on every edit
    Duplicate,
    /// Same as `False`
    None,
}

impl I18nMode {
    /// Each locale holds its own, independently translated value
    pub fn is_translatable(&self) -> bool {
        matches!(self, I18nMode::True | I18nMode::Translate)
    }

    /// The value lives in the default locale only
    pub fn is_excluded(&self) -> bool {
        matches!(self, I18nMode::False | I18nMode::None)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, I18nMode::Duplicate)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawI18nMode {
    Flag(bool),
    Named(String),
}

impl TryFrom<RawI18nMode> for I18nMode {
    type Error = Error;

    fn try_from(raw: RawI18nMode) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawI18nMode::Flag(true) => Ok(I18nMode::True),
            RawI18nMode::Flag(false) => Ok(I18nMode::False),
            RawI18nMode::Named(name) => name.parse(),
        }
    }
}

impl FromStr for I18nMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "true" => Ok(I18nMode::True),
            "false" => Ok(I18nMode::False),
            "translate" => Ok(I18nMode::Translate),
            "duplicate" => Ok(I18nMode::Duplicate),
            "none" => Ok(I18nMode::None),
            _ => Err(Error::InvalidI18n {
                message: format!("unknown field i18n mode `{s}`"),
            }),
        }
    }
}

impl Serialize for I18nMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            I18nMode::True => serializer.serialize_bool(true),
            I18nMode::False => serializer.serialize_bool(false),
            I18nMode::Translate => serializer.serialize_str("translate"),
            I18nMode::Duplicate => serializer.serialize_str("duplicate"),
            I18nMode::None => serializer.serialize_str("none"),
        }
    }
}

/// Property names of a code widget's object output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeKeys {
    #[serde(default = "default_code_key")]
    pub code: String,
    #[serde(default = "default_lang_key")]
    pub lang: String,
}

impl Default for CodeKeys {
    fn default() -> Self {
        Self {
            code: default_code_key(),
            lang: default_lang_key(),
        }
    }
}

fn default_code_key() -> String {
    "code".to_string()
}

fn default_lang_key() -> String {
    "lang".to_string()
}

fn default_type_key() -> String {
    "type".to_string()
}

/// A field of a collection, file, object or list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub widget: Widget,
    /// Unset on a nested field means "same as the parent"
    #[serde(default)]
    pub i18n: Option<I18nMode>,
    #[serde(default)]
    pub default: Option<Value>,
    /// Sub-fields of an object, or of each object item of a list
    #[serde(default)]
    pub fields: Option<Vec<Field>>,
    /// Single item field of a list
    #[serde(default)]
    pub field: Option<Box<Field>>,
    /// Variable types of an object or list; each type is an object-like field
    #[serde(default)]
    pub types: Option<Vec<Field>>,
    #[serde(default = "default_type_key")]
    pub type_key: String,
    /// A list stored as the top-level array of the file
    #[serde(default)]
    pub root: bool,
    /// Select, relation, file and image widgets accepting several values
    #[serde(default)]
    pub multiple: bool,
    /// Code widget storing only the code string
    #[serde(default)]
    pub output_code_only: bool,
    #[serde(default)]
    pub keys: Option<CodeKeys>,
    /// Number widget value type: `int`, `float` or `int/float`
    #[serde(default)]
    pub value_type: Option<String>,
    /// DateTime widget: `false` stores the time only
    #[serde(default)]
    pub date_format: Option<Value>,
    /// DateTime widget: `false` stores the date only
    #[serde(default)]
    pub time_format: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, widget: Widget) -> Self {
        Self {
            name: name.into(),
            label: None,
            widget,
            i18n: None,
            default: None,
            fields: None,
            field: None,
            types: None,
            type_key: default_type_key(),
            root: false,
            multiple: false,
            output_code_only: false,
            keys: None,
            value_type: None,
            date_format: None,
            time_format: None,
        }
    }

    pub fn with_i18n(mut self, i18n: I18nMode) -> Self {
        self.i18n = Some(i18n);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(Box::new(field));
        self
    }

    /// A list without `field`, `fields` or `types`: a list of strings
    pub fn is_simple_list(&self) -> bool {
        self.widget == Widget::List
            && self.field.is_none()
            && self.fields.is_none()
            && self.types.is_none()
    }

    pub fn code_keys(&self) -> CodeKeys {
        self.keys.clone().unwrap_or_default()
    }

    /// Look up one of the variable types by name
    pub fn variable_type(&self, name: &str) -> Option<&Field> {
        self.types.as_ref()?.iter().find(|t| t.name == name)
    }
}

/// Whether `fields` describe a file whose root is a top-level list
pub fn has_root_list_field(fields: &[Field]) -> bool {
    matches!(fields, [field] if field.widget == Widget::List && field.root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_widget_from_name() {
        assert_eq!(Widget::from("datetime"), Widget::DateTime);
        assert_eq!(Widget::from("keyvalue"), Widget::KeyValue);
        assert_eq!(Widget::from("color-picker"), Widget::Custom("color-picker".into()));
        assert_eq!(Widget::default(), Widget::String);
    }

    #[test]
    fn test_widget_display_round_trips() {
        for name in ["boolean", "compute", "list", "uuid", "my-widget"] {
            assert_eq!(Widget::from(name).to_string(), name);
        }
    }

    #[test]
    fn test_i18n_mode_from_value() {
        let parse = |v: Value| serde_json::from_value::<I18nMode>(v).unwrap();
        assert_eq!(parse(json!(true)), I18nMode::True);
        assert_eq!(parse(json!(false)), I18nMode::False);
        assert_eq!(parse(json!("translate")), I18nMode::Translate);
        assert_eq!(parse(json!("duplicate")), I18nMode::Duplicate);
        assert_eq!(parse(json!("none")), I18nMode::None);
        assert!(serde_json::from_value::<I18nMode>(json!("sometimes")).is_err());
    }

    #[test]
    fn test_i18n_mode_serialize() {
        assert_eq!(serde_json::to_value(I18nMode::True).unwrap(), json!(true));
        assert_eq!(serde_json::to_value(I18nMode::Duplicate).unwrap(), json!("duplicate"));
    }

    #[test]
    fn test_field_defaults() {
        let field: Field = serde_json::from_value(json!({"name": "title"})).unwrap();
        assert_eq!(field.widget, Widget::String);
        assert_eq!(field.type_key, "type");
        assert_eq!(field.i18n, None);
        assert_eq!(field.code_keys(), CodeKeys::default());
    }

    #[test]
    fn test_index_file_name() {
        let mut collection = Collection {
            name: "pages".into(),
            folder: Some("content".into()),
            ..Default::default()
        };
        assert_eq!(collection.index_file_name(), None);

        collection.index_file = Some(IndexFileOption::Enabled(true));
        assert_eq!(collection.index_file_name(), Some("_index"));

        collection.index_file = Some(IndexFileOption::Options(IndexFileSettings {
            name: Some("index".into()),
            fields: None,
        }));
        assert_eq!(collection.index_file_name(), Some("index"));
    }

    #[test]
    fn test_root_list_detection() {
        let mut list = Field::new("items", Widget::List);
        assert!(!has_root_list_field(std::slice::from_ref(&list)));
        list.root = true;
        assert!(has_root_list_field(std::slice::from_ref(&list)));
        assert!(!has_root_list_field(&[list, Field::new("title", Widget::String)]));
    }
}
