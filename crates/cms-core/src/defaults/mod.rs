//! Default values of new drafts and list items
//!
//! Each widget contributes the flattened keys of its own default. A dynamic
//! default (e.g. from a URL query) takes precedence over the configured
//! `default`, except below array items where positions are ambiguous:
//!
//! ```text
//! precedence per field
//!   1. key path inside an array item  -> dynamic value ignored
//!   2. non-empty trimmed dynamic value
//!   3. configured `default`
//!   4. empty value of the widget ('' / [] / {})
//! ```

mod composite;
mod scalar;

use std::collections::BTreeMap;

use cms_content::path::{FlattenedContent, KeyPath};
use cms_meta::config::{Field, Widget};
use serde_json::Value;

/// Dynamic default values keyed by field key path
pub type DynamicValues = BTreeMap<KeyPath, String>;

/// Inputs of one widget default builder
pub(crate) struct DefaultArgs<'a> {
    pub field: &'a Field,
    pub key_path: &'a KeyPath,
    pub locale: &'a str,
    /// Trimmed, non-empty dynamic value applicable to this key path
    pub dynamic_value: Option<&'a str>,
    pub dynamic_values: &'a DynamicValues,
}

/// JavaScript-style truthiness used by the `default || fallback` rules
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Write the default value(s) of `field` at `key_path` into `content`.
///
/// `compute` fields contribute nothing.
pub fn populate_default_value(
    content: &mut FlattenedContent,
    key_path: &KeyPath,
    field: &Field,
    locale: &str,
    dynamic_values: &DynamicValues,
) {
    if field.widget == Widget::Compute {
        return;
    }

    let dynamic_value = if key_path.is_array_item() {
        None
    } else {
        dynamic_values
            .get(key_path)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let args = DefaultArgs {
        field,
        key_path,
        locale,
        dynamic_value,
        dynamic_values,
    };

    match &field.widget {
        Widget::Boolean => scalar::boolean(content, &args),
        Widget::Code => composite::code(content, &args),
        Widget::DateTime => scalar::datetime(content, &args),
        Widget::Hidden => scalar::hidden(content, &args),
        Widget::KeyValue => composite::keyvalue(content, &args),
        Widget::List => composite::list(content, &args),
        Widget::Number => scalar::number(content, &args),
        Widget::Object => composite::object(content, &args),
        Widget::Relation | Widget::Select => composite::select(content, &args),
        Widget::Compute => {}
        Widget::Markdown
        | Widget::Color
        | Widget::File
        | Widget::Image
        | Widget::Map
        | Widget::String
        | Widget::Text
        | Widget::Uuid
        | Widget::Custom(_) => scalar::string(content, &args),
    }
}

/// Default content of a new draft for `locale`: the defaults of every
/// top-level field folded into one map
pub fn get_default_values(
    fields: &[Field],
    locale: &str,
    dynamic_values: &DynamicValues,
) -> FlattenedContent {
    let mut content = FlattenedContent::new();
    for field in fields {
        populate_default_value(
            &mut content,
            &KeyPath::root().child(field.name.as_str()),
            field,
            locale,
            dynamic_values,
        );
    }
    content
}
