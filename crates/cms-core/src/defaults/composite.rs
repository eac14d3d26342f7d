//! Defaults of widgets storing objects or arrays

use cms_content::path::{FlattenedContent, KeyPath, flatten_into};
use serde_json::{Map, Value};

use super::{DefaultArgs, populate_default_value, scalar};

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

/// Split a comma separated dynamic value into trimmed, non-empty items
fn split_list(text: &str) -> Vec<Value> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| Value::String(item.to_string()))
        .collect()
}

fn insert_items(content: &mut FlattenedContent, key_path: &KeyPath, items: &[Value]) {
    if items.is_empty() {
        content.insert(key_path.clone(), empty_array());
        return;
    }
    for (index, item) in items.iter().enumerate() {
        flatten_into(&key_path.index(index), item, content);
    }
}

pub(super) fn code(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let field = args.field;
    let default = field.default.as_ref();

    if field.output_code_only {
        let value = args
            .dynamic_value
            .map(str::to_string)
            .or_else(|| default.and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();
        content.insert(args.key_path.clone(), Value::String(value));
        return;
    }

    let keys = field.code_keys();
    let from_default = |key: &str| {
        default
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let code = args
        .dynamic_value
        .map(str::to_string)
        .or_else(|| default.and_then(Value::as_str).map(str::to_string))
        .or_else(|| from_default(&keys.code))
        .unwrap_or_default();
    let lang = if args.dynamic_value.is_some() {
        String::new()
    } else {
        from_default(&keys.lang).unwrap_or_default()
    };

    content.insert(args.key_path.clone(), empty_object());
    content.insert(args.key_path.child(keys.code), Value::String(code));
    content.insert(args.key_path.child(keys.lang), Value::String(lang));
}

pub(super) fn keyvalue(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    match &args.field.default {
        Some(Value::Object(pairs)) if !pairs.is_empty() => {
            for (key, value) in pairs {
                let text = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                content.insert(args.key_path.child(key.as_str()), Value::String(text));
            }
        }
        _ => {
            content.insert(args.key_path.clone(), empty_object());
        }
    }
}

pub(super) fn list(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let field = args.field;
    if field.is_simple_list() {
        if let Some(dynamic) = args.dynamic_value {
            insert_items(content, args.key_path, &split_list(dynamic));
            return;
        }
    }
    match &field.default {
        Some(Value::Array(items)) => insert_items(content, args.key_path, items),
        _ => {
            content.insert(args.key_path.clone(), empty_array());
        }
    }
}

pub(super) fn object(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let field = args.field;
    content.insert(args.key_path.clone(), empty_object());

    if field.types.is_some() {
        return;
    }

    for subfield in field.fields.as_deref().unwrap_or_default() {
        populate_default_value(
            content,
            &args.key_path.child(subfield.name.as_str()),
            subfield,
            args.locale,
            args.dynamic_values,
        );
    }

    if let Some(default) = field.default.as_ref().filter(|d| d.is_object()) {
        flatten_into(args.key_path, default, content);
    }
}

/// Select and relation widgets
pub(super) fn select(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    if !args.field.multiple {
        scalar::string(content, args);
        return;
    }
    match (args.dynamic_value, &args.field.default) {
        (Some(dynamic), _) => insert_items(content, args.key_path, &split_list(dynamic)),
        (None, Some(Value::Array(items))) => insert_items(content, args.key_path, items),
        _ => {
            content.insert(args.key_path.clone(), empty_array());
        }
    }
}
