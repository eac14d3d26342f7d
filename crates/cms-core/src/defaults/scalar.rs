//! Defaults of single-valued widgets

use chrono::Local;
use cms_content::path::FlattenedContent;
use serde_json::{Number, Value};
use uuid::Uuid;

use super::{DefaultArgs, is_truthy};

const NOW_TAG: &str = "{{now}}";

pub(super) fn boolean(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let value = match (args.dynamic_value, &args.field.default) {
        (Some(dynamic), _) => dynamic == "true",
        (None, Some(Value::Bool(default))) => *default,
        _ => false,
    };
    content.insert(args.key_path.clone(), Value::Bool(value));
}

/// Whether a `date_format` / `time_format` option disables that part
fn is_disabled(option: &Option<Value>) -> bool {
    matches!(option, Some(Value::Bool(false)))
}

/// Current local time in the shape the field stores
fn current_date_time(args: &DefaultArgs<'_>) -> String {
    let now = Local::now();
    if is_disabled(&args.field.time_format) {
        now.format("%Y-%m-%d").to_string()
    } else if is_disabled(&args.field.date_format) {
        now.format("%H:%M").to_string()
    } else {
        now.format("%Y-%m-%dT%H:%M").to_string()
    }
}

pub(super) fn datetime(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let value = match (args.dynamic_value, &args.field.default) {
        (Some(dynamic), _) => Value::String(dynamic.to_string()),
        (None, Some(Value::String(default))) if default == NOW_TAG => {
            Value::String(current_date_time(args))
        }
        (None, Some(default)) if is_truthy(default) => default.clone(),
        _ => Value::String(String::new()),
    };
    content.insert(args.key_path.clone(), value);
}

pub(super) fn hidden(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let value = match (args.dynamic_value, &args.field.default) {
        (Some(dynamic), _) => Value::String(dynamic.to_string()),
        (None, Some(Value::String(default))) => {
            let mut text = default.clone();
            if text.contains(NOW_TAG) {
                text = text.replace(NOW_TAG, &current_date_time(args));
            }
            if text.contains("{{uuid}}") {
                text = text.replace("{{uuid}}", &Uuid::new_v4().to_string());
            }
            Value::String(text.replace("{{locale}}", args.locale))
        }
        (None, Some(Value::Null)) | (None, None) => Value::String(String::new()),
        (None, Some(default)) => default.clone(),
    };
    content.insert(args.key_path.clone(), value);
}

fn parse_number(text: &str, value_type: Option<&str>) -> Option<Number> {
    let as_int = || text.parse::<i64>().ok().map(Number::from);
    let as_float = || text.parse::<f64>().ok().and_then(Number::from_f64);
    match value_type {
        Some("float") => as_float(),
        Some("int/float") => as_int().or_else(as_float),
        _ => as_int(),
    }
}

pub(super) fn number(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let parsed = args
        .dynamic_value
        .and_then(|dynamic| parse_number(dynamic, args.field.value_type.as_deref()));
    let value = match (parsed, &args.field.default) {
        (Some(number), _) => Value::Number(number),
        (None, Some(Value::Number(default))) => Value::Number(default.clone()),
        _ => Value::String(String::new()),
    };
    content.insert(args.key_path.clone(), value);
}

/// Shared by text-like widgets: dynamic value, then a truthy default, then
/// an empty string
pub(super) fn string(content: &mut FlattenedContent, args: &DefaultArgs<'_>) {
    let value = match (args.dynamic_value, &args.field.default) {
        (Some(dynamic), _) => Value::String(dynamic.to_string()),
        (None, Some(default)) if is_truthy(default) => default.clone(),
        _ => Value::String(String::new()),
    };
    content.insert(args.key_path.clone(), value);
}
