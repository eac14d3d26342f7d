//! TOML format handler

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::format::{Format, FormatHandler};

/// Handler for TOML entry files
#[derive(Debug, Default)]
pub struct TomlHandler;

impl TomlHandler {
    pub fn new() -> Self {
        Self
    }
}

/// Convert a TOML value into a JSON tree. Datetimes become strings.
fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: Map<String, Value> = table
                .iter()
                .map(|(key, item)| (key.clone(), toml_to_json(item)))
                .collect();
            Value::Object(map)
        }
    }
}

impl FormatHandler for TomlHandler {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let table: toml::Table = source
            .parse()
            .map_err(|e: toml::de::Error| Error::parse("TOML", e.to_string()))?;
        Ok(toml_to_json(&toml::Value::Table(table)))
    }

    fn render(&self, value: &Value) -> Result<String> {
        toml::to_string(value).map_err(|e| Error::render("TOML", e.to_string()))
    }
}
