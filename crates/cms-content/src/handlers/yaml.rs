//! YAML format handler using serde_yaml

use serde_json::{Map, Value};
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};
use crate::format::{Format, FormatHandler};

/// Handler for YAML entry files using serde_yaml
#[derive(Debug, Default)]
pub struct YamlHandler;

impl YamlHandler {
    pub fn new() -> Self {
        Self
    }
}

/// Convert a YAML value into a JSON tree. Non-string mapping keys are
/// stringified; tags are dropped.
fn yaml_to_json(value: &YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(items) => Value::Array(items.iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, item) in mapping {
                let key = match key {
                    YamlValue::String(s) => s.clone(),
                    YamlValue::Bool(b) => b.to_string(),
                    YamlValue::Number(n) => n.to_string(),
                    _ => continue,
                };
                map.insert(key, yaml_to_json(item));
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

impl FormatHandler for YamlHandler {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let value: YamlValue =
            serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?;
        Ok(yaml_to_json(&value))
    }

    fn render(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| Error::render("YAML", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_parse_nested() {
        let handler = YamlHandler::new();
        let value = handler.parse("title: Hi\ntags:\n  - a\n  - b\n").unwrap();
        assert_eq!(value, json!({"title": "Hi", "tags": ["a", "b"]}));
    }

    #[test]
    fn test_yaml_numeric_keys_become_strings() {
        let value = YamlHandler::new().parse("2024: x\n").unwrap();
        assert_eq!(value, json!({"2024": "x"}));
    }

    #[test]
    fn test_yaml_parse_error() {
        let handler = YamlHandler::new();
        assert!(handler.parse("invalid: yaml: content: [unclosed").is_err());
    }

    #[test]
    fn test_yaml_render_parse() {
        let handler = YamlHandler::new();
        let value = json!({"title": "Hi", "draft": false});
        let text = handler.render(&value).unwrap();
        assert_eq!(handler.parse(&text).unwrap(), value);
    }
}
