//! Markdown with front matter
//!
//! The front matter block becomes the content tree and the text after it is
//! stored under the `body` key. Three delimiters are recognised:
//!
//! ```text
//! ---            +++            {
//! title: Hi      title = "Hi"     "title": "Hi"
//! ---            +++            }
//! Body           Body           Body
//! ```

use serde_json::{Map, Value};

use super::{JsonHandler, TomlHandler, YamlHandler};
use crate::error::{Error, Result};
use crate::format::{Format, FormatHandler};

/// Key holding the Markdown body
pub const BODY_KEY: &str = "body";

/// Handler for Markdown files with YAML, TOML or JSON front matter
#[derive(Debug)]
pub struct FrontMatterHandler {
    format: Format,
}

impl FrontMatterHandler {
    /// `format` selects the delimiter used when rendering; parsing accepts
    /// any of the three.
    pub fn new(format: Format) -> Self {
        Self { format }
    }
}

/// Split `source` at a block opened and closed by `delimiter` lines
fn split_delimited<'a>(source: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let rest = source.strip_prefix(delimiter)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == delimiter {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Split a leading JSON object from the rest of the text
fn split_json(source: &str) -> Result<(Value, &str)> {
    let mut stream = serde_json::Deserializer::from_str(source).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => {
            let offset = stream.byte_offset();
            Ok((value, &source[offset..]))
        }
        Some(Err(e)) => Err(Error::parse("JSON front matter", e.to_string())),
        None => Err(Error::parse("JSON front matter", "empty document")),
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl FormatHandler for FrontMatterHandler {
    fn format(&self) -> Format {
        self.format
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);

        let (mut map, body) = if source.starts_with("---") {
            let (front, body) = split_delimited(source, "---")
                .ok_or_else(|| Error::parse("YAML front matter", "unclosed front matter"))?;
            (into_object(YamlHandler::new().parse(front)?), body)
        } else if source.starts_with("+++") {
            let (front, body) = split_delimited(source, "+++")
                .ok_or_else(|| Error::parse("TOML front matter", "unclosed front matter"))?;
            (into_object(TomlHandler::new().parse(front)?), body)
        } else if source.starts_with('{') {
            let (front, body) = split_json(source)?;
            (into_object(front), body)
        } else {
            (Map::new(), source)
        };

        let body = body.trim_start_matches(['\r', '\n']);
        if !body.is_empty() {
            map.insert(BODY_KEY.to_string(), Value::String(body.to_string()));
        }

        Ok(Value::Object(map))
    }

    fn render(&self, value: &Value) -> Result<String> {
        let mut map = match value {
            Value::Object(map) => map.clone(),
            _ => return Err(Error::render("front matter", "content root must be an object")),
        };
        let body = match map.remove(BODY_KEY) {
            Some(Value::String(body)) => body,
            Some(other) => {
                map.insert(BODY_KEY.to_string(), other);
                String::new()
            }
            None => String::new(),
        };
        let front = Value::Object(map);

        let mut out = match self.format {
            Format::TomlFrontMatter => format!("+++\n{}+++\n", TomlHandler::new().render(&front)?),
            Format::JsonFrontMatter => JsonHandler::new().render(&front)?,
            _ => format!("---\n{}---\n", YamlHandler::new().render(&front)?),
        };

        if !body.is_empty() {
            out.push('\n');
            out.push_str(&body);
        }
        Ok(out)
    }
}
