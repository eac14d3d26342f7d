//! JSON format handler

use serde_json::Value;

use crate::error::Result;
use crate::format::{Format, FormatHandler};

/// Handler for JSON entry files
#[derive(Debug, Default)]
pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FormatHandler for JsonHandler {
    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, source: &str) -> Result<Value> {
        Ok(serde_json::from_str(source)?)
    }

    fn render(&self, value: &Value) -> Result<String> {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
    }
}
