//! Site configuration loading
//!
//! The configuration is YAML by default; `.toml` and `.json` files are
//! parsed by extension. Every loaded configuration is validated.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::validation::validate;

/// Load and validate the site configuration at `path`
pub fn load_site_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path)?;
    let invalid = |message: String| Error::InvalidConfig {
        path: path.to_path_buf(),
        message,
    };

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str::<SiteConfig>(&text).map_err(|e| invalid(e.to_string()))?,
        Some("json") => {
            serde_json::from_str::<SiteConfig>(&text).map_err(|e| invalid(e.to_string()))?
        }
        _ => serde_yaml::from_str::<SiteConfig>(&text).map_err(|e| invalid(e.to_string()))?,
    };
    validate(&config)?;

    debug!(
        path = %path.display(),
        collections = config.collections.len(),
        "Loaded site configuration"
    );
    Ok(config)
}

impl SiteConfig {
    /// Parse and validate a YAML configuration
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: SiteConfig = serde_yaml::from_str(text)?;
        validate(&config)?;
        Ok(config)
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(text)?;
        validate(&config)?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: SiteConfig = serde_json::from_str(text)?;
        validate(&config)?;
        Ok(config)
    }
}
