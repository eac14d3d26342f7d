//! Structural validation of a site configuration

use std::collections::HashSet;

use crate::config::{Collection, I18nOption, SiteConfig};
use crate::error::{Error, Result};

/// Check the rules serde cannot express: unique names, exactly one of
/// `folder` / `files` per collection, and consistent locales
pub fn validate(config: &SiteConfig) -> Result<()> {
    if let Some(i18n) = &config.i18n {
        check_locales(&i18n.locales, i18n.default_locale.as_deref())?;
    }

    let mut names = HashSet::new();
    for collection in &config.collections {
        if collection.divider {
            continue;
        }
        if !names.insert(collection.name.as_str()) {
            return Err(Error::DuplicateCollection {
                name: collection.name.clone(),
            });
        }
        validate_collection(collection)?;
    }

    Ok(())
}

fn validate_collection(collection: &Collection) -> Result<()> {
    let invalid = |message: &str| Error::InvalidCollection {
        name: collection.name.clone(),
        message: message.to_string(),
    };

    match (&collection.folder, &collection.files) {
        (Some(_), Some(_)) => return Err(invalid("`folder` and `files` are mutually exclusive")),
        (None, None) => return Err(invalid("either `folder` or `files` is required")),
        _ => {}
    }

    if let Some(files) = &collection.files {
        let mut names = HashSet::new();
        for file in files {
            if !names.insert(file.name.as_str()) {
                return Err(invalid(&format!("duplicate file name `{}`", file.name)));
            }
            if file.file.trim_matches('/').is_empty() {
                return Err(invalid(&format!("file `{}` has an empty path", file.name)));
            }
        }
    }

    if let Some(I18nOption::Options(overrides)) = &collection.i18n {
        if let Some(locales) = &overrides.locales {
            check_locales(locales, overrides.default_locale.as_deref())?;
        }
    }

    Ok(())
}

fn check_locales(locales: &[String], default_locale: Option<&str>) -> Result<()> {
    if locales.is_empty() {
        return Err(Error::InvalidI18n {
            message: "`locales` must not be empty".to_string(),
        });
    }
    if let Some(default_locale) = default_locale {
        if !locales.iter().any(|l| l == default_locale) {
            return Err(Error::InvalidI18n {
                message: format!("default locale `{default_locale}` is not in `locales`"),
            });
        }
    }
    Ok(())
}
