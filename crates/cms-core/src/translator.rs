//! Translation service seam
//!
//! The engine never talks to a translation API directly. Callers plug in a
//! [`Translator`] and a [`CredentialPrompt`] that supplies its API key.

use async_trait::async_trait;

use crate::Result;

/// Request options passed to a [`Translator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub api_key: String,
    pub source_locale: String,
    pub target_locale: String,
}

/// A machine translation service
#[async_trait]
pub trait Translator: Send + Sync {
    /// Identifier used to look up the service's API key
    fn service_id(&self) -> &str;

    /// Translate `texts` in order. The result must hold exactly one
    /// translation per input.
    async fn translate(&self, texts: &[String], options: &TranslateOptions) -> Result<Vec<String>>;
}

/// Source of translation API keys
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// A key saved earlier for `service_id`
    fn saved_api_key(&self, _service_id: &str) -> Option<String> {
        None
    }

    /// Ask the user for a key. `multiple` is set when several fields will be
    /// translated. `None` means the user cancelled.
    async fn prompt_api_key(&self, service_id: &str, multiple: bool) -> Option<String>;
}

/// A translator together with the prompt providing its key
#[derive(Clone, Copy)]
pub struct Translation<'a> {
    pub translator: &'a dyn Translator,
    pub credentials: &'a dyn CredentialPrompt,
}

impl<'a> Translation<'a> {
    pub fn new(translator: &'a dyn Translator, credentials: &'a dyn CredentialPrompt) -> Self {
        Self {
            translator,
            credentials,
        }
    }

    /// Saved key, else a prompted one. Empty keys count as cancelled.
    pub(crate) async fn api_key(&self, multiple: bool) -> Option<String> {
        let service_id = self.translator.service_id();
        let is_set = |key: &String| !key.trim().is_empty();
        match self.credentials.saved_api_key(service_id).filter(is_set) {
            Some(key) => Some(key),
            None => self
                .credentials
                .prompt_api_key(service_id, multiple)
                .await
                .filter(is_set),
        }
    }
}
