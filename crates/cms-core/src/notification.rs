//! User-facing notices emitted by draft operations

use serde::Serialize;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Info,
    Success,
    Error,
}

/// What a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Field values were copied from another locale
    CopyComplete,
    /// Nothing to copy
    CopyNone,
    TranslationStarted,
    TranslationComplete,
    /// Nothing to translate
    TranslationNone,
    TranslationError,
}

/// A notice for the editor, e.g. "3 fields copied from English"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub status: NotificationStatus,
    pub kind: NotificationKind,
    /// Number of fields involved
    pub count: usize,
    pub source_locale: String,
}

impl Notification {
    fn new(
        status: NotificationStatus,
        kind: NotificationKind,
        count: usize,
        source_locale: &str,
    ) -> Self {
        Self {
            status,
            kind,
            count,
            source_locale: source_locale.to_string(),
        }
    }

    pub fn copy_complete(count: usize, source_locale: &str) -> Self {
        Self::new(
            NotificationStatus::Success,
            NotificationKind::CopyComplete,
            count,
            source_locale,
        )
    }

    pub fn nothing_to_copy(source_locale: &str) -> Self {
        Self::new(
            NotificationStatus::Info,
            NotificationKind::CopyNone,
            0,
            source_locale,
        )
    }

    pub fn translation_started(count: usize, source_locale: &str) -> Self {
        Self::new(
            NotificationStatus::Info,
            NotificationKind::TranslationStarted,
            count,
            source_locale,
        )
    }

    pub fn translation_complete(count: usize, source_locale: &str) -> Self {
        Self::new(
            NotificationStatus::Success,
            NotificationKind::TranslationComplete,
            count,
            source_locale,
        )
    }

    pub fn nothing_to_translate(source_locale: &str) -> Self {
        Self::new(
            NotificationStatus::Info,
            NotificationKind::TranslationNone,
            0,
            source_locale,
        )
    }

    pub fn translation_failed(count: usize, source_locale: &str) -> Self {
        Self::new(
            NotificationStatus::Error,
            NotificationKind::TranslationError,
            count,
            source_locale,
        )
    }

    pub fn is_error(&self) -> bool {
        self.status == NotificationStatus::Error
    }
}
