//! Scripted collaborators for translation, credentials and persistence.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use cms_core::{
    Backend, ChangeAction, CommitResult, CommitType, CredentialPrompt, Error, FileChange,
    FileData, Result, TranslateOptions, Translator,
};

/// Translator answering `"{target_locale}:{text}"`, or failing on demand
#[derive(Debug, Default)]
pub struct ScriptedTranslator {
    failure: Option<String>,
    /// Every batch of texts received
    pub requests: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A translator whose every request fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    fn service_id(&self) -> &str {
        "scripted"
    }

    async fn translate(&self, texts: &[String], options: &TranslateOptions) -> Result<Vec<String>> {
        self.requests.lock().unwrap().push(texts.to_vec());
        if let Some(message) = &self.failure {
            return Err(Error::Translation {
                message: message.clone(),
            });
        }
        Ok(texts
            .iter()
            .map(|text| format!("{}:{text}", options.target_locale))
            .collect())
    }
}

/// Credential prompt with an optional saved key and a fixed answer.
/// Records the `multiple` flag of every prompt.
#[derive(Debug, Default)]
pub struct ScriptedCredentials {
    saved: Option<String>,
    answer: Option<String>,
    pub prompts: Mutex<Vec<bool>>,
}

impl ScriptedCredentials {
    /// A key is already saved; the user is never prompted
    pub fn saved(key: &str) -> Self {
        Self {
            saved: Some(key.to_string()),
            ..Self::default()
        }
    }

    /// The user types `key` when prompted
    pub fn answering(key: &str) -> Self {
        Self {
            answer: Some(key.to_string()),
            ..Self::default()
        }
    }

    /// The user dismisses the prompt
    pub fn cancelling() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialPrompt for ScriptedCredentials {
    fn saved_api_key(&self, _service_id: &str) -> Option<String> {
        self.saved.clone()
    }

    async fn prompt_api_key(&self, _service_id: &str, multiple: bool) -> Option<String> {
        self.prompts.lock().unwrap().push(multiple);
        self.answer.clone()
    }
}

/// Backend applying commits to a directory and recording them
#[derive(Debug)]
pub struct RecordingBackend {
    root: Option<PathBuf>,
    pub commits: Mutex<Vec<(CommitType, Vec<FileChange>)>>,
}

impl RecordingBackend {
    /// Record commits without touching any files
    pub fn new() -> Self {
        Self {
            root: None,
            commits: Mutex::new(Vec::new()),
        }
    }

    /// Also apply every change below `root`
    pub fn writing_to(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            commits: Mutex::new(Vec::new()),
        }
    }

    pub fn commit_count(&self) -> usize {
        self.commits.lock().unwrap().len()
    }

    fn apply(&self, change: &FileChange) -> Result<()> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        let io_error = |e: std::io::Error| Error::Backend {
            message: format!("{}: {e}", change.path),
        };
        let target = root.join(&change.path);

        match change.action {
            ChangeAction::Delete => fs::remove_file(&target).map_err(io_error),
            ChangeAction::Create | ChangeAction::Update | ChangeAction::Move => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(io_error)?;
                }
                if let Some(previous) = &change.previous_path {
                    fs::rename(root.join(previous), &target).map_err(io_error)?;
                }
                match &change.data {
                    Some(FileData::Text(text)) => fs::write(&target, text).map_err(io_error),
                    Some(FileData::Binary(bytes)) => fs::write(&target, bytes).map_err(io_error),
                    None => Ok(()),
                }
            }
        }
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn commit_changes(
        &self,
        changes: &[FileChange],
        commit_type: CommitType,
    ) -> Result<Vec<CommitResult>> {
        for change in changes {
            self.apply(change)?;
        }
        let count = {
            let mut commits = self.commits.lock().unwrap();
            commits.push((commit_type, changes.to_vec()));
            commits.len()
        };
        Ok(changes
            .iter()
            .filter(|change| change.action != ChangeAction::Delete)
            .map(|change| CommitResult {
                path: change.path.clone(),
                sha: format!("commit{count}-{}", change.path),
            })
            .collect())
    }
}
