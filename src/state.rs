use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub const COMMIT_REMINDER_FILE: &str = "claude-commit-reminder-state.json";
pub const PR_READINESS_FILE: &str = "claude-pr-readiness-state.json";

/// A flat JSON record persisted between hook invocations.
///
/// Updates are plain read-modify-write with no locking: two hooks running at
/// once for the same record race, and the last save wins.
#[derive(Debug, Clone)]
pub struct StateFile<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T> StateFile<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, substituting defaults when it is missing or unreadable
    pub fn load(&self) -> T {
        match self.try_load() {
            Ok(Some(record)) => record,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "discarding unreadable state");
                T::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state: {}", self.path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state: {}", self.path.display()))?;
        Ok(Some(record))
    }

    /// Persist the record. Failures are logged and otherwise ignored.
    pub fn save(&self, record: &T) {
        if let Err(e) = self.try_save(record) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to save state");
        }
    }

    fn try_save(&self, record: &T) -> Result<()> {
        let json = serde_json::to_string(record)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state: {}", self.path.display()))
    }

    /// Delete the record. A missing record is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove state: {}", self.path.display()))
            }
        }
    }
}

/// Edit tracking for the commit reminder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditCounter {
    pub edit_count: u64,
    pub files_edited: Vec<String>,
    pub last_reminded: u64,
}

impl EditCounter {
    /// Count one edit of `path`, tracking the path once
    pub fn record(&mut self, path: &str) {
        self.edit_count = self.edit_count.saturating_add(1);
        if !self.files_edited.iter().any(|f| f == path) {
            self.files_edited.push(path.to_string());
        }
    }

    pub fn since_reminder(&self) -> u64 {
        self.edit_count.saturating_sub(self.last_reminded)
    }

    pub fn mark_reminded(&mut self) {
        self.last_reminded = self.edit_count;
    }

    /// The most recently first-seen `n` paths, oldest first
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.files_edited.len().saturating_sub(n);
        &self.files_edited[start..]
    }
}

/// Whether a pull request has been suggested for this record's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionState {
    pub pr_suggested: bool,
    pub suggestion_count: u64,
}

impl SuggestionState {
    pub fn mark_suggested(&mut self) {
        self.pr_suggested = true;
        self.suggestion_count = self.suggestion_count.saturating_add(1);
    }
}
