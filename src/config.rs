use anyhow::{bail, Context, Result};
use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "hookrule.yaml";
const STATE_DIR_ENV: &str = "HOOKRULE_STATE_DIR";

/// Settings for the edit-count commit reminder
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommitReminderConfig {
    /// Edits since the last reminder before reminding again
    pub threshold: u64,
    /// How many recent files the reminder lists
    pub recent_files: usize,
    /// Glob patterns for files that count as edits (matched on path or file name)
    pub tracked_patterns: Vec<String>,
    /// Path fragments that exclude a file from tracking
    pub excluded_dirs: Vec<String>,
}

impl Default for CommitReminderConfig {
    fn default() -> Self {
        Self {
            threshold: 8,
            recent_files: 5,
            tracked_patterns: ["*.ts", "*.tsx", "*.js", "*.jsx", "*.py", "*.json"]
                .map(String::from)
                .to_vec(),
            excluded_dirs: vec!["/.claude/".to_string()],
        }
    }
}

/// Settings for the stop-time pull request suggestion
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrReadinessConfig {
    /// Suggest nothing while more files than this are uncommitted
    pub max_uncommitted: usize,
    /// Branch name fragments that mark a feature branch
    pub feature_prefixes: Vec<String>,
    /// Also require the last assistant message to sound finished
    pub require_completion_signal: bool,
    pub completion_keywords: Vec<String>,
}

impl Default for PrReadinessConfig {
    fn default() -> Self {
        Self {
            max_uncommitted: 3,
            feature_prefixes: ["feature/", "fix/", "feat/", "bugfix/", "issue-", "issue/"]
                .map(String::from)
                .to_vec(),
            require_completion_signal: false,
            completion_keywords: [
                "fixed",
                "implemented",
                "complete",
                "done",
                "finished",
                "added",
                "resolved",
                "working",
                "passes",
                "all tests pass",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionContextConfig {
    pub many_commits: u64,
    pub stale_days: i64,
}

impl Default for SessionContextConfig {
    fn default() -> Self {
        Self {
            many_commits: 10,
            stale_days: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TddReminderConfig {
    /// Regex a path must match to be production source
    pub source_pattern: String,
    pub extensions: Vec<String>,
}

impl Default for TddReminderConfig {
    fn default() -> Self {
        Self {
            source_pattern: "packages/[^/]+/src/".to_string(),
            extensions: [".ts", ".tsx", ".js", ".jsx"].map(String::from).to_vec(),
        }
    }
}

/// Resolved configuration. Every field has a built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Directory holding the counter files
    pub state_dir: PathBuf,
    /// Branch that "commits ahead" is measured against
    pub reference_branch: String,
    pub git_timeout_secs: u64,
    pub commit_reminder: CommitReminderConfig,
    pub pr_readiness: PrReadinessConfig,
    pub session_context: SessionContextConfig,
    pub tdd_reminder: TddReminderConfig,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("/tmp"),
            reference_branch: "main".to_string(),
            git_timeout_secs: 5,
            commit_reminder: CommitReminderConfig::default(),
            pr_readiness: PrReadinessConfig::default(),
            session_context: SessionContextConfig::default(),
            tdd_reminder: TddReminderConfig::default(),
        }
    }
}

impl HookConfig {
    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }

    /// Apply environment overrides on top of file settings
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(STATE_DIR_ENV) {
            if !dir.is_empty() {
                self.state_dir = PathBuf::from(dir);
            }
        }
        self
    }
}

/// Validates a parsed config
fn validate(config: &HookConfig, config_path: &Path) -> Result<()> {
    if config.commit_reminder.threshold == 0 {
        bail!(
            "Invalid config at {}: 'commit_reminder.threshold' must be at least 1",
            config_path.display()
        );
    }
    if config.commit_reminder.recent_files == 0 {
        bail!(
            "Invalid config at {}: 'commit_reminder.recent_files' must be at least 1",
            config_path.display()
        );
    }
    if config.git_timeout_secs == 0 {
        bail!(
            "Invalid config at {}: 'git_timeout_secs' must be at least 1",
            config_path.display()
        );
    }
    for pattern in &config.commit_reminder.tracked_patterns {
        if let Err(e) = Pattern::new(pattern) {
            bail!(
                "Invalid config at {}: bad glob '{}' in 'commit_reminder.tracked_patterns': {}",
                config_path.display(),
                pattern,
                e
            );
        }
    }
    if let Err(e) = Regex::new(&config.tdd_reminder.source_pattern) {
        bail!(
            "Invalid config at {}: bad regex in 'tdd_reminder.source_pattern': {}",
            config_path.display(),
            e
        );
    }
    Ok(())
}

/// Loads and parses a hookrule.yaml config file
pub fn load_config(config_path: &Path) -> Result<HookConfig> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    // An empty file parses as null; treat it as all defaults
    if content.trim().is_empty() {
        return Ok(HookConfig::default());
    }

    let parsed: HookConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    validate(&parsed, config_path)?;
    Ok(parsed)
}

/// Finds the nearest hookrule.yaml by walking up from a directory.
/// Stops at the repository root (does not leave the repo).
/// Invalid files are skipped.
pub fn find_nearest_config(start_dir: &Path, repo_root: &Path) -> Option<HookConfig> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILENAME);

        if config_path.exists() {
            match load_config(&config_path) {
                Ok(config) => return Some(config),
                Err(e) => {
                    tracing::warn!(error = ?e, "skipping config");
                }
            }
        }

        if current == repo_root {
            return None;
        }

        if !current.pop() {
            return None;
        }

        // Safety: don't go above repo root
        if !current.starts_with(repo_root) {
            return None;
        }
    }
}

/// $XDG_CONFIG_HOME/hookrule/config.yaml, falling back to ~/.config
fn user_config_path() -> PathBuf {
    let xdg_config = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });

    xdg_config.join("hookrule").join("config.yaml")
}

fn load_user_config() -> Option<HookConfig> {
    let path = user_config_path();
    if !path.exists() {
        return None;
    }
    match load_config(&path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(error = ?e, "skipping user config");
            None
        }
    }
}

/// Resolve the configuration for a hook running in `cwd`.
/// Project file first, then user file, then defaults; env overrides apply last.
pub fn resolve(cwd: &Path, repo_root: Option<&Path>) -> HookConfig {
    let project = repo_root.and_then(|root| find_nearest_config(cwd, root));
    project
        .or_else(load_user_config)
        .unwrap_or_default()
        .with_env_overrides()
}
