use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Read-only repository queries used by the rules.
/// Every query degrades to an empty value when git is unavailable.
pub trait Vcs {
    /// Name of the checked-out branch, empty when detached or unknown
    fn current_branch(&self) -> String;
    /// Commits on HEAD that are not on `reference`
    fn commits_ahead(&self, reference: &str) -> u64;
    /// Lines of `git status --porcelain`
    fn status_lines(&self) -> Vec<String>;
    /// Unix timestamp of the last commit on `branch`
    fn last_commit_time(&self, branch: &str) -> Option<i64>;
    /// Paths with unstaged modifications
    fn changed_files(&self) -> Vec<String>;

    fn uncommitted_count(&self) -> usize {
        self.status_lines().len()
    }
}

/// Shells out to the git binary in a fixed directory
#[derive(Debug, Clone)]
pub struct Git {
    cwd: PathBuf,
    timeout: Duration,
}

impl Git {
    pub fn new(cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            cwd: cwd.into(),
            timeout,
        }
    }

    /// Run git with the given arguments and return trimmed stdout.
    /// Any failure, including a timeout, yields an empty string.
    pub fn run(&self, args: &[&str]) -> String {
        match run_with_timeout(&self.cwd, args, self.timeout) {
            Some(out) => out.trim().to_string(),
            None => {
                tracing::debug!(args = ?args, "git query produced no data");
                String::new()
            }
        }
    }

    /// Top level of the working tree containing cwd
    pub fn toplevel(&self) -> Option<PathBuf> {
        let root = self.run(&["rev-parse", "--show-toplevel"]);
        if root.is_empty() {
            None
        } else {
            Some(PathBuf::from(root))
        }
    }
}

impl Vcs for Git {
    fn current_branch(&self) -> String {
        self.run(&["branch", "--show-current"])
    }

    fn commits_ahead(&self, reference: &str) -> u64 {
        let range = format!("{}..HEAD", reference);
        self.run(&["rev-list", "--count", &range])
            .parse()
            .unwrap_or(0)
    }

    fn status_lines(&self) -> Vec<String> {
        non_empty_lines(&self.run(&["status", "--porcelain"]))
    }

    fn last_commit_time(&self, branch: &str) -> Option<i64> {
        if branch.is_empty() {
            return None;
        }
        self.run(&["log", "-1", "--format=%ct", branch]).parse().ok()
    }

    fn changed_files(&self) -> Vec<String> {
        non_empty_lines(&self.run(&["diff", "--name-only"]))
    }
}

fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect()
}

/// Spawn git, poll until it exits or the deadline passes, and collect stdout.
/// Returns None on spawn failure, timeout, non-zero exit or non-UTF-8 output.
fn run_with_timeout(cwd: &Path, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    // Drain stdout on a separate thread so a large output cannot fill the pipe
    let stdout_handle = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            buf
        })
    });

    let succeeded = wait_with_deadline(&mut child, timeout);
    let stdout = stdout_handle.and_then(|h| h.join().ok()).unwrap_or_default();

    if !succeeded {
        return None;
    }
    String::from_utf8(stdout).ok()
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return status.success(),
            Ok(None) => {}
            Err(_) => return false,
        }

        if start.elapsed() >= timeout {
            tracing::warn!(?timeout, "git query timed out");
            let _ = child.kill();
            let _ = child.wait();
            return false;
        }

        thread::sleep(Duration::from_millis(10));
    }
}

/// Fixed answers for rule tests
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct FakeVcs {
    pub branch: String,
    pub ahead: u64,
    pub status: Vec<String>,
    pub last_commit: Option<i64>,
    pub changed: Vec<String>,
}

#[cfg(test)]
impl Vcs for FakeVcs {
    fn current_branch(&self) -> String {
        self.branch.clone()
    }

    fn commits_ahead(&self, _reference: &str) -> u64 {
        self.ahead
    }

    fn status_lines(&self) -> Vec<String> {
        self.status.clone()
    }

    fn last_commit_time(&self, _branch: &str) -> Option<i64> {
        self.last_commit
    }

    fn changed_files(&self) -> Vec<String> {
        self.changed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_missing_directory_yields_empty() {
        let git = Git::new("/nonexistent/hookrule/dir", Duration::from_secs(5));
        assert_eq!(git.current_branch(), "");
        assert_eq!(git.commits_ahead("main"), 0);
        assert!(git.status_lines().is_empty());
        assert!(git.changed_files().is_empty());
        assert!(git.last_commit_time("main").is_none());
        assert!(git.toplevel().is_none());
    }

    #[test]
    fn test_outside_repository_yields_empty() {
        let temp = TempDir::new().unwrap();
        let git = Git::new(temp.path(), Duration::from_secs(5));
        assert!(git.status_lines().is_empty());
        assert_eq!(git.uncommitted_count(), 0);
    }

    #[test]
    fn test_status_counts_untracked_files() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let git = Git::new(temp.path(), Duration::from_secs(5));
        git.run(&["init", "-q"]);
        std::fs::write(temp.path().join("a.ts"), "").unwrap();
        std::fs::write(temp.path().join("b.ts"), "").unwrap();

        assert_eq!(git.uncommitted_count(), 2);
        assert!(git.toplevel().is_some());
    }

    #[test]
    fn test_empty_branch_has_no_commit_time() {
        let git = Git::new("/tmp", Duration::from_secs(5));
        assert!(git.last_commit_time("").is_none());
    }

    #[test]
    fn test_non_empty_lines() {
        assert_eq!(
            non_empty_lines("a\n\n b\n"),
            vec!["a".to_string(), " b".to_string()]
        );
        assert!(non_empty_lines("").is_empty());
    }
}
