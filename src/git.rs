//! Read-only git queries and working-tree classification.
//!
//! Every query here degrades to an empty result on failure (git missing,
//! timeout, not a repository). The stop gate must never fail because git
//! misbehaved.

use crate::traits::CommandRunner;
use std::path::Path;
use std::time::Duration;

/// Timeout applied to every git invocation.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Classification of the working directory's relationship to git.
///
/// A linked worktree shares object storage with a main repository; its `.git`
/// entry is a pointer file rather than a directory. The stop gate only ever
/// acts on linked worktrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    /// No `.git` entry at the directory root.
    NotARepo,
    /// `.git` is a directory: the main checkout.
    MainRepo,
    /// `.git` is a file: a linked worktree.
    LinkedWorktree,
    /// `.git` exists but is neither file nor directory.
    Unrecognized,
}

/// Classify a directory by inspecting its `.git` entry.
#[must_use]
pub fn classify_repo(dir: &Path) -> RepoKind {
    let marker = dir.join(".git");
    match std::fs::metadata(&marker) {
        Err(_) => RepoKind::NotARepo,
        Ok(meta) if meta.is_dir() => RepoKind::MainRepo,
        Ok(meta) if meta.is_file() => RepoKind::LinkedWorktree,
        Ok(_) => RepoKind::Unrecognized,
    }
}

/// Run a git query and return its trimmed stdout, or an empty string on any
/// failure.
fn query(runner: &dyn CommandRunner, args: &[&str]) -> String {
    runner
        .run("git", args, Some(GIT_TIMEOUT))
        .map(|o| o.stdout_if_success().to_string())
        .unwrap_or_default()
}

/// Split a newline-separated file list into entries.
fn split_files(output: &str) -> Vec<String> {
    output.lines().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

/// List untracked files.
#[must_use]
pub fn untracked_files(runner: &dyn CommandRunner) -> Vec<String> {
    split_files(&query(runner, &["ls-files", "--others", "--exclude-standard"]))
}

/// List files with unstaged modifications.
#[must_use]
pub fn modified_files(runner: &dyn CommandRunner) -> Vec<String> {
    split_files(&query(runner, &["diff", "--name-only"]))
}

/// List staged files.
#[must_use]
pub fn staged_files(runner: &dyn CommandRunner) -> Vec<String> {
    split_files(&query(runner, &["diff", "--cached", "--name-only"]))
}

/// Get the current branch name, or an empty string if it cannot be
/// determined (detached head, not a repository, git missing).
#[must_use]
pub fn current_branch(runner: &dyn CommandRunner) -> String {
    let branch = query(runner, &["rev-parse", "--abbrev-ref", "HEAD"]);
    if branch == "HEAD" {
        String::new()
    } else {
        branch
    }
}

/// Get a short summary of recent commits.
#[must_use]
pub fn recent_commits(runner: &dyn CommandRunner) -> String {
    query(runner, &["log", "--oneline", "-10"])
}

/// Snapshot of the working tree taken for the status report.
#[derive(Debug, Clone, Default)]
pub struct WorktreeSnapshot {
    /// Untracked files.
    pub untracked: Vec<String>,
    /// Files with unstaged modifications.
    pub modified: Vec<String>,
    /// Staged files.
    pub staged: Vec<String>,
    /// Current branch name (may be empty).
    pub branch: String,
    /// Recent commit summaries (may be empty).
    pub recent_commits: String,
}

impl WorktreeSnapshot {
    /// Collect a full snapshot via the given runner.
    #[must_use]
    pub fn collect(runner: &dyn CommandRunner) -> Self {
        Self {
            untracked: untracked_files(runner),
            modified: modified_files(runner),
            staged: staged_files(runner),
            branch: current_branch(runner),
            recent_commits: recent_commits(runner),
        }
    }

    /// True iff there are no untracked, modified, or staged files.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.untracked.is_empty() && self.modified.is_empty() && self.staged.is_empty()
    }

    /// Render the uncommitted files as an annotated markdown list.
    #[must_use]
    pub fn files_list(&self) -> String {
        let mut lines = Vec::new();
        for f in &self.untracked {
            lines.push(format!("  - [untracked] {f}"));
        }
        for f in &self.modified {
            lines.push(format!("  - [modified] {f}"));
        }
        for f in &self.staged {
            lines.push(format!("  - [staged] {f}"));
        }
        if lines.is_empty() {
            "  (none)".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Check whether the working tree is clean (no untracked, modified, or
/// staged files).
#[must_use]
pub fn is_clean(runner: &dyn CommandRunner) -> bool {
    untracked_files(runner).is_empty()
        && modified_files(runner).is_empty()
        && staged_files(runner).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingCommandRunner, MockCommandRunner};
    use crate::traits::CommandOutput;
    use tempfile::TempDir;

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput { exit_code: 0, stdout: stdout.to_string(), stderr: String::new() }
    }

    fn fail() -> CommandOutput {
        CommandOutput { exit_code: 128, stdout: String::new(), stderr: "fatal".to_string() }
    }

    #[test]
    fn test_classify_repo_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(classify_repo(dir.path()), RepoKind::NotARepo);
    }

    #[test]
    fn test_classify_repo_main() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(classify_repo(dir.path()), RepoKind::MainRepo);
    }

    #[test]
    fn test_classify_repo_linked_worktree() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".git"), "gitdir: /repo/.git/worktrees/task\n").unwrap();
        assert_eq!(classify_repo(dir.path()), RepoKind::LinkedWorktree);
    }

    #[test]
    fn test_untracked_files() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["ls-files", "--others", "--exclude-standard"], ok("a.txt\nb.txt\n"));
        assert_eq!(untracked_files(&runner), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_modified_files_failure_is_empty() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["diff", "--name-only"], fail());
        assert!(modified_files(&runner).is_empty());
    }

    #[test]
    fn test_staged_files() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["diff", "--cached", "--name-only"], ok("src/lib.rs\n"));
        assert_eq!(staged_files(&runner), vec!["src/lib.rs"]);
    }

    #[test]
    fn test_current_branch() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["rev-parse", "--abbrev-ref", "HEAD"], ok("feature/task\n"));
        assert_eq!(current_branch(&runner), "feature/task");
    }

    #[test]
    fn test_current_branch_detached_head() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["rev-parse", "--abbrev-ref", "HEAD"], ok("HEAD\n"));
        assert_eq!(current_branch(&runner), "");
    }

    #[test]
    fn test_recent_commits() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["log", "--oneline", "-10"], ok("abc123 first\n"));
        assert_eq!(recent_commits(&runner), "abc123 first");
    }

    #[test]
    fn test_queries_degrade_when_runner_fails() {
        let runner = FailingCommandRunner::new("git not installed");
        assert!(untracked_files(&runner).is_empty());
        assert!(modified_files(&runner).is_empty());
        assert!(staged_files(&runner).is_empty());
        assert_eq!(current_branch(&runner), "");
        assert_eq!(recent_commits(&runner), "");
    }

    #[test]
    fn test_is_clean_true() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["ls-files", "--others", "--exclude-standard"], ok(""));
        runner.expect("git", &["diff", "--name-only"], ok(""));
        runner.expect("git", &["diff", "--cached", "--name-only"], ok(""));
        assert!(is_clean(&runner));
        runner.verify();
    }

    #[test]
    fn test_is_clean_false_with_untracked() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["ls-files", "--others", "--exclude-standard"], ok("junk.log\n"));
        runner.expect("git", &["diff", "--name-only"], ok(""));
        runner.expect("git", &["diff", "--cached", "--name-only"], ok(""));
        assert!(!is_clean(&runner));
    }

    #[test]
    fn test_snapshot_collect_and_files_list() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["ls-files", "--others", "--exclude-standard"], ok("new.txt\n"));
        runner.expect("git", &["diff", "--name-only"], ok("src/main.rs\n"));
        runner.expect("git", &["diff", "--cached", "--name-only"], ok(""));
        runner.expect("git", &["rev-parse", "--abbrev-ref", "HEAD"], ok("feature/x\n"));
        runner.expect("git", &["log", "--oneline", "-10"], ok("abc123 wip\n"));

        let snapshot = WorktreeSnapshot::collect(&runner);
        assert!(!snapshot.is_clean());
        assert_eq!(snapshot.branch, "feature/x");
        let list = snapshot.files_list();
        assert!(list.contains("[untracked] new.txt"));
        assert!(list.contains("[modified] src/main.rs"));
        assert!(!list.contains("[staged]"));
        runner.verify();
    }

    #[test]
    fn test_snapshot_files_list_empty() {
        let snapshot = WorktreeSnapshot::default();
        assert_eq!(snapshot.files_list(), "  (none)");
        assert!(snapshot.is_clean());
    }
}
