//! Git CLI backend.
//!
//! `GitDiffSource` lists files changed between two revisions and
//! `GitHistory` answers per-path history queries from a local clone. The
//! repository slug passed to history queries is ignored: the clone is the
//! repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{HistoryError, Result, ReviewerError};
use crate::ports::{Commit, CommitHistoryPort, DiffSource};

/// Field separator for `git log --format`; never appears in SHAs or emails.
const FIELD_SEP: char = '\x1f';

async fn git_output(repo_dir: &Path, args: &[&str]) -> std::io::Result<std::process::Output> {
    Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .await
}

/// Run git and return trimmed stdout, mapping every failure to `GitError`.
async fn run_git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let output = git_output(repo_dir, args)
        .await
        .map_err(|e| ReviewerError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReviewerError::GitError(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Check whether a directory is inside a git work tree.
pub async fn is_git_repo(dir: &Path) -> bool {
    git_output(dir, &["rev-parse", "--is-inside-work-tree"])
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Email configured as `user.email` for the repository.
pub async fn configured_user_email(repo_dir: &Path) -> Result<String> {
    let email = run_git(repo_dir, &["config", "user.email"]).await?;
    if email.is_empty() {
        return Err(ReviewerError::GitError(
            "git config user.email is empty".to_string(),
        ));
    }
    Ok(email)
}

/// Reject revisions git would parse as options.
fn check_revision(rev: &str) -> std::result::Result<(), String> {
    if rev.is_empty() {
        return Err("revision must not be empty".to_string());
    }
    if rev.starts_with('-') {
        return Err(format!("revision '{rev}' must not start with '-'"));
    }
    Ok(())
}

/// Files changed on `head` since it diverged from `base`.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    repo_dir: PathBuf,
    base: String,
    head: String,
}

impl GitDiffSource {
    pub fn new(repo_dir: impl Into<PathBuf>, base: &str, head: &str) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            base: base.to_string(),
            head: head.to_string(),
        }
    }
}

#[async_trait]
impl DiffSource for GitDiffSource {
    async fn list_changed_files(&self) -> Result<Vec<String>> {
        check_revision(&self.base)
            .and_then(|_| check_revision(&self.head))
            .map_err(ReviewerError::SourceUnavailable)?;

        let range = format!("{}...{}", self.base, self.head);
        let stdout = run_git(&self.repo_dir, &["diff", "--name-only", &range])
            .await
            .map_err(|e| ReviewerError::SourceUnavailable(e.to_string()))?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Per-path commit history from `git log`, attributed by author email.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_dir: PathBuf,
}

impl GitHistory {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

fn parse_log_line(line: &str) -> Option<Commit> {
    let (sha, email) = line.split_once(FIELD_SEP)?;
    let sha = sha.trim();
    if sha.is_empty() {
        return None;
    }
    Some(Commit::new(sha, Some(email.trim())))
}

#[async_trait]
impl CommitHistoryPort for GitHistory {
    async fn query_commits(
        &self,
        _repo_slug: &str,
        branch: &str,
        path: &str,
    ) -> std::result::Result<Vec<Commit>, HistoryError> {
        check_revision(branch).map_err(|reason| HistoryError::Query {
            path: path.to_string(),
            reason,
        })?;

        let output = git_output(
            &self.repo_dir,
            &["log", "--format=%H%x1f%ae", branch, "--", path],
        )
        .await
        .map_err(|e| HistoryError::Transport(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            return Err(HistoryError::Query {
                path: path.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let commits: Vec<Commit> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(parse_log_line)
            .collect();
        debug!(path = %path, branch = %branch, commits = commits.len(), "git log");
        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn commit_as(repo_dir: &Path, author: &str, file: &str, content: &str) {
        std::fs::write(repo_dir.join(file), content).unwrap();
        run(repo_dir, &["add", file]);
        let author = format!("{author} <{author}@example.com>");
        run(repo_dir, &["commit", "-q", "--author", &author, "-m", "change"]);
    }

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["init", "-q"]);
        run(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run(dir.path(), &["config", "user.name", "test-user"]);
        run(dir.path(), &["config", "user.email", "test@example.com"]);
        run(dir.path(), &["commit", "-q", "--allow-empty", "-m", "initial"]);
        dir
    }

    #[test]
    fn test_parse_log_line() {
        let c = parse_log_line("abc123\x1falice@example.com").unwrap();
        assert_eq!(c.sha, "abc123");
        assert_eq!(c.author(), Some("alice@example.com"));

        let anonymous = parse_log_line("abc123\x1f").unwrap();
        assert_eq!(anonymous.author(), None);

        assert!(parse_log_line("garbage").is_none());
    }

    #[tokio::test]
    async fn test_history_counts_commits_per_path() {
        let repo = make_git_repo();
        commit_as(repo.path(), "alice", "a.rb", "1");
        commit_as(repo.path(), "bob", "a.rb", "2");
        commit_as(repo.path(), "alice", "b.rb", "1");

        let history = GitHistory::new(repo.path());
        let commits = history.query_commits("", "main", "a.rb").await.unwrap();
        let authors: Vec<&str> = commits.iter().filter_map(Commit::author).collect();
        assert_eq!(authors, vec!["bob@example.com", "alice@example.com"]);
    }

    #[tokio::test]
    async fn test_history_unknown_branch_is_query_error() {
        let repo = make_git_repo();
        let history = GitHistory::new(repo.path());
        let err = history
            .query_commits("", "no-such-branch", "a.rb")
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::Query { .. }));
    }

    #[tokio::test]
    async fn test_diff_source_lists_branch_changes() {
        let repo = make_git_repo();
        commit_as(repo.path(), "alice", "base.rb", "1");
        run(repo.path(), &["checkout", "-q", "-b", "feature"]);
        commit_as(repo.path(), "carol", "x.rb", "1");
        commit_as(repo.path(), "carol", "base.rb", "2");

        let source = GitDiffSource::new(repo.path(), "main", "feature");
        let mut files = source.list_changed_files().await.unwrap();
        files.sort();
        assert_eq!(files, vec!["base.rb", "x.rb"]);
    }

    #[tokio::test]
    async fn test_diff_source_outside_repo_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = GitDiffSource::new(dir.path(), "main", "HEAD");
        let err = source.list_changed_files().await.unwrap_err();
        assert!(matches!(err, ReviewerError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_option_like_revisions_are_rejected() {
        let repo = make_git_repo();
        commit_as(repo.path(), "alice", "a.rb", "1");

        let source = GitDiffSource::new(repo.path(), "--output=/tmp/pwned", "HEAD");
        let err = source.list_changed_files().await.unwrap_err();
        assert!(matches!(err, ReviewerError::SourceUnavailable(_)));

        let history = GitHistory::new(repo.path());
        let err = history
            .query_commits("", "--all", "a.rb")
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::Query { .. }));
    }

    #[tokio::test]
    async fn test_is_git_repo() {
        let repo = make_git_repo();
        assert!(is_git_repo(repo.path()).await);
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_git_repo(dir.path()).await);
    }

    #[tokio::test]
    async fn test_configured_user_email() {
        let repo = make_git_repo();
        let email = configured_user_email(repo.path()).await.unwrap();
        assert_eq!(email, "test@example.com");
    }
}
