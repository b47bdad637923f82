//! Collaborator traits for the reviewer pipeline
//!
//! These traits are the only way the pipeline touches the outside world:
//! - `DiffSource`: changed file paths of the pull request
//! - `CommitHistoryPort`: commits touching a path on a branch
//! - `CommentSink`: where the final recommendation goes
//! - `PullRequestContext`: read-only facts about the pull request
//!
//! Git CLI and GitHub REST implementations live in `git` and `github`;
//! in-memory fakes for testing live in `fakes`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A commit as seen by the history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA.
    pub sha: String,
    /// Author identifier (login or email). `None` when the history source
    /// could not attribute the commit to anyone.
    pub author: Option<String>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, author: Option<&str>) -> Self {
        Self {
            sha: sha.into(),
            author: author.map(str::to_string),
        }
    }

    /// Author identifier, treating blank identities as absent.
    pub fn author(&self) -> Option<&str> {
        self.author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Pull request context
// ---------------------------------------------------------------------------

/// Read-only facts about the pull request under review.
pub trait PullRequestContext: Send + Sync {
    /// Identifier of the user who opened the pull request.
    fn author_identifier(&self) -> &str;

    /// Repository slug, e.g. `owner/name`.
    fn repository_slug(&self) -> &str;

    /// Branch the pull request merges into.
    fn target_branch(&self) -> &str;
}

/// Plain-data pull request context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub author: String,
    pub repo_slug: String,
    pub target_branch: String,
}

impl PullRequestInfo {
    pub fn new(
        author: impl Into<String>,
        repo_slug: impl Into<String>,
        target_branch: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            repo_slug: repo_slug.into(),
            target_branch: target_branch.into(),
        }
    }
}

impl PullRequestContext for PullRequestInfo {
    fn author_identifier(&self) -> &str {
        &self.author
    }

    fn repository_slug(&self) -> &str {
        &self.repo_slug
    }

    fn target_branch(&self) -> &str {
        &self.target_branch
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Source of the pull request's changed files.
///
/// Any error is fatal to the run.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Changed file paths in diff order.
    async fn list_changed_files(&self) -> Result<Vec<String>>;
}

/// Commit history lookup for a single path.
///
/// Called once per selected file, possibly concurrently.
#[async_trait]
pub trait CommitHistoryPort: Send + Sync {
    /// Commits touching `path` on `branch` of `repo_slug`, newest first.
    async fn query_commits(
        &self,
        repo_slug: &str,
        branch: &str,
        path: &str,
    ) -> std::result::Result<Vec<Commit>, HistoryError>;
}

/// Destination of the formatted recommendation.
#[async_trait]
pub trait CommentSink: Send + Sync {
    /// Publish the message. Called at most once per run.
    async fn publish(&self, message: &str) -> Result<()>;
}

/// Prints the recommendation to stdout instead of posting it anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl CommentSink for StdoutSink {
    async fn publish(&self, message: &str) -> Result<()> {
        println!("{message}");
        Ok(())
    }
}
