//! In-memory fakes for the collaborator traits (testing only)
//!
//! Provides `StaticDiffSource`, `MemoryCommitHistory`, and `RecordingSink`
//! that satisfy the port contracts without git or network access.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{HistoryError, Result, ReviewerError};
use crate::ports::*;

// ---------------------------------------------------------------------------
// StaticDiffSource
// ---------------------------------------------------------------------------

/// Diff source returning a fixed file list, or a fixed failure.
#[derive(Debug, Clone, Default)]
pub struct StaticDiffSource {
    files: Vec<String>,
    unavailable: bool,
}

impl StaticDiffSource {
    pub fn new<S: AsRef<str>>(files: &[S]) -> Self {
        Self {
            files: files.iter().map(|f| f.as_ref().to_string()).collect(),
            unavailable: false,
        }
    }

    /// A source that always fails.
    pub fn unavailable() -> Self {
        Self {
            files: Vec::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl DiffSource for StaticDiffSource {
    async fn list_changed_files(&self) -> Result<Vec<String>> {
        if self.unavailable {
            return Err(ReviewerError::SourceUnavailable(
                "static diff source configured to fail".to_string(),
            ));
        }
        Ok(self.files.clone())
    }
}

// ---------------------------------------------------------------------------
// MemoryCommitHistory
// ---------------------------------------------------------------------------

/// A recorded `query_commits` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCall {
    pub repo_slug: String,
    pub branch: String,
    pub path: String,
}

/// Commit history keyed by `(branch, path)`.
///
/// Unknown paths return no commits. Paths registered with
/// [`with_failure`](Self::with_failure) fail on every branch.
#[derive(Debug, Default)]
pub struct MemoryCommitHistory {
    commits: HashMap<(String, String), Vec<Commit>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<HistoryCall>>,
}

impl MemoryCommitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append commits for `path` on `branch`, one per author entry.
    pub fn with_commits(mut self, branch: &str, path: &str, authors: &[Option<&str>]) -> Self {
        let entry = self
            .commits
            .entry((branch.to_string(), path.to_string()))
            .or_default();
        for author in authors {
            let sha = format!("{:040x}", entry.len() + 1);
            entry.push(Commit::new(sha, *author));
        }
        self
    }

    /// Make every query for `path` fail.
    pub fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Invocations so far, in call order.
    pub fn calls(&self) -> Vec<HistoryCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommitHistoryPort for MemoryCommitHistory {
    async fn query_commits(
        &self,
        repo_slug: &str,
        branch: &str,
        path: &str,
    ) -> std::result::Result<Vec<Commit>, HistoryError> {
        self.calls.lock().unwrap().push(HistoryCall {
            repo_slug: repo_slug.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        });

        if self.failing.contains(path) {
            return Err(HistoryError::Query {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        Ok(self
            .commits
            .get(&(branch.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Comment sink that keeps every published message.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
    reject: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `publish` always fails.
    pub fn rejecting() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentSink for RecordingSink {
    async fn publish(&self, message: &str) -> Result<()> {
        if self.reject {
            return Err(ReviewerError::PublishFailed(
                "recording sink configured to reject".to_string(),
            ));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
