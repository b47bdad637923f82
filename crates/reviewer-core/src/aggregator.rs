//! Per-author commit tallies over the selected files.
//!
//! History queries for the selected files run concurrently. Each result is
//! merged into the tally only once its query has completed, by a single
//! writer loop in selection order. A failed query costs that file's
//! contribution and nothing else.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::obs;
use crate::ports::{Commit, CommitHistoryPort, PullRequestContext};

/// Author identifier → number of commits touching the selected files.
///
/// Counts only grow; there is no way to decrement or reset an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorTally {
    counts: BTreeMap<String, u64>,
}

impl AuthorTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-increment.
    pub fn record(&mut self, author: &str) {
        *self.counts.entry(author.to_string()).or_insert(0) += 1;
    }

    /// Tally every attributable commit; returns how many were counted.
    pub fn record_commits(&mut self, commits: &[Commit]) -> usize {
        let mut counted = 0;
        for author in commits.iter().filter_map(Commit::author) {
            self.record(author);
            counted += 1;
        }
        counted
    }

    pub fn get(&self, author: &str) -> u64 {
        self.counts.get(author).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in author-identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(a, c)| (a.as_str(), *c))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for AuthorTally {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for (author, count) in iter {
            *counts.entry(author.into()).or_insert(0) += count;
        }
        Self { counts }
    }
}

/// Query history for each file against the pull request's target branch and
/// tally commits per author.
pub async fn aggregate<S: AsRef<str>>(
    files: &[S],
    history: &dyn CommitHistoryPort,
    pr: &dyn PullRequestContext,
) -> AuthorTally {
    let slug = pr.repository_slug();
    let branch = pr.target_branch();

    let queries = files.iter().map(|file| {
        let path = file.as_ref();
        async move { (path, history.query_commits(slug, branch, path).await) }
    });
    let results = join_all(queries).await;

    let mut tally = AuthorTally::new();
    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(commits) => {
                let counted = tally.record_commits(&commits);
                debug!(
                    path = %path,
                    commits = commits.len(),
                    attributed = counted,
                    "Merged file history"
                );
            }
            Err(e) => {
                failed += 1;
                obs::emit_history_query_failed(path, &e);
            }
        }
    }

    if failed > 0 && failed == files.len() {
        warn!(files = failed, "History unavailable for every selected file");
    }

    tally
}
