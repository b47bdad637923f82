//! Structured observability hooks for recommendation runs.
//!
//! This module provides:
//! - A run-scoped tracing span
//! - Emission functions for the pipeline's lifecycle events
//!
//! Filter with `RUST_LOG`, e.g. `RUST_LOG=reviewer_core=debug`.

use tracing::{info, warn, Span};

use crate::error::HistoryError;

/// Span covering one run, tagged with the run id and repository slug.
///
/// Attach it to the run future with `tracing::Instrument` rather than
/// entering it, since the run suspends across history queries.
pub fn run_span(run_id: &str, repo_slug: &str) -> Span {
    tracing::info_span!("reviewers.run", run_id = %run_id, repo = %repo_slug)
}

/// Emit event: run started.
pub fn emit_run_started(repo_slug: &str, target_branch: &str, pr_author: &str) {
    info!(
        event = "run.started",
        repo = %repo_slug,
        branch = %target_branch,
        pr_author = %pr_author,
    );
}

/// Emit event: changed files filtered down to the analysed set.
pub fn emit_files_selected(changed: usize, selected: &[String]) {
    info!(
        event = "files.selected",
        changed = changed,
        selected = selected.len(),
        files = ?selected,
    );
}

/// Emit event: history query for one file failed (warning level).
pub fn emit_history_query_failed(path: &str, error: &HistoryError) {
    warn!(event = "history.query_failed", path = %path, error = %error);
}

/// Emit event: candidates ranked.
pub fn emit_candidates_ranked(authors_seen: usize, reviewers: &[String]) {
    info!(
        event = "candidates.ranked",
        authors_seen = authors_seen,
        reviewers = ?reviewers,
    );
}

/// Emit event: run finished.
pub fn emit_run_finished(duration_ms: u64, published: bool) {
    info!(
        event = "run.finished",
        duration_ms = duration_ms,
        published = published,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let span = run_span("test-run-id", "acme/widgets");
        let _entered = span.enter();
        emit_run_finished(0, false);
    }
}
