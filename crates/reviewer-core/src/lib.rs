//! Reviewer Core Library
//!
//! Suggests reviewers for a pull request from the commit history of the
//! files it changes:
//! - `selector`: exclusion-pattern filtering of changed files, capped at 3
//! - `aggregator`: concurrent per-file history queries tallied per author
//! - `ranker`: blacklist exclusion, ordering and truncation
//! - `orchestrator`: the end-to-end run and message formatting
//!
//! Collaborators are reached through the traits in `ports`; `git` and
//! `github` provide concrete backends, `fakes` in-memory ones.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod fakes;
pub mod git;
pub mod github;
pub mod obs;
pub mod orchestrator;
pub mod ports;
pub mod ranker;
pub mod selector;
pub mod telemetry;

pub use aggregator::{aggregate, AuthorTally};
pub use config::ReviewerConfig;
pub use error::{HistoryError, Result, ReviewerError};
pub use git::{configured_user_email, is_git_repo, GitDiffSource, GitHistory};
pub use github::{GitHubClient, GitHubConfig};
pub use orchestrator::{format_recommendation, ReviewerRecommender, MENTION_MARKER};
pub use ports::{
    Commit, CommentSink, CommitHistoryPort, DiffSource, PullRequestContext, PullRequestInfo,
    StdoutSink,
};
pub use ranker::{
    excluded_authors, rank, ranked_candidates, RankedCandidate, DEFAULT_MAX_REVIEWERS,
};
pub use selector::{select_files, FileSelector, MAX_ANALYZED_FILES};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
