//! Error taxonomy for the reviewer pipeline.

/// Failure of a single commit-history query.
///
/// These never abort a run: the aggregator logs them and drops the file's
/// contribution to the tally.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history query for {path} failed: {reason}")]
    Query { path: String, reason: String },

    #[error("history transport unavailable: {0}")]
    Transport(String),
}

/// Fatal pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum ReviewerError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("changed files unavailable: {0}")]
    SourceUnavailable(String),

    #[error("failed to publish recommendation: {0}")]
    PublishFailed(String),

    #[error("git error: {0}")]
    GitError(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<regex::Error> for ReviewerError {
    fn from(err: regex::Error) -> Self {
        ReviewerError::Configuration(err.to_string())
    }
}

impl From<reqwest::Error> for ReviewerError {
    fn from(err: reqwest::Error) -> Self {
        ReviewerError::Http(err.to_string())
    }
}

/// Result type for reviewer pipeline operations.
pub type Result<T> = std::result::Result<T, ReviewerError>;
