//! Caller-supplied recommendation settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ranker::DEFAULT_MAX_REVIEWERS;

/// Settings for one recommendation run.
///
/// Every field is optional in serialized form:
///
/// ```json
/// { "max_reviewers": 2, "file_blacklist": ["^Pods/"], "user_blacklist": ["ci-bot"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerConfig {
    /// Upper bound on suggested reviewers. Non-positive values suggest nobody.
    pub max_reviewers: i64,
    /// Regular expressions; matching changed files are not analysed.
    pub file_blacklist: Vec<String>,
    /// Author identifiers never suggested.
    pub user_blacklist: Vec<String>,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            max_reviewers: DEFAULT_MAX_REVIEWERS,
            file_blacklist: Vec::new(),
            user_blacklist: Vec::new(),
        }
    }
}

impl ReviewerConfig {
    /// Load settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_max_reviewers(mut self, max: i64) -> Self {
        self.max_reviewers = max;
        self
    }

    pub fn with_file_blacklist<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_blacklist.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_user_blacklist<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_blacklist.extend(users.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewerError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ReviewerConfig::default();
        assert_eq!(config.max_reviewers, 3);
        assert!(config.file_blacklist.is_empty());
        assert!(config.user_blacklist.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ReviewerConfig =
            serde_json::from_str(r#"{"user_blacklist":["ci-bot"]}"#).unwrap();
        assert_eq!(config.max_reviewers, 3);
        assert_eq!(config.user_blacklist, vec!["ci-bot"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"max_reviewers": 1, "file_blacklist": ["^Pods/"]}}"#
        )
        .unwrap();

        let config = ReviewerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_reviewers, 1);
        assert_eq!(config.file_blacklist, vec!["^Pods/"]);
    }

    #[test]
    fn test_from_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "max_reviewers = 1").unwrap();

        let err = ReviewerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ReviewerError::Serialization(_)));
    }

    #[test]
    fn test_builders_extend() {
        let config = ReviewerConfig::default()
            .with_max_reviewers(5)
            .with_file_blacklist(["\\.lock$"])
            .with_user_blacklist(vec!["bot".to_string()]);
        assert_eq!(config.max_reviewers, 5);
        assert_eq!(config.file_blacklist, vec!["\\.lock$"]);
        assert_eq!(config.user_blacklist, vec!["bot"]);
    }
}
