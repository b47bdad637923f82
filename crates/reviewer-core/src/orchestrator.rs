//! Recommendation run orchestration.
//!
//! One pass per invocation: compile the file exclusion policy, list changed
//! files, select, tally history, rank, and publish a single comment when at
//! least one candidate remains.

use std::time::Instant;

use tracing::{info, Instrument};

use crate::aggregator::aggregate;
use crate::config::ReviewerConfig;
use crate::error::{Result, ReviewerError};
use crate::obs;
use crate::ports::{CommentSink, CommitHistoryPort, DiffSource, PullRequestContext};
use crate::ranker::rank;
use crate::selector::FileSelector;

/// Prefix placed before each suggested reviewer.
pub const MENTION_MARKER: &str = "@";

/// Render the recommendation sentence.
///
/// Returns `None` for an empty reviewer list.
pub fn format_recommendation<S: AsRef<str>>(reviewers: &[S]) -> Option<String> {
    let mentions = reviewers
        .iter()
        .map(|r| format!("{MENTION_MARKER}{}", r.as_ref()))
        .collect::<Vec<_>>();

    match mentions.len() {
        0 => None,
        1 => Some(format!(
            "By analyzing the commit history of the modified files, \
             we identified a person to be potential reviewer {}.",
            mentions[0]
        )),
        _ => Some(format!(
            "By analyzing the commit history of the modified files, \
             we identified people to be potential reviewers {}.",
            mentions.join(", ")
        )),
    }
}

/// Wires the collaborators together for one pull request.
pub struct ReviewerRecommender<'a> {
    pr: &'a dyn PullRequestContext,
    diff: &'a dyn DiffSource,
    history: &'a dyn CommitHistoryPort,
    sink: &'a dyn CommentSink,
}

impl<'a> ReviewerRecommender<'a> {
    pub fn new(
        pr: &'a dyn PullRequestContext,
        diff: &'a dyn DiffSource,
        history: &'a dyn CommitHistoryPort,
        sink: &'a dyn CommentSink,
    ) -> Self {
        Self {
            pr,
            diff,
            history,
            sink,
        }
    }

    /// Run the pipeline once.
    ///
    /// Returns the published message, or `None` when there was nobody to
    /// suggest. Configuration, diff-source and publish failures are errors;
    /// history failures for individual files are not.
    pub async fn run(&self, config: &ReviewerConfig) -> Result<Option<String>> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, self.pr.repository_slug());
        self.run_once(config).instrument(span).await
    }

    async fn run_once(&self, config: &ReviewerConfig) -> Result<Option<String>> {
        let start = Instant::now();
        obs::emit_run_started(
            self.pr.repository_slug(),
            self.pr.target_branch(),
            self.pr.author_identifier(),
        );

        // Compile before touching any collaborator.
        let selector = FileSelector::new(&config.file_blacklist)?;

        let changed = self.diff.list_changed_files().await.map_err(|e| match e {
            ReviewerError::SourceUnavailable(_) => e,
            other => ReviewerError::SourceUnavailable(other.to_string()),
        })?;

        let selected = selector.select(&changed);
        obs::emit_files_selected(changed.len(), &selected);
        if selected.is_empty() {
            info!("No analysable files in this pull request");
            obs::emit_run_finished(start.elapsed().as_millis() as u64, false);
            return Ok(None);
        }

        let tally = aggregate(&selected, self.history, self.pr).await;

        let reviewers = rank(
            &tally,
            &config.user_blacklist,
            self.pr.author_identifier(),
            config.max_reviewers,
        );
        obs::emit_candidates_ranked(tally.len(), &reviewers);

        let Some(message) = format_recommendation(&reviewers) else {
            info!("No reviewer candidates");
            obs::emit_run_finished(start.elapsed().as_millis() as u64, false);
            return Ok(None);
        };

        self.sink.publish(&message).await.map_err(|e| match e {
            ReviewerError::PublishFailed(_) => e,
            other => ReviewerError::PublishFailed(other.to_string()),
        })?;

        obs::emit_run_finished(start.elapsed().as_millis() as u64, true);
        Ok(Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{MemoryCommitHistory, RecordingSink, StaticDiffSource};
    use crate::ports::PullRequestInfo;

    #[test]
    fn test_single_reviewer_uses_singular() {
        let msg = format_recommendation(&["alice"]).unwrap();
        assert!(msg.ends_with("to be potential reviewer @alice."));
    }

    #[test]
    fn test_multiple_reviewers_use_plural() {
        let msg = format_recommendation(&["alice", "bob", "dave"]).unwrap();
        assert!(msg.ends_with("to be potential reviewers @alice, @bob, @dave."));
    }

    #[test]
    fn test_no_reviewers_no_message() {
        let none: [&str; 0] = [];
        assert_eq!(format_recommendation(&none), None);
    }

    #[tokio::test]
    async fn test_run_publishes_once() {
        let pr = PullRequestInfo::new("carol", "acme/widgets", "main");
        let diff = StaticDiffSource::new(&["a.rb"]);
        let history = MemoryCommitHistory::new()
            .with_commits("main", "a.rb", &[Some("alice"), Some("carol")]);
        let sink = RecordingSink::new();

        let recommender = ReviewerRecommender::new(&pr, &diff, &history, &sink);
        let message = recommender.run(&ReviewerConfig::default()).await.unwrap();

        assert_eq!(sink.messages().len(), 1);
        assert_eq!(message.as_deref(), Some(sink.messages()[0].as_str()));
        assert!(sink.messages()[0].contains("@alice"));
        assert!(!sink.messages()[0].contains("@carol"));
    }

    #[tokio::test]
    async fn test_bad_pattern_fails_before_listing_files() {
        let pr = PullRequestInfo::new("carol", "acme/widgets", "main");
        // An unavailable source would surface SourceUnavailable if consulted.
        let diff = StaticDiffSource::unavailable();
        let history = MemoryCommitHistory::new();
        let sink = RecordingSink::new();

        let config = ReviewerConfig::default().with_file_blacklist(["(unclosed"]);
        let err = ReviewerRecommender::new(&pr, &diff, &history, &sink)
            .run(&config)
            .await
            .unwrap_err();

        assert!(matches!(err, ReviewerError::Configuration(_)));
        assert!(history.calls().is_empty());
        assert!(sink.messages().is_empty());
    }
}
