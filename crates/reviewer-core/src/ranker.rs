//! Reviewer ranking.
//!
//! Turns an [`AuthorTally`] into the final reviewer list: excluded users are
//! dropped, the rest are ordered by commit count and truncated.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::aggregator::AuthorTally;

/// Reviewer count used when the caller does not specify one.
pub const DEFAULT_MAX_REVIEWERS: i64 = 3;

/// An author with their commit count over the selected files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub author: String,
    pub commits: u64,
}

impl RankedCandidate {
    /// Count descending, then author identifier ascending.
    fn rank_order(&self, other: &Self) -> Ordering {
        other
            .commits
            .cmp(&self.commits)
            .then_with(|| self.author.cmp(&other.author))
    }
}

/// The pull request author unioned with the caller's blacklist.
///
/// Neither input is modified.
pub fn excluded_authors<'a, S: AsRef<str>>(
    pr_author: &'a str,
    user_blacklist: &'a [S],
) -> BTreeSet<&'a str> {
    std::iter::once(pr_author)
        .chain(user_blacklist.iter().map(|u| u.as_ref()))
        .collect()
}

/// Eligible candidates in rank order, with counts. Not truncated.
pub fn ranked_candidates<S: AsRef<str>>(
    tally: &AuthorTally,
    user_blacklist: &[S],
    pr_author: &str,
) -> Vec<RankedCandidate> {
    let excluded = excluded_authors(pr_author, user_blacklist);

    let mut candidates: Vec<RankedCandidate> = tally
        .iter()
        .filter(|(author, _)| !excluded.contains(author))
        .map(|(author, commits)| RankedCandidate {
            author: author.to_string(),
            commits,
        })
        .collect();
    candidates.sort_by(RankedCandidate::rank_order);
    candidates
}

/// Rank eligible authors and keep at most `max` of them.
///
/// `max <= 0` yields an empty list; values beyond the candidate count return
/// every candidate.
pub fn rank<S: AsRef<str>>(
    tally: &AuthorTally,
    user_blacklist: &[S],
    pr_author: &str,
    max: i64,
) -> Vec<String> {
    let limit = if max <= 0 {
        0
    } else {
        usize::try_from(max).unwrap_or(usize::MAX)
    };
    ranked_candidates(tally, user_blacklist, pr_author)
        .into_iter()
        .take(limit)
        .map(|c| c.author)
        .collect()
}
