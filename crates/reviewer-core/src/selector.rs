//! Changed-file selection under a filename exclusion policy.

use regex::Regex;

use crate::error::Result;

/// Upper bound on files whose history is queried per run.
pub const MAX_ANALYZED_FILES: usize = 3;

/// Compiled exclusion policy.
///
/// All patterns are joined into a single alternation. An empty pattern set
/// excludes nothing.
#[derive(Debug, Clone)]
pub struct FileSelector {
    exclusion: Option<Regex>,
}

impl FileSelector {
    /// Compile the exclusion patterns. Fails with
    /// [`ReviewerError::Configuration`](crate::ReviewerError::Configuration)
    /// if the combined pattern is not a valid regular expression.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self { exclusion: None });
        }

        // Each pattern is grouped so a bare `|` inside one cannot leak into
        // its neighbours.
        let alternation = patterns
            .iter()
            .map(|p| format!("(?:{})", p.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            exclusion: Some(Regex::new(&alternation)?),
        })
    }

    /// Whether `path` matches any exclusion pattern.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusion
            .as_ref()
            .map(|re| re.is_match(path))
            .unwrap_or(false)
    }

    /// Keep the first [`MAX_ANALYZED_FILES`] paths that are not excluded,
    /// in their original order.
    pub fn select<S: AsRef<str>>(&self, changed_files: &[S]) -> Vec<String> {
        changed_files
            .iter()
            .map(|p| p.as_ref())
            .filter(|path| !self.is_excluded(path))
            .take(MAX_ANALYZED_FILES)
            .map(str::to_string)
            .collect()
    }
}

/// One-shot form of [`FileSelector::new`] followed by [`FileSelector::select`].
pub fn select_files<F: AsRef<str>, P: AsRef<str>>(
    changed_files: &[F],
    exclusion_patterns: &[P],
) -> Result<Vec<String>> {
    Ok(FileSelector::new(exclusion_patterns)?.select(changed_files))
}
