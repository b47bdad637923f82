//! GitHub REST backend
//!
//! One `GitHubClient` is bound to a single pull request and serves as its
//! diff source, history port and comment sink.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HistoryError, Result, ReviewerError};
use crate::ports::{Commit, CommentSink, CommitHistoryPort, DiffSource, PullRequestInfo};

const DEFAULT_API_URL: &str = "https://api.github.com";
const PAGE_SIZE: usize = 100;
/// GitHub stops listing pull request files after 3000 entries.
const MAX_FILE_PAGES: usize = 30;

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API root, e.g. `https://api.github.com` or a GHES `/api/v3` URL
    pub api_url: String,
    /// Token sent as a bearer credential (optional for public reads)
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self::from_values(
            std::env::var("GITHUB_API_URL").ok(),
            std::env::var("GITHUB_TOKEN").ok(),
        )
    }
}

impl GitHubConfig {
    /// Read `GITHUB_API_URL` and `GITHUB_TOKEN`
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Build from optional raw values; blank values fall back to defaults.
    fn from_values(api_url: Option<String>, token: Option<String>) -> Self {
        let api_url = api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        GitHubConfig {
            token: token.filter(|t| !t.is_empty()),
            ..Self::new(api_url)
        }
    }

    pub fn new(api_url: &str) -> Self {
        GitHubConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhPull {
    user: GhUser,
    base: GhRef,
}

#[derive(Debug, Deserialize)]
struct GhPullFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
    /// `null` when the commit email is not linked to a GitHub account.
    author: Option<GhUser>,
}

impl From<GhCommit> for Commit {
    fn from(c: GhCommit) -> Self {
        Commit {
            sha: c.sha,
            author: c.author.map(|u| u.login),
        }
    }
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// GitHub client scoped to one pull request.
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
    repo_slug: String,
    number: u64,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig, repo_slug: &str, number: u64) -> Result<Self> {
        if repo_slug.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(ReviewerError::Configuration(format!(
                "repository must be owner/name, got '{repo_slug}'"
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("reviewer-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GitHubClient {
            config,
            http_client,
            repo_slug: repo_slug.to_string(),
            number,
        })
    }

    /// Client configured from the environment.
    pub fn from_env(repo_slug: &str, number: u64) -> Result<Self> {
        Self::new(GitHubConfig::from_env(), repo_slug, number)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.config.api_url, self.repo_slug, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_checked(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReviewerError::Http(format!(
                "GitHub returned {status} for {}",
                response.url()
            )));
        }
        Ok(response)
    }

    /// Author, slug and base branch of the pull request.
    pub async fn pull_request(&self) -> Result<PullRequestInfo> {
        let url = self.url(&format!("pulls/{}", self.number));
        let pull: GhPull = self
            .get_checked(self.http_client.get(&url))
            .await?
            .json()
            .await?;

        Ok(PullRequestInfo::new(
            pull.user.login,
            self.repo_slug.clone(),
            pull.base.name,
        ))
    }
}

#[async_trait]
impl DiffSource for GitHubClient {
    async fn list_changed_files(&self) -> Result<Vec<String>> {
        let url = self.url(&format!("pulls/{}/files", self.number));
        let mut files = Vec::new();

        for page in 1..=MAX_FILE_PAGES {
            let request = self
                .http_client
                .get(&url)
                .query(&[("per_page", PAGE_SIZE), ("page", page)]);
            let batch: Vec<GhPullFile> = self
                .get_checked(request)
                .await
                .map_err(|e| ReviewerError::SourceUnavailable(e.to_string()))?
                .json()
                .await
                .map_err(|e| ReviewerError::SourceUnavailable(e.to_string()))?;

            let last = batch.len() < PAGE_SIZE;
            files.extend(batch.into_iter().map(|f| f.filename));
            if last {
                break;
            }
        }

        debug!(files = files.len(), "Listed pull request files");
        Ok(files)
    }
}

#[async_trait]
impl CommitHistoryPort for GitHubClient {
    async fn query_commits(
        &self,
        repo_slug: &str,
        branch: &str,
        path: &str,
    ) -> std::result::Result<Vec<Commit>, HistoryError> {
        let url = format!("{}/repos/{}/commits", self.config.api_url, repo_slug);
        let request = self
            .http_client
            .get(&url)
            .query(&[("sha", branch), ("path", path)])
            .query(&[("per_page", PAGE_SIZE)]);

        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                HistoryError::Transport(e.to_string())
            } else {
                HistoryError::Query {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Query {
                path: path.to_string(),
                reason: format!("GitHub returned {status}"),
            });
        }

        let commits: Vec<GhCommit> = response.json().await.map_err(|e| HistoryError::Query {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(commits.into_iter().map(Commit::from).collect())
    }
}

#[async_trait]
impl CommentSink for GitHubClient {
    async fn publish(&self, message: &str) -> Result<()> {
        let url = self.url(&format!("issues/{}/comments", self.number));
        let request = self
            .http_client
            .post(&url)
            .json(&NewComment { body: message });

        self.get_checked(request)
            .await
            .map_err(|e| ReviewerError::PublishFailed(e.to_string()))?;

        info!(pr = self.number, "Posted reviewer recommendation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_without_linked_account_has_no_author() {
        let raw = r#"[
            {"sha": "a1", "author": {"login": "alice"}, "commit": {"message": "x"}},
            {"sha": "b2", "author": null, "commit": {"message": "y"}}
        ]"#;
        let commits: Vec<Commit> = serde_json::from_str::<Vec<GhCommit>>(raw)
            .unwrap()
            .into_iter()
            .map(Commit::from)
            .collect();
        assert_eq!(commits[0].author(), Some("alice"));
        assert_eq!(commits[1].author(), None);
    }

    #[test]
    fn test_pull_parses_author_and_base() {
        let raw = r#"{
            "number": 7,
            "user": {"login": "carol"},
            "base": {"ref": "develop", "sha": "f00"}
        }"#;
        let pull: GhPull = serde_json::from_str(raw).unwrap();
        assert_eq!(pull.user.login, "carol");
        assert_eq!(pull.base.name, "develop");
    }

    #[test]
    fn test_urls_are_scoped_to_repository() {
        let client = GitHubClient::new(
            GitHubConfig::new("https://ghe.example.com/api/v3/"),
            "acme/widgets",
            42,
        )
        .unwrap();
        assert_eq!(
            client.url("pulls/42/files"),
            "https://ghe.example.com/api/v3/repos/acme/widgets/pulls/42/files"
        );
    }

    #[test]
    fn test_malformed_slug_is_configuration_error() {
        let err = GitHubClient::new(GitHubConfig::new(DEFAULT_API_URL), "widgets", 1)
            .err()
            .unwrap();
        assert!(matches!(err, ReviewerError::Configuration(_)));
    }

    #[test]
    fn test_env_api_url_trailing_slash_is_trimmed() {
        let config = GitHubConfig::from_values(
            Some("https://ghe.example.com/api/v3/".to_string()),
            Some(String::new()),
        );
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.token, None);

        let client = GitHubClient::new(config, "acme/widgets", 1).unwrap();
        assert_eq!(
            client.url("pulls/1/files"),
            "https://ghe.example.com/api/v3/repos/acme/widgets/pulls/1/files"
        );
    }

    #[test]
    fn test_missing_env_values_use_public_api() {
        let config = GitHubConfig::from_values(None, Some("t0k".to_string()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token.as_deref(), Some("t0k"));
    }

    #[test]
    fn test_config_with_token() {
        let config = GitHubConfig::new(DEFAULT_API_URL).with_token("t0k");
        assert_eq!(config.token.as_deref(), Some("t0k"));
        assert_eq!(config.api_url, "https://api.github.com");
    }
}
