//! Reviewer suggestions for pull requests
//!
//! The `suggest-reviewers` command ranks the authors who committed most to
//! the files a pull request changes and mentions them.
//!
//! ## Commands
//!
//! - `local`: analyse a branch in a local clone and print the suggestion
//! - `github`: analyse a GitHub pull request and post the suggestion

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use reviewer_core::{
    configured_user_email, is_git_repo, CommentSink, GitDiffSource, GitHistory, GitHubClient,
    PullRequestInfo, ReviewerConfig, ReviewerRecommender, StdoutSink,
};

#[derive(Parser)]
#[command(name = "suggest-reviewers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Suggest pull request reviewers from commit history", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// JSON settings file (max_reviewers, file_blacklist, user_blacklist)
    #[arg(long, global = true, env = "REVIEWERS_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of reviewers to suggest
    #[arg(long, global = true, env = "REVIEWERS_MAX", allow_negative_numbers = true)]
    max_reviewers: Option<i64>,

    /// Regex of changed files to ignore (repeatable)
    #[arg(
        long = "exclude-file",
        global = true,
        env = "REVIEWERS_FILE_BLACKLIST",
        value_delimiter = ','
    )]
    exclude_files: Vec<String>,

    /// User never to suggest (repeatable)
    #[arg(
        long = "exclude-user",
        global = true,
        env = "REVIEWERS_USER_BLACKLIST",
        value_delimiter = ','
    )]
    exclude_users: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a local branch against its target branch and print the suggestion
    Local {
        /// Target branch the change merges into
        #[arg(long)]
        base: String,

        /// Revision holding the change
        #[arg(long, default_value = "HEAD")]
        head: String,

        /// Author of the change (default: git config user.email)
        #[arg(long)]
        author: Option<String>,

        /// Repository directory
        #[arg(long, default_value = ".")]
        repo_dir: PathBuf,
    },

    /// Analyse a GitHub pull request and comment with the suggestion
    Github {
        /// Repository as owner/name
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: String,

        /// Pull request number
        #[arg(long)]
        pr: u64,

        /// Print the suggestion instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    reviewer_core::init_tracing(cli.json, level);

    let config = resolve_config(&cli)?;

    let message = match &cli.command {
        Commands::Local {
            base,
            head,
            author,
            repo_dir,
        } => cmd_local(&config, base, head, author.as_deref(), repo_dir).await?,
        Commands::Github { repo, pr, dry_run } => {
            cmd_github(&config, repo, *pr, *dry_run).await?
        }
    };

    if message.is_none() {
        info!("No reviewers to suggest");
    }
    Ok(())
}

/// Settings file first, then command-line values on top.
fn resolve_config(cli: &Cli) -> Result<ReviewerConfig> {
    let mut config = match &cli.config {
        Some(path) => ReviewerConfig::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ReviewerConfig::default(),
    };

    if let Some(max) = cli.max_reviewers {
        config.max_reviewers = max;
    }
    Ok(config
        .with_file_blacklist(cli.exclude_files.iter().cloned())
        .with_user_blacklist(cli.exclude_users.iter().cloned()))
}

async fn cmd_local(
    config: &ReviewerConfig,
    base: &str,
    head: &str,
    author: Option<&str>,
    repo_dir: &Path,
) -> Result<Option<String>> {
    if !is_git_repo(repo_dir).await {
        anyhow::bail!("{} is not inside a git work tree", repo_dir.display());
    }

    let author = match author {
        Some(a) => a.to_string(),
        None => configured_user_email(repo_dir)
            .await
            .context("Pass --author or set git config user.email")?,
    };

    let pr = PullRequestInfo::new(author, "local", base);
    let diff = GitDiffSource::new(repo_dir, base, head);
    let history = GitHistory::new(repo_dir);

    ReviewerRecommender::new(&pr, &diff, &history, &StdoutSink)
        .run(config)
        .await
        .context("Reviewer suggestion failed")
}

async fn cmd_github(
    config: &ReviewerConfig,
    repo: &str,
    number: u64,
    dry_run: bool,
) -> Result<Option<String>> {
    let client = GitHubClient::from_env(repo, number)?;
    let pr = client
        .pull_request()
        .await
        .with_context(|| format!("Failed to load {repo}#{number}"))?;

    let sink: &dyn CommentSink = if dry_run { &StdoutSink } else { &client };

    ReviewerRecommender::new(&pr, &client, &client, sink)
        .run(config)
        .await
        .context("Reviewer suggestion failed")
}
