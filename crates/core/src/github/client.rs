//! GitHub REST API client.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::GitHubError;
use crate::models::FileStatus;

/// Page size requested from every list endpoint (the API maximum).
pub const PER_PAGE: usize = 100;

/// Safety stop for pagination.
const MAX_PAGES: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub full_name: String,
    pub owner: GitHubOwner,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: GitHubCommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommitDetail {
    pub message: String,
    pub author: Option<GitHubGitActor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubGitActor {
    pub name: String,
    pub email: String,
    pub date: Option<DateTime<Utc>>,
}

/// Single commit from `GET /repos/{owner}/{repo}/commits/{sha}`, with the
/// per-file changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommitWithFiles {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: GitHubCommitDetail,
    #[serde(default)]
    pub files: Vec<GitHubFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubFile {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Asynchronous GitHub REST API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, GitHubError> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let token = token.into();
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("vaultsync/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        info!(api_url = %api_url, "created GitHubClient");
        Ok(Self {
            http,
            api_url,
            token,
        })
    }

    /// Public repositories owned by `username`.
    #[instrument(skip(self))]
    pub async fn list_user_repos(&self, username: &str) -> Result<Vec<GitHubRepo>, GitHubError> {
        let url = format!("{}/users/{}/repos", self.api_url, username);
        let repos: Vec<GitHubRepo> = self
            .get_paginated(&url, &[("type", "owner".to_string())])
            .await?;
        debug!(count = repos.len(), "fetched repositories");
        Ok(repos)
    }

    /// Commits by `author` in `[since, until)` on the default branch.
    #[instrument(skip(self))]
    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<GitHubCommit>, GitHubError> {
        let url = format!("{}/repos/{}/{}/commits", self.api_url, owner, repo);
        let query = [
            ("author", author.to_string()),
            ("since", since.to_rfc3339()),
            ("until", until.to_rfc3339()),
        ];
        match self.get_paginated::<GitHubCommit>(&url, &query).await {
            Ok(commits) => {
                debug!(count = commits.len(), "fetched commits");
                Ok(commits)
            }
            // Empty repositories answer 409 Conflict.
            Err(GitHubError::ApiError { status: 409, .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// One commit with file details, or `None` if it no longer exists.
    #[instrument(skip(self))]
    pub async fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Option<GitHubCommitWithFiles>, GitHubError> {
        let url = format!("{}/repos/{}/{}/commits/{}", self.api_url, owner, repo, sha);
        let resp = self.http.get(&url).bearer_auth(&self.token).send().await?;
        match check_response(&resp) {
            Ok(()) => {}
            Err(GitHubError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        }
        let commit: GitHubCommitWithFiles = resp.json().await?;
        debug!(sha, files = commit.files.len(), "fetched commit details");
        Ok(Some(commit))
    }

    /// GET every page of a list endpoint until a short page comes back.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, GitHubError> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let resp = self
                .http
                .get(url)
                .bearer_auth(&self.token)
                .query(query)
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await?;
            check_response(&resp)?;
            let batch: Vec<T> = resp.json().await?;
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                break;
            }
        }
        Ok(items)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

fn check_response(resp: &reqwest::Response) -> Result<(), GitHubError> {
    let status = resp.status();
    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    map_status(
        status.as_u16(),
        header("x-ratelimit-remaining").as_deref(),
        header("x-ratelimit-reset").as_deref(),
        resp.url().path(),
    )
}

/// Map an HTTP status to the client's error type. A 403 with no remaining
/// rate-limit budget is a rate limit, not an auth failure.
fn map_status(
    status: u16,
    remaining: Option<&str>,
    reset: Option<&str>,
    path: &str,
) -> Result<(), GitHubError> {
    let rate_limited = || GitHubError::RateLimited {
        reset_at: reset.unwrap_or("unknown").to_string(),
    };
    match status {
        200..=299 => Ok(()),
        429 => Err(rate_limited()),
        403 if remaining == Some("0") => Err(rate_limited()),
        401 | 403 => Err(GitHubError::AuthenticationFailed(format!("HTTP {status}"))),
        404 => Err(GitHubError::NotFound(path.to_string())),
        _ => Err(GitHubError::ApiError {
            status,
            body: format!("HTTP {status}"),
        }),
    }
}
