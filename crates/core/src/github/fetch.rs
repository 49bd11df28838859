//! Turning the user's GitHub history into per-day commit lists.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use tracing::{debug, info, warn};

use super::client::{GitHubClient, GitHubCommit, GitHubCommitWithFiles};
use crate::commit_text::{is_filtered, readable_message};
use crate::config::{GitHubConfig, SyncConfig};
use crate::errors::GitHubError;
use crate::models::{ChangeStats, CommitRecord, FileChange};

/// Commits grouped by calendar day, each day newest first.
pub type CommitsByDay = BTreeMap<NaiveDate, Vec<CommitRecord>>;

/// Anything that can produce commits for an inclusive range of days.
pub trait CommitSource: Send + Sync {
    fn fetch_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<CommitsByDay, GitHubError>> + Send;
}

/// Fetches the configured user's commits from GitHub.
#[derive(Debug, Clone)]
pub struct CommitFetcher {
    client: GitHubClient,
    github: GitHubConfig,
    sync: SyncConfig,
}

impl CommitFetcher {
    pub fn new(client: GitHubClient, github: GitHubConfig, sync: SyncConfig) -> Self {
        Self {
            client,
            github,
            sync,
        }
    }

    async fn fetch_repo(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>, GitHubError> {
        let commits = self
            .client
            .list_commits(owner, repo, &self.github.username, since, until)
            .await?;

        let mut records = Vec::new();
        for commit in commits {
            if self.sync.filter_keywords_enabled
                && is_filtered(&commit.commit.message, &self.sync.filter_keywords)
            {
                debug!(repo, sha = %commit.sha, "skipping filtered commit");
                continue;
            }

            let details = match self.client.get_commit(owner, repo, &commit.sha).await {
                Ok(details) => details,
                Err(e) => {
                    warn!(repo, sha = %commit.sha, error = %e, "commit details unavailable");
                    None
                }
            };

            match to_record(repo, &commit, details.as_ref(), self.sync.readable_messages) {
                Some(record) => records.push(record),
                None => warn!(repo, sha = %commit.sha, "commit has no author date, skipping"),
            }
        }
        Ok(records)
    }
}

impl CommitSource for CommitFetcher {
    async fn fetch_days(&self, from: NaiveDate, to: NaiveDate) -> Result<CommitsByDay, GitHubError> {
        let (since, until) = utc_window(&Local, from, to);
        info!(%from, %to, user = %self.github.username, "fetching GitHub activity");

        let repos = self.client.list_user_repos(&self.github.username).await?;
        let mut records = Vec::new();
        for repo in repos
            .iter()
            .filter(|r| !r.archived && self.github.tracks_repo(&r.name))
        {
            match self
                .fetch_repo(&repo.owner.login, &repo.name, since, until)
                .await
            {
                Ok(mut found) => {
                    debug!(repo = %repo.name, count = found.len(), "repository scanned");
                    records.append(&mut found);
                }
                Err(e @ GitHubError::RateLimited { .. }) => return Err(e),
                Err(e @ GitHubError::AuthenticationFailed(_)) => return Err(e),
                Err(e) => warn!(repo = %repo.name, error = %e, "skipping repository"),
            }
        }

        let days = group_by_day(records, &Local, self.sync.max_commits_per_day);
        info!(
            days = days.len(),
            commits = days.values().map(Vec::len).sum::<usize>(),
            "GitHub activity fetched"
        );
        Ok(days)
    }
}

/// UTC bounds `[since, until)` covering local days `from..=to`.
pub fn utc_window<Tz: TimeZone>(tz: &Tz, from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_of = |day: NaiveDate| {
        let midnight = day.and_time(chrono::NaiveTime::MIN);
        tz.from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    };
    (start_of(from), start_of(to + Duration::days(1)))
}

/// Build a [`CommitRecord`] from API payloads. `None` when the commit carries
/// no author date.
pub fn to_record(
    repo: &str,
    commit: &GitHubCommit,
    details: Option<&GitHubCommitWithFiles>,
    readable: bool,
) -> Option<CommitRecord> {
    let timestamp = commit.commit.author.as_ref()?.date?;
    let message = commit.commit.message.trim().to_string();
    let readable_message = if readable {
        readable_message(&message)
    } else {
        message.lines().next().unwrap_or("").to_string()
    };

    let changes = details.map(|d| {
        ChangeStats::from_files(
            d.files
                .iter()
                .map(|f| FileChange {
                    filename: f.filename.clone(),
                    status: f.status,
                    additions: f.additions,
                    deletions: f.deletions,
                })
                .collect(),
        )
    });

    Some(CommitRecord {
        repo: repo.to_string(),
        sha: commit.sha.chars().take(8).collect(),
        message,
        readable_message,
        url: commit.html_url.clone(),
        timestamp,
        changes,
    })
}

/// Group records by their calendar day in `tz`, newest first within each
/// day, keeping at most `max_per_day`.
pub fn group_by_day<Tz: TimeZone>(records: Vec<CommitRecord>, tz: &Tz, max_per_day: usize) -> CommitsByDay {
    let mut days: CommitsByDay = BTreeMap::new();
    for record in records {
        let day = record.timestamp.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(record);
    }
    for commits in days.values_mut() {
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        commits.truncate(max_per_day);
    }
    days
}
