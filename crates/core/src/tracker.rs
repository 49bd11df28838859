//! Fetch-and-sync orchestration.
//!
//! A [`Tracker`] pulls commits from a [`CommitSource`] and hands them to a
//! [`VaultSync`]. Only one run may be in flight at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{CoreError, SyncError};
use crate::github::{CommitFetcher, CommitSource, GitHubClient};
use crate::models::{ActivitySummary, RunStats};
use crate::store::{FsNoteStore, NoteStore};
use crate::sync_engine::VaultSync;

pub struct Tracker<C: CommitSource, S: NoteStore> {
    source: C,
    vault: VaultSync<S>,
    /// Prevents concurrent runs.
    run_lock: Arc<RunLock>,
}

impl<C: CommitSource, S: NoteStore> Tracker<C, S> {
    pub fn new(source: C, vault: VaultSync<S>) -> Self {
        info!("initializing tracker");
        Self {
            source,
            vault,
            run_lock: Arc::new(RunLock::default()),
        }
    }

    pub fn vault(&self) -> &VaultSync<S> {
        &self.vault
    }

    pub fn is_running(&self) -> bool {
        self.run_lock.running.load(Ordering::SeqCst)
    }

    /// Sync today's note (and this month's calendar).
    pub async fn run_today(&self, today: NaiveDate) -> Result<RunStats, SyncError> {
        self.run_range(today, today).await
    }

    /// Sync the `days` days ending with `today`.
    pub async fn run_backfill(&self, days: u32, today: NaiveDate) -> Result<RunStats, SyncError> {
        if days == 0 {
            return Err(SyncError::InvalidRange {
                from: today.to_string(),
                to: format!("{today} (0 days)"),
            });
        }
        let from = today
            .checked_sub_days(Days::new(u64::from(days) - 1))
            .ok_or_else(|| SyncError::InvalidRange {
                from: format!("{days} days before {today}"),
                to: today.to_string(),
            })?;
        self.run_range(from, today).await
    }

    /// Fetch and sync every day in `from..=to`.
    pub async fn run_range(&self, from: NaiveDate, to: NaiveDate) -> Result<RunStats, SyncError> {
        let guard = RunningGuard::acquire(&self.run_lock).ok_or_else(|| SyncError::AlreadyRunning {
            started_at: self
                .run_lock
                .started_at()
                .map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339()),
        })?;

        let mut stats = RunStats {
            started_at: Some(guard.started_at),
            ..Default::default()
        };

        let days = self.source.fetch_days(from, to).await?;
        stats.summary = ActivitySummary::from_days(&days);
        stats.report = self.vault.backfill(from, to, &days)?;
        stats.completed_at = Some(Utc::now());

        info!(
            %from,
            %to,
            commits = stats.summary.total_commits,
            active_days = stats.summary.total_days,
            failed_days = stats.report.failed(),
            "run complete"
        );
        Ok(stats)
    }

    /// The daily note for `date` with freshly fetched activity, unwritten.
    pub async fn preview(&self, date: NaiveDate) -> Result<String, SyncError> {
        let days = self.source.fetch_days(date, date).await?;
        let commits = days.get(&date).map(Vec::as_slice).unwrap_or(&[]);
        self.vault.preview(date, commits)
    }
}

impl Tracker<CommitFetcher, FsNoteStore> {
    /// Wire a tracker for the configured GitHub user and on-disk vault.
    /// Fails when the token is missing, the HTTP client cannot be built, or
    /// the activity heading is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let token = config.require_token()?;
        let client = GitHubClient::new(config.github.api_url.as_str(), token)?;
        let fetcher = CommitFetcher::new(client, config.github.clone(), config.sync.clone());
        let vault = VaultSync::new(config, FsNoteStore)?;
        Ok(Self::new(fetcher, vault))
    }
}

// ---------------------------------------------------------------------------
// Run lock RAII guard
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RunLock {
    running: AtomicBool,
    /// Start of the run currently holding the lock.
    started_at: Mutex<Option<DateTime<Utc>>>,
}

impl RunLock {
    fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.lock().ok().and_then(|t| *t)
    }

    fn set_started_at(&self, value: Option<DateTime<Utc>>) {
        if let Ok(mut slot) = self.started_at.lock() {
            *slot = value;
        }
    }
}

/// Holds the run lock for the duration of a run and releases it on drop,
/// even if the run panics.
struct RunningGuard {
    lock: Arc<RunLock>,
    started_at: DateTime<Utc>,
}

impl RunningGuard {
    fn acquire(lock: &Arc<RunLock>) -> Option<Self> {
        lock.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        let started_at = Utc::now();
        lock.set_started_at(Some(started_at));
        Some(Self {
            lock: lock.clone(),
            started_at,
        })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.lock.set_started_at(None);
        self.lock.running.store(false, Ordering::SeqCst);
    }
}
