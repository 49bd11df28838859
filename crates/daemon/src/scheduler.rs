//! Scheduler that keeps today's daily note current on a fixed interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::Notify;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use vaultsync_core::errors::SyncError;
use vaultsync_core::github::CommitSource;
use vaultsync_core::store::NoteStore;
use vaultsync_core::Tracker;

/// Tracks aggregate statistics across sync cycles.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    pub total_cycles: AtomicU64,
    pub total_commits: AtomicU64,
    pub total_errors: AtomicU64,
    pub consecutive_errors: AtomicU64,
    pub skipped: AtomicU64,
}

/// The sync scheduler.
///
/// Runs `run_today` on a timer. The first cycle starts immediately. If a
/// run is still in progress when a tick fires, that tick is skipped rather
/// than queued.
pub struct Scheduler<C: CommitSource, S: NoteStore> {
    tracker: Arc<Tracker<C, S>>,
    poll_interval: Duration,
    stats: Arc<SchedulerStats>,
}

impl<C: CommitSource, S: NoteStore> Scheduler<C, S> {
    pub fn new(tracker: Arc<Tracker<C, S>>, poll_interval: Duration) -> Self {
        Self {
            tracker,
            poll_interval,
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<SchedulerStats> {
        self.stats.clone()
    }

    /// Main scheduler loop. Returns once `shutdown` is notified; a cycle in
    /// progress is allowed to finish first.
    pub async fn run(&self, shutdown: Arc<Notify>) {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "scheduler started"
        );

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.maybe_run_cycle().await;
                }
                _ = shutdown.notified() => {
                    info!("shutdown requested, exiting scheduler loop");
                    break;
                }
            }
        }
    }

    /// Attempt one sync of today's note. Skips if a run is already active.
    pub async fn maybe_run_cycle(&self) {
        if self.tracker.is_running() {
            self.stats.skipped.fetch_add(1, Ordering::SeqCst);
            warn!("skipping sync cycle: previous run still in progress");
            return;
        }

        let cycle = self.stats.total_cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let today = Local::now().date_naive();
        info!(cycle, %today, "starting sync cycle");

        match self.tracker.run_today(today).await {
            Ok(run) => {
                self.stats.consecutive_errors.store(0, Ordering::SeqCst);
                self.stats
                    .total_commits
                    .fetch_add(run.summary.total_commits as u64, Ordering::SeqCst);
                if run.report.is_clean() {
                    info!(cycle, commits = run.summary.total_commits, "sync cycle completed");
                } else {
                    warn!(
                        cycle,
                        failed_days = run.report.failed(),
                        calendar_errors = run.report.calendar_errors.len(),
                        "sync cycle completed with errors"
                    );
                }
            }
            Err(SyncError::AlreadyRunning { started_at }) => {
                self.stats.skipped.fetch_add(1, Ordering::SeqCst);
                warn!(cycle, %started_at, "skipping sync cycle: run lock held");
            }
            Err(e) => {
                let errors = self.stats.total_errors.fetch_add(1, Ordering::SeqCst) + 1;
                let consecutive = self.stats.consecutive_errors.fetch_add(1, Ordering::SeqCst) + 1;
                error!(
                    cycle,
                    error = %e,
                    total_errors = errors,
                    consecutive_errors = consecutive,
                    "sync cycle failed"
                );
            }
        }
    }
}
