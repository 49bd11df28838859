//! Domain model types used throughout vaultsync.
//!
//! Commit records are produced by the GitHub fetch layer and consumed by the
//! renderers; the stats types summarize sync runs for the binaries.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// One fetched commit, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRecord {
    /// Repository name (without owner).
    pub repo: String,
    /// Abbreviated commit hash (8 characters).
    pub sha: String,
    /// Raw commit message.
    pub message: String,
    /// Human-readable rendition of `message`.
    pub readable_message: String,
    /// Link to the commit on GitHub.
    pub url: String,
    /// Author timestamp.
    pub timestamp: DateTime<Utc>,
    /// File-change statistics, when commit details were fetched.
    pub changes: Option<ChangeStats>,
}

impl CommitRecord {
    pub fn additions(&self) -> u64 {
        self.changes.as_ref().map_or(0, |c| c.additions)
    }

    pub fn deletions(&self) -> u64 {
        self.changes.as_ref().map_or(0, |c| c.deletions)
    }
}

/// Aggregate file changes for one commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeStats {
    pub total_files: usize,
    pub additions: u64,
    pub deletions: u64,
    pub files: Vec<FileChange>,
}

/// Bucket used for files without an extension.
pub const NO_EXTENSION: &str = "no_extension";

impl ChangeStats {
    /// Build aggregate stats from per-file changes.
    pub fn from_files(files: Vec<FileChange>) -> Self {
        Self {
            total_files: files.len(),
            additions: files.iter().map(|f| f.additions).sum(),
            deletions: files.iter().map(|f| f.deletions).sum(),
            files,
        }
    }

    /// Count of touched files per lowercase extension (with leading dot).
    pub fn file_types(&self) -> BTreeMap<String, usize> {
        let mut types = BTreeMap::new();
        for file in &self.files {
            *types.entry(file.extension()).or_insert(0) += 1;
        }
        types
    }
}

/// One file touched by a commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileChange {
    pub filename: String,
    pub status: FileStatus,
    pub additions: u64,
    pub deletions: u64,
}

impl FileChange {
    /// Lowercase extension including the dot, or [`NO_EXTENSION`].
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_else(|| NO_EXTENSION.to_string())
    }
}

/// Per-file change kind as reported by the GitHub API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    #[serde(other)]
    Other,
}

impl FileStatus {
    /// Emoji used in rendered file lists.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Added => "➕",
            Self::Modified => "✏️",
            Self::Removed => "🗑️",
            Self::Renamed => "🔄",
            Self::Other => "📄",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
            Self::Renamed => write!(f, "renamed"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Aggregate statistics for one day of commits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayStats {
    pub commits: usize,
    pub repos: usize,
    pub additions: u64,
    pub deletions: u64,
}

impl DayStats {
    pub fn from_commits(commits: &[CommitRecord]) -> Self {
        let repos: BTreeSet<&str> = commits.iter().map(|c| c.repo.as_str()).collect();
        Self {
            commits: commits.len(),
            repos: repos.len(),
            additions: commits.iter().map(CommitRecord::additions).sum(),
            deletions: commits.iter().map(CommitRecord::deletions).sum(),
        }
    }
}

/// Totals over a set of days, as printed after a backfill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub total_commits: usize,
    pub total_days: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub repos: BTreeSet<String>,
    pub daily: BTreeMap<NaiveDate, DayStats>,
}

impl ActivitySummary {
    /// Summarize commits grouped by day. Days without commits are ignored.
    pub fn from_days(days: &BTreeMap<NaiveDate, Vec<CommitRecord>>) -> Self {
        let mut summary = Self::default();
        for (date, commits) in days {
            if commits.is_empty() {
                continue;
            }
            let stats = DayStats::from_commits(commits);
            summary.total_commits += stats.commits;
            summary.total_additions += stats.additions;
            summary.total_deletions += stats.deletions;
            summary
                .repos
                .extend(commits.iter().map(|c| c.repo.clone()));
            summary.daily.insert(*date, stats);
        }
        summary.total_days = summary.daily.len();
        summary
    }
}

// ---------------------------------------------------------------------------
// Sync outcomes
// ---------------------------------------------------------------------------

/// What happened to a single note during a sync.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteOutcome {
    Created,
    Updated,
    Unchanged,
}

impl std::fmt::Display for NoteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Per-day result of a backfill. Failures carry the error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub commits: usize,
    pub result: Result<NoteOutcome, String>,
}

/// Result of a backfill over a date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillReport {
    pub days: Vec<DayReport>,
    pub calendars_created: usize,
    pub calendar_errors: Vec<String>,
}

impl BackfillReport {
    pub fn succeeded(&self) -> usize {
        self.days.iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.days.len() - self.succeeded()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.calendar_errors.is_empty()
    }
}

/// Result of sweeping placeholder sections out of the vault.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    pub scanned: usize,
    pub cleaned: Vec<std::path::PathBuf>,
    pub errors: Vec<String>,
}

/// Statistics for one tracker run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub summary: ActivitySummary,
    pub report: BackfillReport,
}
