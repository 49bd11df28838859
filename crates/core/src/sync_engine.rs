//! Vault sync engine.
//!
//! [`VaultSync`] applies fetched commits to the vault: each day's activity
//! section is rendered and merged into its daily note, month calendars are
//! created on demand, and each touched month's summary is rebuilt from the
//! daily notes on disk. Every note is read, merged in memory, and written
//! back only when its text changed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Months, NaiveDate};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::{NoteError, SyncError};
use crate::github::CommitsByDay;
use crate::models::{BackfillReport, CleanupReport, CommitRecord, DayReport, NoteOutcome};
use crate::notes::calendar::{adapt_template, month_calendar, monthly_summary_section, MONTHLY_SUMMARY_HEADING};
use crate::notes::layout::{days_of_month, first_of_month, month_name, parse_daily_filename};
use crate::notes::{daily_header, Existing, MergeResult, Renderer, SectionMerger, VaultLayout};
use crate::store::NoteStore;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Applies commit activity to a notes vault through a [`NoteStore`].
#[derive(Debug)]
pub struct VaultSync<S: NoteStore> {
    store: S,
    layout: VaultLayout,
    merger: SectionMerger,
    renderer: Renderer,
    summary_merger: SectionMerger,
}

impl<S: NoteStore> VaultSync<S> {
    /// Build the engine from configuration.
    pub fn new(config: &AppConfig, store: S) -> Result<Self, NoteError> {
        let merger = SectionMerger::new(&config.sync.activity_heading)?
            .with_policy(config.sync.empty_day);
        let renderer = Renderer::from_config(&config.sync)?;
        Self::from_parts(VaultLayout::from_config(&config.vault), merger, renderer, store)
    }

    /// Build the engine from explicit parts. The renderer and merger must
    /// agree on the section marker.
    pub fn from_parts(
        layout: VaultLayout,
        merger: SectionMerger,
        renderer: Renderer,
        store: S,
    ) -> Result<Self, NoteError> {
        if merger.marker() != renderer.marker() {
            return Err(NoteError::InvalidMarker(format!(
                "renderer writes '{}' but merger looks for '{}'",
                renderer.marker(),
                merger.marker()
            )));
        }
        info!(
            vault = %layout.root().display(),
            marker = merger.marker(),
            "initializing vault sync"
        );
        Ok(Self {
            store,
            layout,
            merger,
            renderer,
            summary_merger: SectionMerger::new(MONTHLY_SUMMARY_HEADING)?,
        })
    }

    pub fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Daily notes
    // -----------------------------------------------------------------------

    fn merge_day(&self, date: NaiveDate, existing: Option<&str>, commits: &[CommitRecord]) -> MergeResult {
        let body = self.renderer.render(commits);
        let header = daily_header(date);
        let existing = match existing {
            Some(text) => Existing::Present(text),
            None => Existing::Absent { header: &header },
        };
        self.merger.merge(existing, &body)
    }

    /// The daily note for `date` as it would look after an update, without
    /// writing anything.
    pub fn preview(&self, date: NaiveDate, commits: &[CommitRecord]) -> Result<String, SyncError> {
        let path = self.layout.daily_note_path(date);
        let existing = self.store.read(&path)?;
        Ok(self.merge_day(date, existing.as_deref(), commits).text)
    }

    /// Merge `commits` into the daily note for `date`.
    pub fn update_day(&self, date: NaiveDate, commits: &[CommitRecord]) -> Result<NoteOutcome, SyncError> {
        let path = self.layout.daily_note_path(date);
        let existing = self.store.read(&path)?;
        let merged = self.merge_day(date, existing.as_deref(), commits);

        let outcome = write_if_changed(&self.store, &path, existing.as_deref(), &merged.text)?;
        info!(
            %date,
            commits = commits.len(),
            action = ?merged.action,
            outcome = %outcome,
            "daily note synced"
        );
        Ok(outcome)
    }

    /// Update every day in `from..=to`, then the calendars of every month
    /// the range touches. A failing day is recorded in the report and the
    /// remaining days still run.
    pub fn backfill(&self, from: NaiveDate, to: NaiveDate, days: &CommitsByDay) -> Result<BackfillReport, SyncError> {
        check_range(from, to)?;
        info!(%from, %to, "starting backfill");

        let mut report = BackfillReport::default();
        for date in from.iter_days().take_while(|d| *d <= to) {
            let commits = days.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            let result = self.update_day(date, commits).map_err(|e| {
                warn!(%date, error = %e, "failed to update daily note");
                e.to_string()
            });
            report.days.push(DayReport {
                date,
                commits: commits.len(),
                result,
            });
        }

        self.sync_months(from, to, &mut report);
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            calendars_created = report.calendars_created,
            "backfill complete"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Month calendars
    // -----------------------------------------------------------------------

    /// Create (if missing) and refresh the calendars for every month between
    /// `from` and `to`, without touching daily notes.
    pub fn ensure_calendars(&self, from: NaiveDate, to: NaiveDate) -> Result<BackfillReport, SyncError> {
        check_range(from, to)?;
        let mut report = BackfillReport::default();
        self.sync_months(from, to, &mut report);
        Ok(report)
    }

    fn sync_months(&self, from: NaiveDate, to: NaiveDate, report: &mut BackfillReport) {
        for month in months_between(from, to) {
            let label = format!("{} {}", month_name(month), month.year());
            match self.ensure_calendar_for(month) {
                Ok(true) => report.calendars_created += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(month = %label, error = %e, "failed to create month calendar");
                    report.calendar_errors.push(format!("{label}: {e}"));
                    continue;
                }
            }
            if let Err(e) = self.refresh_summary_for(month) {
                warn!(month = %label, error = %e, "failed to refresh monthly summary");
                report.calendar_errors.push(format!("{label}: {e}"));
            }
        }
    }

    /// Create the calendar note for `year`-`month` unless it already exists.
    /// Returns whether a note was created.
    pub fn ensure_month_calendar(&self, year: i32, month: u32) -> Result<bool, SyncError> {
        let first = first_of_month(year, month).ok_or(SyncError::InvalidDate { year, month })?;
        self.ensure_calendar_for(first)
    }

    fn ensure_calendar_for(&self, month: NaiveDate) -> Result<bool, SyncError> {
        let path = self.layout.month_calendar_path(month);
        if self.store.exists(&path) {
            debug!(path = %path.display(), "month calendar already exists");
            return Ok(false);
        }

        let text = match self.find_template(month.year(), &path)? {
            Some((template_path, template)) => {
                info!(template = %template_path.display(), "adapting existing month calendar");
                adapt_template(&template, month)
            }
            None => month_calendar(month),
        };
        self.store.write(&path, &text)?;
        info!(path = %path.display(), "created month calendar");
        Ok(true)
    }

    /// Another month's calendar in the same year, if there is one.
    fn find_template(&self, year: i32, target: &Path) -> Result<Option<(PathBuf, String)>, SyncError> {
        let candidates = self.store.list_markdown(&self.layout.year_dir(year), false)?;
        for candidate in candidates {
            let is_readme = candidate.file_name().is_some_and(|n| n == "README.md");
            if is_readme || candidate == target {
                continue;
            }
            match self.store.read(&candidate) {
                Ok(Some(text)) => return Ok(Some((candidate, text))),
                Ok(None) => {}
                Err(e) => warn!(path = %candidate.display(), error = %e, "unreadable calendar template"),
            }
        }
        Ok(None)
    }

    /// Rebuild the Monthly Summary section of a month calendar from the
    /// summary lines of that month's daily notes.
    pub fn refresh_month_summary(&self, year: i32, month: u32) -> Result<NoteOutcome, SyncError> {
        let first = first_of_month(year, month).ok_or(SyncError::InvalidDate { year, month })?;
        self.refresh_summary_for(first)
    }

    fn refresh_summary_for(&self, month: NaiveDate) -> Result<NoteOutcome, SyncError> {
        let path = self.layout.month_calendar_path(month);
        let Some(calendar) = self.store.read(&path)? else {
            debug!(path = %path.display(), "no month calendar to summarize");
            return Ok(NoteOutcome::Unchanged);
        };

        let mut stats = BTreeMap::new();
        for day in days_of_month(month) {
            let note_path = self.layout.daily_note_path(day);
            if let Some(note) = self.store.read(&note_path)? {
                if let Some(day_stats) = self.renderer.read_day_stats(&note) {
                    stats.insert(day, day_stats);
                }
            }
        }

        let body = monthly_summary_section(&stats);
        let merged = self.summary_merger.merge(Existing::Present(&calendar), &body);
        let outcome = write_if_changed(&self.store, &path, Some(&calendar), &merged.text)?;
        debug!(path = %path.display(), active_days = stats.len(), outcome = %outcome, "monthly summary refreshed");
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Cleanup
    // -----------------------------------------------------------------------

    /// Remove activity sections holding nothing but the placeholder line
    /// from every daily note in the vault.
    pub fn cleanup_placeholders(&self) -> Result<CleanupReport, SyncError> {
        let files = self.store.list_markdown(&self.layout.calendar_dir(), true)?;
        let mut report = CleanupReport::default();

        for path in files {
            let is_daily = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_daily_filename)
                .is_some();
            if !is_daily {
                continue;
            }
            report.scanned += 1;

            let result = self.store.read(&path).and_then(|text| {
                match text.and_then(|t| self.merger.strip_placeholder(&t)) {
                    Some(cleaned) => self.store.write(&path, &cleaned).map(|()| true),
                    None => Ok(false),
                }
            });
            match result {
                Ok(true) => {
                    info!(path = %path.display(), "removed placeholder section");
                    report.cleaned.push(path);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cleanup failed");
                    report.errors.push(e.to_string());
                }
            }
        }

        info!(scanned = report.scanned, cleaned = report.cleaned.len(), "cleanup complete");
        Ok(report)
    }
}

fn write_if_changed<S: NoteStore>(
    store: &S,
    path: &Path,
    existing: Option<&str>,
    text: &str,
) -> Result<NoteOutcome, SyncError> {
    let outcome = match existing {
        None => NoteOutcome::Created,
        Some(old) if old == text => NoteOutcome::Unchanged,
        Some(_) => NoteOutcome::Updated,
    };
    if outcome != NoteOutcome::Unchanged {
        store.write(path, text)?;
    }
    Ok(outcome)
}

fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), SyncError> {
    if from > to {
        return Err(SyncError::InvalidRange {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

/// First day of every month overlapping `from..=to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let Some(mut month) = from.with_day(1) else {
        return months;
    };
    while month <= to {
        months.push(month);
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }
    months
}
