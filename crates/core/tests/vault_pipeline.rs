//! End-to-end tests of the vault pipeline against temporary vaults:
//! render, merge, and write daily notes, then build month calendars and
//! summaries from what landed on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use vaultsync_core::models::{ChangeStats, CommitRecord, FileChange, FileStatus, NoteOutcome};
use vaultsync_core::notes::calendar::{MONTHLY_SUMMARY_HEADING, MONTHLY_SUMMARY_PLACEHOLDER};
use vaultsync_core::{AppConfig, FsNoteStore, VaultSync};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const MARKER: &str = "## 📊 GitHub Activity";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config(vault: &Path, extra_sync: &str) -> AppConfig {
    let toml = format!(
        "[github]\nusername = \"octocat\"\n\n[vault]\npath = {:?}\n\n[sync]\n{}\n",
        vault.display().to_string(),
        extra_sync
    );
    let config: AppConfig = toml::from_str(&toml).expect("test config should parse");
    config.validate().expect("test config should validate");
    config
}

fn setup(extra_sync: &str) -> (TempDir, VaultSync<FsNoteStore>) {
    let dir = tempfile::tempdir().unwrap();
    let sync = VaultSync::new(&config(dir.path(), extra_sync), FsNoteStore).unwrap();
    (dir, sync)
}

fn commit(repo: &str, message: &str, ts: &str, additions: u64, deletions: u64) -> CommitRecord {
    CommitRecord {
        repo: repo.into(),
        sha: "9f8e7d6c".into(),
        message: message.into(),
        readable_message: message.into(),
        url: format!("https://github.com/octocat/{repo}/commit/9f8e7d6c"),
        timestamp: ts.parse().unwrap(),
        changes: Some(ChangeStats::from_files(vec![FileChange {
            filename: "src/main.rs".into(),
            status: FileStatus::Modified,
            additions,
            deletions,
        }])),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

// ---------------------------------------------------------------------------
// Daily notes
// ---------------------------------------------------------------------------

#[test]
fn test_new_day_with_activity() {
    let (_dir, sync) = setup("");
    let day = date(2025, 7, 18);
    let commits = vec![commit("vault", "Add calendar view", "2025-07-18T10:00:00Z", 12, 3)];

    assert_eq!(sync.update_day(day, &commits).unwrap(), NoteOutcome::Created);

    let note = read(&sync.layout().daily_note_path(day));
    assert!(note.starts_with(&format!("# Friday, July 18, 2025\n\n{MARKER}\n\n")));
    assert!(note.contains("**Summary:** 1 commit across 1 repository, +12 -3 lines"));
    assert!(note.contains("### [vault](https://github.com/octocat/vault/commit/9f8e7d6c) - 9f8e7d6c"));
    assert!(note.ends_with('\n'));
}

#[test]
fn test_new_day_without_activity_is_header_only() {
    let (_dir, sync) = setup("");
    let day = date(2025, 7, 19);
    sync.update_day(day, &[]).unwrap();
    assert_eq!(
        read(&sync.layout().daily_note_path(day)),
        "# Saturday, July 19, 2025\n"
    );
}

#[test]
fn test_new_day_without_activity_gets_placeholder_when_configured() {
    let (_dir, sync) = setup("empty_day = \"placeholder\"");
    let day = date(2025, 7, 19);
    sync.update_day(day, &[]).unwrap();
    assert_eq!(
        read(&sync.layout().daily_note_path(day)),
        format!("# Saturday, July 19, 2025\n\n{MARKER}\n\n*No GitHub activity for this day.*\n")
    );
}

#[test]
fn test_user_content_survives_resync() {
    let (_dir, sync) = setup("");
    let day = date(2025, 7, 18);
    let path = sync.layout().daily_note_path(day);
    write(
        &path,
        &format!("# Friday, July 18, 2025\n\n## Journal\nmorning run\n\n{MARKER}\n\nstale\n\n## Ideas\n- a thing\n"),
    );

    let commits = vec![commit("vault", "Fix layout", "2025-07-18T10:00:00Z", 1, 1)];
    assert_eq!(sync.update_day(day, &commits).unwrap(), NoteOutcome::Updated);

    let note = read(&path);
    assert!(note.starts_with("# Friday, July 18, 2025\n\n## Journal\nmorning run\n\n"));
    assert!(note.ends_with("\n\n## Ideas\n- a thing\n"));
    assert!(!note.contains("stale"));
    assert!(note.contains("**Fix layout**"));
}

#[test]
fn test_resync_is_idempotent() {
    let (_dir, sync) = setup("commit_format = \"brief\"\nshow_commit_time = true");
    let day = date(2025, 7, 18);
    let commits = vec![
        commit("vault", "Second", "2025-07-18T12:00:00Z", 80, 0),
        commit("tracker", "First", "2025-07-18T08:00:00Z", 2, 2),
    ];

    sync.update_day(day, &commits).unwrap();
    let first = read(&sync.layout().daily_note_path(day));
    assert_eq!(sync.update_day(day, &commits).unwrap(), NoteOutcome::Unchanged);
    assert_eq!(read(&sync.layout().daily_note_path(day)), first);
    assert!(first.contains("(~30 min)"));
}

#[test]
fn test_activity_removed_when_day_becomes_empty() {
    let (_dir, sync) = setup("");
    let day = date(2025, 7, 18);
    let path = sync.layout().daily_note_path(day);
    write(&path, &format!("# Friday, July 18, 2025\n\n{MARKER}\n\nold\n\n## Notes\nkeep me\n"));

    assert_eq!(sync.update_day(day, &[]).unwrap(), NoteOutcome::Updated);
    assert_eq!(read(&path), "# Friday, July 18, 2025\n\n## Notes\nkeep me\n");
}

#[test]
fn test_preview_matches_update() {
    let (_dir, sync) = setup("");
    let day = date(2025, 7, 18);
    let commits = vec![commit("vault", "Add view", "2025-07-18T10:00:00Z", 1, 0)];

    let preview = sync.preview(day, &commits).unwrap();
    assert!(!sync.layout().daily_note_path(day).exists());
    sync.update_day(day, &commits).unwrap();
    assert_eq!(read(&sync.layout().daily_note_path(day)), preview);
}

// ---------------------------------------------------------------------------
// Backfill and calendars
// ---------------------------------------------------------------------------

#[test]
fn test_backfill_across_month_boundary() {
    let (dir, sync) = setup("");
    let mut days = BTreeMap::new();
    days.insert(
        date(2025, 6, 30),
        vec![commit("vault", "June work", "2025-06-30T10:00:00Z", 5, 1)],
    );
    days.insert(
        date(2025, 7, 1),
        vec![
            commit("vault", "July work", "2025-07-01T15:00:00Z", 7, 0),
            commit("tracker", "More July work", "2025-07-01T09:00:00Z", 3, 2),
        ],
    );

    let report = sync.backfill(date(2025, 6, 29), date(2025, 7, 2), &days).unwrap();
    assert_eq!(report.days.len(), 4);
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.calendars_created, 2);

    let calendar_dir = dir.path().join("Calendar/2025");
    let june = read(&calendar_dir.join("June.md"));
    let july = read(&calendar_dir.join("July.md"));
    assert!(june.starts_with("# June 2025\n"));
    assert!(july.starts_with("# July 2025\n"));

    assert!(june.contains("**Active days:** 1 | **Commits:** 1 | **Changes:** +5 -1 lines"));
    assert!(july.contains(
        "- [[01-07-2025.md|Tuesday, July 1]]: 2 commits across 2 repositories, +10 -2 lines"
    ));

    // Days without commits still get a header-only note.
    assert_eq!(
        read(&sync.layout().daily_note_path(date(2025, 7, 2))),
        "# Wednesday, July 02, 2025\n"
    );
}

#[test]
fn test_month_calendar_is_never_overwritten() {
    let (_dir, sync) = setup("");
    let path = sync.layout().month_calendar_path(date(2025, 7, 1));
    write(&path, "# July 2025\n\nmy own calendar\n");

    assert!(!sync.ensure_month_calendar(2025, 7).unwrap());
    assert_eq!(read(&path), "# July 2025\n\nmy own calendar\n");
}

#[test]
fn test_new_month_adapts_existing_calendar() {
    let (_dir, sync) = setup("");
    assert!(sync.ensure_month_calendar(2025, 7).unwrap());
    sync.update_day(
        date(2025, 7, 18),
        &[commit("vault", "Work", "2025-07-18T10:00:00Z", 9, 2)],
    )
    .unwrap();
    sync.refresh_month_summary(2025, 7).unwrap();

    let july_path = sync.layout().month_calendar_path(date(2025, 7, 1));
    let july = read(&july_path) + "\n## Goals\n- ship it\n";
    assert!(july.contains("[[18-07-2025.md|Friday, July 18]]: 1 commit"));
    write(&july_path, &july);

    assert!(sync.ensure_month_calendar(2025, 8).unwrap());
    let august = read(&sync.layout().month_calendar_path(date(2025, 8, 1)));
    assert!(august.starts_with("# August 2025\n"));
    assert!(august.contains("[[31-08-2025.md|31]]"));
    assert!(august.contains("## Goals\n- ship it\n"));
    assert!(august.contains(&format!("{MONTHLY_SUMMARY_HEADING}\n\n{MONTHLY_SUMMARY_PLACEHOLDER}\n")));
    assert!(!august.contains("**Active days:**"));
    assert!(!august.contains("-07-2025.md"));
}

#[test]
fn test_monthly_summary_keeps_user_sections() {
    let (_dir, sync) = setup("");
    let day = date(2025, 7, 18);
    sync.ensure_month_calendar(2025, 7).unwrap();
    let cal_path = sync.layout().month_calendar_path(day);
    let edited = read(&cal_path) + "\n## Retro\nwent well\n";
    write(&cal_path, &edited);

    sync.update_day(day, &[commit("vault", "Work", "2025-07-18T10:00:00Z", 4, 4)])
        .unwrap();
    assert_eq!(
        sync.refresh_month_summary(2025, 7).unwrap(),
        NoteOutcome::Updated
    );
    assert_eq!(
        sync.refresh_month_summary(2025, 7).unwrap(),
        NoteOutcome::Unchanged
    );

    let calendar = read(&cal_path);
    assert!(calendar.contains(MONTHLY_SUMMARY_HEADING));
    assert!(!calendar.contains(MONTHLY_SUMMARY_PLACEHOLDER));
    assert!(calendar.contains("- [[18-07-2025.md|Friday, July 18]]: 1 commit across 1 repository, +4 -4 lines"));
    assert!(calendar.ends_with("\n## Retro\nwent well\n"));
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

#[test]
fn test_cleanup_removes_only_placeholder_sections() {
    let (_dir, sync) = setup("");
    let empty_day = sync.layout().daily_note_path(date(2025, 7, 19));
    let busy_day = sync.layout().daily_note_path(date(2025, 7, 18));
    write(
        &empty_day,
        &format!("# Saturday, July 19, 2025\n\n{MARKER}\n\n*No GitHub activity for this day.*\n\n## Notes\nrest day\n"),
    );
    sync.update_day(date(2025, 7, 18), &[commit("vault", "Work", "2025-07-18T10:00:00Z", 1, 0)])
        .unwrap();
    let busy_before = read(&busy_day);
    sync.ensure_month_calendar(2025, 7).unwrap();

    let report = sync.cleanup_placeholders().unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.cleaned, vec![empty_day.clone()]);
    assert!(report.errors.is_empty());

    assert_eq!(read(&empty_day), "# Saturday, July 19, 2025\n\n## Notes\nrest day\n");
    assert_eq!(read(&busy_day), busy_before);
}
