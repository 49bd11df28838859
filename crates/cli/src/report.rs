//! Terminal reports for sync runs.

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use vaultsync_core::models::{ActivitySummary, BackfillReport, CleanupReport, NoteOutcome};

use crate::style;

/// Per-day table of a backfill.
pub fn day_table(report: &BackfillReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Day", "Commits", "Note"]);

    for day in &report.days {
        let note_cell = match &day.result {
            Ok(NoteOutcome::Created) => Cell::new("created").fg(Color::Green),
            Ok(NoteOutcome::Updated) => Cell::new("updated").fg(Color::Blue),
            Ok(NoteOutcome::Unchanged) => Cell::new("unchanged"),
            Err(e) => Cell::new(format!("✗ {e}")).fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(day.date.format("%Y-%m-%d")),
            Cell::new(day.date.format("%a")),
            Cell::new(day.commits),
            note_cell,
        ]);
    }
    table
}

pub fn print_backfill(report: &BackfillReport) {
    if report.days.len() > 1 {
        println!("{}", day_table(report));
    } else {
        for day in &report.days {
            match &day.result {
                Ok(outcome) => println!(
                    "  {}  {} commit(s), note {}",
                    day.date,
                    day.commits,
                    style::outcome(*outcome)
                ),
                Err(e) => println!("  {}", style::error(&format!("{}: {e}", day.date))),
            }
        }
    }

    if report.calendars_created > 0 {
        println!(
            "{}",
            style::success(&format!("{} month calendar(s) created", report.calendars_created))
        );
    }
    for err in &report.calendar_errors {
        println!("{}", style::error(err));
    }

    println!();
    if report.is_clean() {
        println!("{}", style::success(&format!("{} day(s) synced", report.succeeded())));
    } else {
        println!(
            "{}",
            style::warn(&format!(
                "{} day(s) synced, {} failed, {} calendar error(s)",
                report.succeeded(),
                report.failed(),
                report.calendar_errors.len()
            ))
        );
    }
}

pub fn print_summary(summary: &ActivitySummary) {
    println!();
    println!("{}", style::header("GitHub Activity"));
    println!("{}", "─".repeat(40));
    println!("  Commits      {}", summary.total_commits);
    println!("  Active days  {}", summary.total_days);
    println!(
        "  Changes      {}",
        style::line_delta(summary.total_additions, summary.total_deletions)
    );
    if summary.repos.is_empty() {
        println!("  Repositories {}", style::dim("none"));
    } else {
        let repos: Vec<&str> = summary.repos.iter().map(String::as_str).collect();
        println!("  Repositories {}", repos.join(", "));
    }
    println!();
}

pub fn print_cleanup(report: &CleanupReport) {
    for path in &report.cleaned {
        println!("  {}", style::dim(&path.display().to_string()));
    }
    for err in &report.errors {
        println!("{}", style::error(err));
    }
    println!();
    println!(
        "{}",
        style::success(&format!(
            "{} daily note(s) scanned, {} cleaned",
            report.scanned,
            report.cleaned.len()
        ))
    );
}
