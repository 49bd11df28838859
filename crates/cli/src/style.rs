//! Shared styling utilities for the CLI.

use console::Style;

use vaultsync_core::models::NoteOutcome;

/// Create a success-styled string (green with checkmark).
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Create an error-styled string (red with cross).
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Create a warning-styled string (yellow).
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Create a header-styled string (bold, white).
pub fn header(msg: &str) -> String {
    let style = Style::new().bold();
    style.apply_to(msg).to_string()
}

/// Create a dim-styled string.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// Label for what happened to a note.
pub fn outcome(outcome: NoteOutcome) -> String {
    let style = match outcome {
        NoteOutcome::Created => Style::new().green().bold(),
        NoteOutcome::Updated => Style::new().blue().bold(),
        NoteOutcome::Unchanged => Style::new().dim(),
    };
    style.apply_to(outcome.to_string()).to_string()
}

/// `+12 -3` with additions green and deletions red.
pub fn line_delta(additions: u64, deletions: u64) -> String {
    format!(
        "{} {}",
        Style::new().green().apply_to(format!("+{additions}")),
        Style::new().red().apply_to(format!("-{deletions}"))
    )
}
