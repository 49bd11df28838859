//! Where notes live inside the vault and how they are titled.
//!
//! ```text
//! <vault>/<calendar_folder>/2025/July/18-07-2025.md   daily note
//! <vault>/<calendar_folder>/2025/July.md              month calendar
//! ```

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::config::VaultConfig;

/// `DD-MM-YYYY`, the stem of every daily note file.
pub const DAILY_NOTE_FORMAT: &str = "%d-%m-%Y";

/// Resolves vault paths for daily notes and month calendars.
#[derive(Debug, Clone)]
pub struct VaultLayout {
    root: PathBuf,
    calendar_folder: String,
}

impl VaultLayout {
    pub fn new(root: impl Into<PathBuf>, calendar_folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            calendar_folder: calendar_folder.into(),
        }
    }

    pub fn from_config(vault: &VaultConfig) -> Self {
        Self::new(vault.path.clone(), vault.calendar_folder.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn calendar_dir(&self) -> PathBuf {
        self.root.join(&self.calendar_folder)
    }

    pub fn year_dir(&self, year: i32) -> PathBuf {
        self.calendar_dir().join(year.to_string())
    }

    pub fn daily_note_path(&self, date: NaiveDate) -> PathBuf {
        self.year_dir(date.year())
            .join(month_name(date))
            .join(daily_note_filename(date))
    }

    /// Month calendar path; `first` may be any day of the month.
    pub fn month_calendar_path(&self, first: NaiveDate) -> PathBuf {
        self.year_dir(first.year())
            .join(format!("{}.md", month_name(first)))
    }
}

/// Full English month name, e.g. `July`.
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// `18-07-2025.md`
pub fn daily_note_filename(date: NaiveDate) -> String {
    format!("{}.md", date.format(DAILY_NOTE_FORMAT))
}

/// Parse the date out of a daily note file name. Anything else is `None`.
pub fn parse_daily_filename(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".md")?;
    // chrono accepts unpadded fields; the vault only ever holds padded ones.
    if stem.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(stem, DAILY_NOTE_FORMAT).ok()
}

/// Title line of a daily note: `# Friday, July 18, 2025`.
pub fn daily_header(date: NaiveDate) -> String {
    format!("# {}", date.format("%A, %B %d, %Y"))
}

/// First day of `year`-`month`, if that month exists.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Every day of the month containing `date`, in order.
pub fn days_of_month(date: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = date.with_day(1).unwrap_or(date);
    first
        .iter_days()
        .take_while(move |d| d.month() == first.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_note_path() {
        let layout = VaultLayout::new("/vault", "Calendar");
        assert_eq!(
            layout.daily_note_path(date(2025, 7, 8)),
            PathBuf::from("/vault/Calendar/2025/July/08-07-2025.md")
        );
        assert_eq!(
            layout.month_calendar_path(date(2025, 7, 8)),
            PathBuf::from("/vault/Calendar/2025/July.md")
        );
        assert_eq!(layout.year_dir(2025), PathBuf::from("/vault/Calendar/2025"));
    }

    #[test]
    fn test_daily_header() {
        assert_eq!(daily_header(date(2025, 7, 18)), "# Friday, July 18, 2025");
        assert_eq!(daily_header(date(2025, 3, 3)), "# Monday, March 03, 2025");
    }

    #[test]
    fn test_parse_daily_filename() {
        assert_eq!(parse_daily_filename("18-07-2025.md"), Some(date(2025, 7, 18)));
        assert_eq!(parse_daily_filename("July.md"), None);
        assert_eq!(parse_daily_filename("18-07-2025.txt"), None);
        assert_eq!(parse_daily_filename("31-02-2025.md"), None);
        assert_eq!(parse_daily_filename("1-7-2025.md"), None);
    }

    #[test]
    fn test_filename_roundtrip() {
        let d = date(2024, 2, 29);
        assert_eq!(parse_daily_filename(&daily_note_filename(d)), Some(d));
    }

    #[test]
    fn test_days_of_month() {
        let days: Vec<_> = days_of_month(date(2024, 2, 14)).collect();
        assert_eq!(days.len(), 29);
        assert_eq!(days[0], date(2024, 2, 1));
        assert_eq!(days[28], date(2024, 2, 29));
        assert_eq!(days_of_month(date(2025, 12, 31)).count(), 31);
    }

    #[test]
    fn test_first_of_month() {
        assert_eq!(first_of_month(2025, 7), Some(date(2025, 7, 1)));
        assert_eq!(first_of_month(2025, 13), None);
        assert_eq!(first_of_month(2025, 0), None);
    }
}
