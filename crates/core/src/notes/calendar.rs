//! Month calendar notes: a Mon–Sun grid linking every daily note, a monthly
//! summary, and a list of quick links.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use regex_lite::Regex;

use super::layout::{daily_note_filename, days_of_month, month_name};
use super::render::stats_phrase;
use super::section::Document;
use crate::models::DayStats;

pub const CALENDAR_VIEW_HEADING: &str = "## 📅 Calendar View";
pub const MONTHLY_SUMMARY_HEADING: &str = "## 📊 Monthly Summary";
pub const QUICK_LINKS_HEADING: &str = "## 🔗 Quick Links";
pub const MONTHLY_SUMMARY_PLACEHOLDER: &str = "*GitHub activity and notes will be added here.*";

const WEEK_HEADER: &str = "| Mon | Tue | Wed | Thu | Fri | Sat | Sun |";
const WEEK_RULE: &str = "|-----|-----|-----|-----|-----|-----|-----|";

/// `# July 2025`
pub fn month_title(month: NaiveDate) -> String {
    format!("# {} {}", month_name(month), month.year())
}

/// Weeks of the month as Monday-first rows; `None` pads days outside it.
fn weeks(month: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let mut cells: Vec<Option<NaiveDate>> = Vec::with_capacity(42);
    let first = days_of_month(month).next().unwrap_or(month);
    cells.extend(std::iter::repeat(None).take(first.weekday().num_days_from_monday() as usize));
    cells.extend(days_of_month(month).map(Some));
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    cells
        .chunks(7)
        .map(|chunk| {
            let mut row = [None; 7];
            row.copy_from_slice(chunk);
            row
        })
        .collect()
}

pub fn calendar_view_section(month: NaiveDate) -> String {
    let mut lines = vec![
        CALENDAR_VIEW_HEADING.to_string(),
        String::new(),
        WEEK_HEADER.to_string(),
        WEEK_RULE.to_string(),
    ];
    for week in weeks(month) {
        let mut row = String::from("|");
        for cell in week {
            match cell {
                Some(day) => row.push_str(&format!(
                    " [[{}|{}]] |",
                    daily_note_filename(day),
                    day.day()
                )),
                None => row.push_str(" |"),
            }
        }
        lines.push(row);
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn quick_links_section(month: NaiveDate) -> String {
    let mut lines = vec![QUICK_LINKS_HEADING.to_string(), String::new()];
    lines.extend(days_of_month(month).map(|day| {
        format!(
            "- [[{}|{}]]",
            daily_note_filename(day),
            day.format("%A, %B %-d")
        )
    }));
    lines.push(String::new());
    lines.join("\n")
}

/// Monthly summary built from per-day statistics. Days without commits are
/// skipped; an inactive month keeps the placeholder line.
pub fn monthly_summary_section(days: &BTreeMap<NaiveDate, DayStats>) -> String {
    let active: Vec<(&NaiveDate, &DayStats)> =
        days.iter().filter(|(_, stats)| stats.commits > 0).collect();

    let mut lines = vec![MONTHLY_SUMMARY_HEADING.to_string(), String::new()];
    if active.is_empty() {
        lines.push(MONTHLY_SUMMARY_PLACEHOLDER.to_string());
    } else {
        let commits: usize = active.iter().map(|(_, s)| s.commits).sum();
        let additions: u64 = active.iter().map(|(_, s)| s.additions).sum();
        let deletions: u64 = active.iter().map(|(_, s)| s.deletions).sum();
        lines.push(format!(
            "**Active days:** {} | **Commits:** {} | **Changes:** +{} -{} lines",
            active.len(),
            commits,
            additions,
            deletions
        ));
        lines.push(String::new());
        for (day, stats) in active {
            lines.push(format!(
                "- [[{}|{}]]: {}",
                daily_note_filename(*day),
                day.format("%A, %B %-d"),
                stats_phrase(stats)
            ));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

/// A fresh calendar note for the month containing `month`.
pub fn month_calendar(month: NaiveDate) -> String {
    format!(
        "{}\n\n{}\n{}\n{}",
        month_title(month),
        calendar_view_section(month),
        monthly_summary_section(&BTreeMap::new()),
        quick_links_section(month),
    )
}

fn title_regex() -> Option<Regex> {
    Regex::new(r"(?m)^# [A-Za-z]+ \d{4}[ \t]*$").ok()
}

/// Re-target another month's calendar note at `month`.
///
/// The title is rewritten, the Calendar View and Quick Links sections are
/// regenerated and the Monthly Summary is reset to its placeholder.
/// Everything else, including user sections, is kept.
pub fn adapt_template(template: &str, month: NaiveDate) -> String {
    let title = month_title(month);
    let mut text = match title_regex() {
        Some(re) => re.replacen(template, 1, title.as_str()).into_owned(),
        None => template.to_string(),
    };

    text = replace_section(&text, CALENDAR_VIEW_HEADING, &calendar_view_section(month));
    text = replace_section(
        &text,
        MONTHLY_SUMMARY_HEADING,
        &monthly_summary_section(&BTreeMap::new()),
    );
    replace_section(&text, QUICK_LINKS_HEADING, &quick_links_section(month))
}

fn replace_section(text: &str, heading: &str, block: &str) -> String {
    let doc = Document::parse(text);
    match doc.locate(heading) {
        Some(span) => doc
            .splice(span, Some(block))
            .unwrap_or_else(|_| text.to_string()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_calendar_layout() {
        // July 2025 starts on a Tuesday.
        let text = month_calendar(date(2025, 7, 1));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# July 2025");
        assert_eq!(lines[2], CALENDAR_VIEW_HEADING);
        assert_eq!(lines[4], WEEK_HEADER);
        assert_eq!(
            lines[6],
            "| | [[01-07-2025.md|1]] | [[02-07-2025.md|2]] | [[03-07-2025.md|3]] | [[04-07-2025.md|4]] | [[05-07-2025.md|5]] | [[06-07-2025.md|6]] |"
        );
        assert!(text.contains("| [[28-07-2025.md|28]] | [[29-07-2025.md|29]] | [[30-07-2025.md|30]] | [[31-07-2025.md|31]] | | | |"));
        assert!(text.contains(&format!("{MONTHLY_SUMMARY_HEADING}\n\n{MONTHLY_SUMMARY_PLACEHOLDER}\n\n{QUICK_LINKS_HEADING}")));
        assert!(text.contains("- [[18-07-2025.md|Friday, July 18]]"));
        assert!(text.contains("- [[01-07-2025.md|Tuesday, July 1]]"));
        assert!(text.ends_with("- [[31-07-2025.md|Thursday, July 31]]\n"));
    }

    #[test]
    fn test_week_rows() {
        // September 2025 starts on a Monday and spans five rows.
        assert_eq!(weeks(date(2025, 9, 1)).len(), 5);
        assert_eq!(weeks(date(2025, 9, 1))[0][0], Some(date(2025, 9, 1)));
        // February 2021 fits exactly four rows.
        assert_eq!(weeks(date(2021, 2, 10)).len(), 4);
        // March 2025 starts on a Saturday and needs six.
        assert_eq!(weeks(date(2025, 3, 1)).len(), 6);
    }

    #[test]
    fn test_monthly_summary_section() {
        let mut days = BTreeMap::new();
        days.insert(
            date(2025, 7, 18),
            DayStats {
                commits: 3,
                repos: 2,
                additions: 10,
                deletions: 4,
            },
        );
        days.insert(date(2025, 7, 19), DayStats::default());
        days.insert(
            date(2025, 7, 2),
            DayStats {
                commits: 1,
                repos: 1,
                additions: 5,
                deletions: 0,
            },
        );

        let section = monthly_summary_section(&days);
        assert_eq!(
            section,
            "## 📊 Monthly Summary\n\n\
             **Active days:** 2 | **Commits:** 4 | **Changes:** +15 -4 lines\n\n\
             - [[02-07-2025.md|Wednesday, July 2]]: 1 commit across 1 repository, +5 -0 lines\n\
             - [[18-07-2025.md|Friday, July 18]]: 3 commits across 2 repositories, +10 -4 lines\n"
        );

        assert_eq!(
            monthly_summary_section(&BTreeMap::new()),
            format!("{MONTHLY_SUMMARY_HEADING}\n\n{MONTHLY_SUMMARY_PLACEHOLDER}\n")
        );
    }

    #[test]
    fn test_adapt_template_keeps_user_edits() {
        let template = month_calendar(date(2025, 7, 1)) + "\n## Goals\n- learn rust\n";

        let adapted = adapt_template(&template, date(2025, 8, 1));
        assert!(adapted.starts_with("# August 2025\n"));
        assert!(adapted.contains("[[31-08-2025.md|31]]"));
        assert!(!adapted.contains("07-2025.md"));
        assert!(adapted.contains("- [[01-08-2025.md|Friday, August 1]]"));
        assert!(adapted.ends_with("\n## Goals\n- learn rust\n"));
    }

    #[test]
    fn test_adapt_template_resets_monthly_summary() {
        let mut july_stats = BTreeMap::new();
        july_stats.insert(
            date(2025, 7, 18),
            DayStats {
                commits: 3,
                repos: 2,
                additions: 40,
                deletions: 7,
            },
        );
        let july = month_calendar(date(2025, 7, 1)).replace(
            &monthly_summary_section(&BTreeMap::new()),
            &monthly_summary_section(&july_stats),
        );
        assert!(july.contains("[[18-07-2025.md|Friday, July 18]]: 3 commits"));

        let august = adapt_template(&july, date(2025, 8, 1));
        assert!(!august.contains("18-07-2025.md"));
        assert!(!august.contains("**Active days:**"));
        assert!(august.contains(&format!(
            "{MONTHLY_SUMMARY_HEADING}\n\n{MONTHLY_SUMMARY_PLACEHOLDER}\n"
        )));
        assert_eq!(august, month_calendar(date(2025, 8, 1)));
    }

    #[test]
    fn test_adapting_a_fresh_calendar_equals_generating() {
        let july = month_calendar(date(2025, 7, 1));
        assert_eq!(adapt_template(&july, date(2025, 8, 1)), month_calendar(date(2025, 8, 1)));
    }

    #[test]
    fn test_adapt_template_without_sections() {
        let adapted = adapt_template("# June 2025\n\nfree-form notes\n", date(2025, 2, 1));
        assert_eq!(adapted, "# February 2025\n\nfree-form notes\n");
    }
}
