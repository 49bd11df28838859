//! Rendering commit lists into a section body.
//!
//! The [`Renderer`] owns the section layout (marker, summary line, one entry
//! per commit). How a single commit is written is a [`CommitFormat`]
//! strategy injected at construction.

use std::sync::OnceLock;

use regex_lite::Regex;

use super::section::SectionLocator;
use crate::commit_text::escape_headings;
use crate::config::{CommitFormatKind, SyncConfig};
use crate::errors::NoteError;
use crate::models::{ChangeStats, CommitRecord, DayStats, NO_EXTENSION};

// ---------------------------------------------------------------------------
// Commit format strategies
// ---------------------------------------------------------------------------

/// Renders one commit as a self-contained block of lines (no trailing
/// newline).
pub trait CommitFormat: Send + Sync {
    fn format(&self, commit: &CommitRecord) -> String;
}

/// Heading per commit with file-level details.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailedFormat;

/// Files listed individually when a commit touches at most this many.
const MAX_LISTED_FILES: usize = 5;

impl CommitFormat for DetailedFormat {
    fn format(&self, commit: &CommitRecord) -> String {
        let mut lines = vec![
            format!("### [{}]({}) - {}", commit.repo, commit.url, commit.sha),
            format!("**{}**", escape_headings(&commit.readable_message)),
        ];

        if let Some(stats) = &commit.changes {
            lines.push(format!("- Files changed: {}", stats.total_files));
            if stats.additions > 0 {
                lines.push(format!("- Additions: +{}", stats.additions));
            }
            if stats.deletions > 0 {
                lines.push(format!("- Deletions: -{}", stats.deletions));
            }

            let types = file_type_labels(stats, " files");
            if !types.is_empty() {
                lines.push(format!("- File types: {}", types.join(", ")));
            }

            if !stats.files.is_empty() && stats.files.len() <= MAX_LISTED_FILES {
                lines.push("- Files:".to_string());
                for file in &stats.files {
                    let mut change = Vec::new();
                    if file.additions > 0 {
                        change.push(format!("+{}", file.additions));
                    }
                    if file.deletions > 0 {
                        change.push(format!("-{}", file.deletions));
                    }
                    let change = if change.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", change.join(", "))
                    };
                    lines.push(format!(
                        "  - {} {}{}",
                        file.status.emoji(),
                        file.filename,
                        change
                    ));
                }
            }
        }

        lines.join("\n")
    }
}

/// Two or three `<small>` lines per commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BriefFormat {
    pub show_time: bool,
}

impl CommitFormat for BriefFormat {
    fn format(&self, commit: &CommitRecord) -> String {
        let time = if self.show_time {
            format!(" ({})", estimate_time(commit))
        } else {
            String::new()
        };

        let mut lines = vec![
            format!(
                "<small>**[{}]({})** - {}{}</small>",
                commit.repo, commit.url, commit.sha, time
            ),
            format!("<small>{}</small>", escape_headings(&commit.readable_message)),
        ];

        if let Some(stats) = &commit.changes {
            let mut parts = Vec::new();
            if stats.total_files > 0 {
                parts.push(format!("{} files", stats.total_files));
            }
            if stats.additions > 0 {
                parts.push(format!("+{}", stats.additions));
            }
            if stats.deletions > 0 {
                parts.push(format!("-{}", stats.deletions));
            }
            parts.extend(file_type_labels(stats, "").into_iter().take(2));
            if !parts.is_empty() {
                lines.push(format!("<small>📄 {}</small>", parts.join(", ")));
            }
        }

        lines.join("\n")
    }
}

fn file_type_labels(stats: &ChangeStats, suffix: &str) -> Vec<String> {
    stats
        .file_types()
        .into_iter()
        .map(|(ext, count)| {
            if ext == NO_EXTENSION {
                format!("{count} files")
            } else {
                format!("{count} {ext}{suffix}")
            }
        })
        .collect()
}

/// Rough effort estimate from the number of changed lines.
pub fn estimate_time(commit: &CommitRecord) -> &'static str {
    match commit.additions() + commit.deletions() {
        0 => "~5 min",
        1..=49 => "~15 min",
        50..=199 => "~30 min",
        200..=499 => "~1 hour",
        _ => "~2+ hours",
    }
}

// ---------------------------------------------------------------------------
// Summary line
// ---------------------------------------------------------------------------

/// `3 commits across 2 repositories, +10 -4 lines`
pub fn stats_phrase(stats: &DayStats) -> String {
    format!(
        "{} {} across {} {}, +{} -{} lines",
        stats.commits,
        if stats.commits == 1 { "commit" } else { "commits" },
        stats.repos,
        if stats.repos == 1 {
            "repository"
        } else {
            "repositories"
        },
        stats.additions,
        stats.deletions,
    )
}

/// `**Summary:** 3 commits across 2 repositories, +10 -4 lines`
pub fn summary_line(stats: &DayStats) -> String {
    format!("**Summary:** {}", stats_phrase(stats))
}

fn summary_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\*\*Summary:\*\* (\d+) commits? across (\d+) repositor(?:y|ies)(?:, \+(\d+) -(\d+) lines)?",
        )
        .ok()
    })
    .as_ref()
}

/// Parse a line written by [`summary_line`]. The change counts are optional
/// so older notes without them still parse.
pub fn parse_summary_line(line: &str) -> Option<DayStats> {
    let caps = summary_regex()?.captures(line.trim())?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    Some(DayStats {
        commits: num(1)? as usize,
        repos: num(2)? as usize,
        additions: num(3).unwrap_or(0),
        deletions: num(4).unwrap_or(0),
    })
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Builds section bodies for one marker.
pub struct Renderer {
    locator: SectionLocator,
    format: Box<dyn CommitFormat>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("marker", &self.locator.marker())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(marker: &str, format: Box<dyn CommitFormat>) -> Result<Self, NoteError> {
        Ok(Self {
            locator: SectionLocator::new(marker)?,
            format,
        })
    }

    /// Renderer for the activity section as configured in `[sync]`.
    pub fn from_config(sync: &SyncConfig) -> Result<Self, NoteError> {
        let format: Box<dyn CommitFormat> = match sync.commit_format {
            CommitFormatKind::Detailed => Box::new(DetailedFormat),
            CommitFormatKind::Brief => Box::new(BriefFormat {
                show_time: sync.show_commit_time,
            }),
        };
        Self::new(&sync.activity_heading, format)
    }

    pub fn marker(&self) -> &str {
        self.locator.marker()
    }

    /// Render `commits` in the given order. An empty list renders an empty
    /// body.
    pub fn render(&self, commits: &[CommitRecord]) -> String {
        if commits.is_empty() {
            return String::new();
        }

        let mut lines = vec![
            self.marker().to_string(),
            String::new(),
            summary_line(&DayStats::from_commits(commits)),
            String::new(),
        ];
        for commit in commits {
            lines.push(self.format.format(commit));
            lines.push(String::new());
        }
        lines.join("\n")
    }

    /// Statistics recorded in the summary line of an already rendered
    /// section inside `note`.
    pub fn read_day_stats(&self, note: &str) -> Option<DayStats> {
        let doc = super::section::Document::parse(note);
        let span = self.locator.locate(&doc)?;
        doc.section_lines(span)
            .ok()?
            .iter()
            .find_map(|line| parse_summary_line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileChange, FileStatus};
    use chrono::{TimeZone, Utc};

    const MARKER: &str = "## 📊 GitHub Activity";

    fn commit(repo: &str, message: &str, changes: Option<ChangeStats>) -> CommitRecord {
        CommitRecord {
            repo: repo.into(),
            sha: "1a2b3c4d".into(),
            message: message.into(),
            readable_message: message.into(),
            url: format!("https://github.com/octocat/{repo}/commit/1a2b3c4d"),
            timestamp: Utc.with_ymd_and_hms(2025, 7, 18, 9, 0, 0).unwrap(),
            changes,
        }
    }

    fn file(name: &str, status: FileStatus, additions: u64, deletions: u64) -> FileChange {
        FileChange {
            filename: name.into(),
            status,
            additions,
            deletions,
        }
    }

    fn stats() -> ChangeStats {
        ChangeStats::from_files(vec![
            file("src/lib.rs", FileStatus::Modified, 10, 2),
            file("README.md", FileStatus::Added, 5, 0),
            file("Makefile", FileStatus::Removed, 0, 7),
        ])
    }

    #[test]
    fn test_empty_commit_list_renders_empty_body() {
        let renderer = Renderer::new(MARKER, Box::new(DetailedFormat)).unwrap();
        assert_eq!(renderer.render(&[]), "");
    }

    #[test]
    fn test_body_layout_and_input_order() {
        let renderer = Renderer::new(MARKER, Box::new(DetailedFormat)).unwrap();
        let commits = vec![
            commit("vault", "Second", None),
            commit("tracker", "First", None),
        ];
        let body = renderer.render(&commits);
        let expected = "## 📊 GitHub Activity\n\n\
            **Summary:** 2 commits across 2 repositories, +0 -0 lines\n\n\
            ### [vault](https://github.com/octocat/vault/commit/1a2b3c4d) - 1a2b3c4d\n**Second**\n\n\
            ### [tracker](https://github.com/octocat/tracker/commit/1a2b3c4d) - 1a2b3c4d\n**First**\n";
        assert_eq!(body, expected);
    }

    #[test]
    fn test_detailed_format_with_stats() {
        let out = DetailedFormat.format(&commit("vault", "Add view", Some(stats())));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "**Add view**");
        assert_eq!(lines[2], "- Files changed: 3");
        assert_eq!(lines[3], "- Additions: +15");
        assert_eq!(lines[4], "- Deletions: -9");
        assert_eq!(lines[5], "- File types: 1 .md files, 1 .rs files, 1 files");
        assert_eq!(lines[6], "- Files:");
        assert_eq!(lines[7], "  - ✏️ src/lib.rs (+10, -2)");
        assert_eq!(lines[8], "  - ➕ README.md (+5)");
        assert_eq!(lines[9], "  - 🗑️ Makefile (-7)");
    }

    #[test]
    fn test_detailed_format_skips_long_file_lists() {
        let files = (0..6)
            .map(|i| file(&format!("f{i}.rs"), FileStatus::Modified, 1, 0))
            .collect();
        let out = DetailedFormat.format(&commit("vault", "Big", Some(ChangeStats::from_files(files))));
        assert!(out.contains("- File types: 6 .rs files"));
        assert!(!out.contains("- Files:"));
    }

    #[test]
    fn test_brief_format() {
        let brief = BriefFormat { show_time: true };
        let out = brief.format(&commit("vault", "Add view", Some(stats())));
        assert_eq!(
            out,
            "<small>**[vault](https://github.com/octocat/vault/commit/1a2b3c4d)** - 1a2b3c4d (~15 min)</small>\n\
             <small>Add view</small>\n\
             <small>📄 3 files, +15, -9, 1 .md, 1 .rs</small>"
        );

        let quiet = BriefFormat { show_time: false };
        let out = quiet.format(&commit("vault", "Tiny", None));
        assert_eq!(out.lines().count(), 2);
        assert!(!out.contains("min"));
    }

    #[test]
    fn test_estimate_time_buckets() {
        let with = |a, d| commit("r", "m", Some(ChangeStats::from_files(vec![file("x", FileStatus::Modified, a, d)])));
        assert_eq!(estimate_time(&commit("r", "m", None)), "~5 min");
        assert_eq!(estimate_time(&with(30, 19)), "~15 min");
        assert_eq!(estimate_time(&with(50, 0)), "~30 min");
        assert_eq!(estimate_time(&with(300, 199)), "~1 hour");
        assert_eq!(estimate_time(&with(500, 0)), "~2+ hours");
    }

    #[test]
    fn test_messages_cannot_inject_headings() {
        let renderer = Renderer::new(MARKER, Box::new(BriefFormat::default())).unwrap();
        let body = renderer.render(&[commit("vault", "## 📊 GitHub Activity", None)]);
        let headings = body
            .lines()
            .filter(|l| l.trim() == MARKER)
            .count();
        assert_eq!(headings, 1);
    }

    #[test]
    fn test_summary_line_grammar() {
        let one = DayStats {
            commits: 1,
            repos: 1,
            additions: 3,
            deletions: 0,
        };
        assert_eq!(
            summary_line(&one),
            "**Summary:** 1 commit across 1 repository, +3 -0 lines"
        );
    }

    #[test]
    fn test_parse_summary_line() {
        let stats = DayStats {
            commits: 4,
            repos: 2,
            additions: 120,
            deletions: 7,
        };
        assert_eq!(parse_summary_line(&summary_line(&stats)), Some(stats));

        let legacy = parse_summary_line("**Summary:** 3 commits across 1 repositories").unwrap();
        assert_eq!(legacy.commits, 3);
        assert_eq!(legacy.additions, 0);

        assert_eq!(parse_summary_line("Summary: none"), None);
    }

    #[test]
    fn test_read_day_stats_from_note() {
        let renderer = Renderer::new(MARKER, Box::new(DetailedFormat)).unwrap();
        let body = renderer.render(&[commit("vault", "Add view", Some(stats()))]);
        let note = format!("# Friday, July 18, 2025\n\n{body}\n## Notes\n**Summary:** 9 commits across 9 repositories\n");
        let parsed = renderer.read_day_stats(&note).unwrap();
        assert_eq!(parsed.commits, 1);
        assert_eq!(parsed.additions, 15);
        assert_eq!(renderer.read_day_stats("# Empty day\n"), None);
    }

    #[test]
    fn test_from_config_picks_strategy() {
        let mut sync = SyncConfig::default();
        sync.commit_format = CommitFormatKind::Brief;
        let renderer = Renderer::from_config(&sync).unwrap();
        let body = renderer.render(&[commit("vault", "Add view", None)]);
        assert!(body.contains("<small>Add view</small>"));
        assert_eq!(renderer.marker(), "## 📊 GitHub Activity");
    }
}
