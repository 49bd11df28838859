//! Commit message cleanup: readable one-liners, automated-commit filtering,
//! and escaping of heading-like lines before they are rendered into a note.

/// Conventional-commit prefixes stripped by [`readable_message`], matched
/// case-insensitively.
const CONVENTIONAL_PREFIXES: &[&str] = &[
    "feat:", "fix:", "docs:", "style:", "refactor:", "test:", "chore:", "perf:", "ci:",
    "build:", "revert:", "[feat]", "[fix]", "[docs]", "[style]", "[refactor]", "[test]",
    "[chore]", "feat(", "fix(", "docs(", "style(", "refactor(", "test(", "chore(",
];

/// Longest rendered message, ellipsis included.
pub const MAX_MESSAGE_CHARS: usize = 100;

/// Turn a raw commit message into a short, capitalized sentence.
///
/// `fix(parser): handle empty input.` becomes `Handle empty input`.
pub fn readable_message(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or("").trim();
    let mut text = first_line;

    let lower = text.to_lowercase();
    if let Some(prefix) = CONVENTIONAL_PREFIXES.iter().find(|p| lower.starts_with(*p)) {
        if let Some(rest) = text.get(prefix.len()..) {
            text = rest.trim();
        }
    }

    // `feat(scope): ...` leaves `scope): ...` behind.
    if text.contains('(') || text.contains(')') {
        if let Some(idx) = text.find(':') {
            text = text[idx + 1..].trim();
        }
    }

    let text = text.trim_end_matches(&['.', '!', '?'][..]).trim_end();
    if text.is_empty() {
        return first_line.to_string();
    }

    truncate(&capitalize(text), MAX_MESSAGE_CHARS)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate to at most `max` characters, ending in `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Whether `message` contains any of `keywords`, ignoring case.
pub fn is_filtered(message: &str, keywords: &[String]) -> bool {
    let lower = message.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| lower.contains(&k.to_lowercase()))
}

/// Escape every line whose trimmed form starts with `#`, so message text can
/// never be mistaken for a section heading.
pub fn escape_headings(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                let indent = &line[..line.len() - trimmed.len()];
                format!("{indent}\\{trimmed}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
