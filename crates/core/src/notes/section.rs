//! Section locating over a flat line model of a markdown note.
//!
//! A note is split on `\n` into lines, and every line is classified as a
//! level-2 heading, a code-fence delimiter, or body text. Lines inside fenced
//! code blocks are always body text, so a marker quoted in a code block never
//! starts or ends a section.

use crate::errors::NoteError;

/// Prefix shared by every recognized section heading.
pub const HEADING_PREFIX: &str = "## ";

/// Half-open line range `[start, end)` of a section, heading included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub start: usize,
    pub end: usize,
}

impl SectionSpan {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classification of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A `## ` heading outside any code fence.
    Heading,
    /// A ```` ``` ```` or `~~~` fence delimiter.
    Fence,
    /// Anything else, including every line inside a fence.
    Body,
}

/// A note split into classified lines. Borrowed from the source text.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    lines: Vec<&'a str>,
    kinds: Vec<LineKind>,
}

impl<'a> Document<'a> {
    /// Split `text` on `\n`. A trailing newline yields a final empty line,
    /// so joining the lines with `\n` reproduces `text` exactly.
    pub fn parse(text: &'a str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut kinds = Vec::with_capacity(lines.len());
        let mut open_fence: Option<char> = None;

        for line in &lines {
            let trimmed = line.trim();
            let kind = match open_fence {
                Some(ch) => {
                    if is_fence(trimmed, ch) {
                        open_fence = None;
                        LineKind::Fence
                    } else {
                        LineKind::Body
                    }
                }
                None => {
                    if let Some(ch) = fence_char(trimmed) {
                        open_fence = Some(ch);
                        LineKind::Fence
                    } else if trimmed.starts_with(HEADING_PREFIX) {
                        LineKind::Heading
                    } else {
                        LineKind::Body
                    }
                }
            };
            kinds.push(kind);
        }

        Self { lines, kinds }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn kind(&self, index: usize) -> Option<LineKind> {
        self.kinds.get(index).copied()
    }

    /// Find the section headed by `marker`.
    ///
    /// The section starts at the first heading whose trimmed text equals
    /// `marker` and ends at the next heading with different text, or at the
    /// end of the document. Later duplicates of `marker` are body content of
    /// the first section.
    pub fn locate(&self, marker: &str) -> Option<SectionSpan> {
        let marker = marker.trim();
        let start = (0..self.lines.len()).find(|&i| {
            self.kinds[i] == LineKind::Heading && self.lines[i].trim() == marker
        })?;

        let end = (start + 1..self.lines.len())
            .find(|&i| self.kinds[i] == LineKind::Heading && self.lines[i].trim() != marker)
            .unwrap_or(self.lines.len());

        Some(SectionSpan { start, end })
    }

    /// The lines of `span`, heading included.
    pub fn section_lines(&self, span: SectionSpan) -> Result<&[&'a str], NoteError> {
        self.check_span(span)?;
        Ok(&self.lines[span.start..span.end])
    }

    /// Replace the lines of `span` with `replacement` as a single block, or
    /// drop them when `replacement` is `None`. Lines outside the span are
    /// kept byte-for-byte.
    pub fn splice(&self, span: SectionSpan, replacement: Option<&str>) -> Result<String, NoteError> {
        self.check_span(span)?;
        let mut out: Vec<&str> = Vec::with_capacity(self.lines.len() + 1);
        out.extend_from_slice(&self.lines[..span.start]);
        if let Some(block) = replacement {
            out.push(block);
        }
        out.extend_from_slice(&self.lines[span.end..]);
        Ok(out.join("\n"))
    }

    fn check_span(&self, span: SectionSpan) -> Result<(), NoteError> {
        if span.start > span.end || span.end > self.lines.len() {
            return Err(NoteError::InvalidSpan {
                start: span.start,
                end: span.end,
                len: self.lines.len(),
            });
        }
        Ok(())
    }
}

fn fence_char(trimmed: &str) -> Option<char> {
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

fn is_fence(trimmed: &str, ch: char) -> bool {
    trimmed.chars().take_while(|&c| c == ch).count() >= 3
}

/// Locates one marker-identified section type.
#[derive(Debug, Clone)]
pub struct SectionLocator {
    marker: String,
}

impl SectionLocator {
    /// Create a locator for `marker`, which must be a `## <label>` heading.
    pub fn new(marker: &str) -> Result<Self, NoteError> {
        let marker = marker.trim();
        if !marker.starts_with(HEADING_PREFIX) || marker.len() <= HEADING_PREFIX.len() {
            return Err(NoteError::InvalidMarker(marker.to_string()));
        }
        Ok(Self {
            marker: marker.to_string(),
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn locate(&self, document: &Document<'_>) -> Option<SectionSpan> {
        document.locate(&self.marker)
    }

    /// Locate directly in raw text.
    pub fn locate_in(&self, text: &str) -> Option<SectionSpan> {
        self.locate(&Document::parse(text))
    }
}

/// Locate `marker` in `text`.
pub fn locate(text: &str, marker: &str) -> Option<SectionSpan> {
    Document::parse(text).locate(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "# Monday\n\n## Activity\n\nold stuff\n\n## Notes\nkeep me\n";

    #[test]
    fn test_locate_section_followed_by_other_heading() {
        assert_eq!(
            locate(NOTE, "## Activity"),
            Some(SectionSpan { start: 2, end: 6 })
        );
    }

    #[test]
    fn test_locate_last_section_runs_to_end() {
        let span = locate(NOTE, "## Notes").unwrap();
        assert_eq!(span, SectionSpan { start: 6, end: 9 });
        assert_eq!(span.end, Document::parse(NOTE).line_count());
    }

    #[test]
    fn test_missing_marker_is_not_found() {
        assert_eq!(locate(NOTE, "## Missing"), None);
        assert_eq!(locate("", "## Activity"), None);
        // A prefix of an existing heading does not match.
        assert_eq!(locate(NOTE, "## Act"), None);
    }

    #[test]
    fn test_match_is_case_sensitive_and_edge_trimmed() {
        let text = "  ## Activity  \nbody\n";
        assert_eq!(
            locate(text, "## Activity"),
            Some(SectionSpan { start: 0, end: 3 })
        );
        assert_eq!(locate(text, "## activity"), None);
    }

    #[test]
    fn test_duplicate_marker_belongs_to_first_section() {
        let text = "## A\none\n## A\ntwo\n## B\n";
        assert_eq!(locate(text, "## A"), Some(SectionSpan { start: 0, end: 4 }));
    }

    #[test]
    fn test_deeper_headings_stay_inside_section() {
        let text = "## A\n### detail\n#### more\n## B\n";
        assert_eq!(locate(text, "## A"), Some(SectionSpan { start: 0, end: 3 }));
    }

    #[test]
    fn test_headings_inside_code_fences_are_ignored() {
        let text = "## A\n```\n## B\n```\nafter\n## C\n";
        assert_eq!(locate(text, "## A"), Some(SectionSpan { start: 0, end: 5 }));
        assert_eq!(locate(text, "## B"), None);

        let tilde = "intro\n~~~md\n## A\n~~~\n## A\nreal\n";
        assert_eq!(
            locate(tilde, "## A"),
            Some(SectionSpan { start: 4, end: 7 })
        );
    }

    #[test]
    fn test_unclosed_fence_swallows_rest() {
        let text = "## A\n```\n## B\n";
        assert_eq!(locate(text, "## A"), Some(SectionSpan { start: 0, end: 4 }));
    }

    #[test]
    fn test_line_kinds() {
        let doc = Document::parse("## A\n```\n## B\n```\ntext");
        assert_eq!(doc.kind(0), Some(LineKind::Heading));
        assert_eq!(doc.kind(1), Some(LineKind::Fence));
        assert_eq!(doc.kind(2), Some(LineKind::Body));
        assert_eq!(doc.kind(3), Some(LineKind::Fence));
        assert_eq!(doc.kind(4), Some(LineKind::Body));
        assert_eq!(doc.kind(5), None);
    }

    #[test]
    fn test_splice_replace_and_remove() {
        let doc = Document::parse(NOTE);
        let span = doc.locate("## Activity").unwrap();

        let replaced = doc.splice(span, Some("## Activity\n\nnew\n")).unwrap();
        assert_eq!(replaced, "# Monday\n\n## Activity\n\nnew\n\n## Notes\nkeep me\n");

        let removed = doc.splice(span, None).unwrap();
        assert_eq!(removed, "# Monday\n\n## Notes\nkeep me\n");
    }

    #[test]
    fn test_splice_rejects_bad_spans() {
        let doc = Document::parse("a\nb\n");
        assert_eq!(
            doc.splice(SectionSpan { start: 2, end: 1 }, None),
            Err(NoteError::InvalidSpan {
                start: 2,
                end: 1,
                len: 3
            })
        );
        assert!(doc.splice(SectionSpan { start: 0, end: 4 }, None).is_err());
        assert!(doc.section_lines(SectionSpan { start: 1, end: 9 }).is_err());
        // Empty spans at the end are valid insertion points.
        assert_eq!(
            doc.splice(SectionSpan { start: 3, end: 3 }, Some("c")).unwrap(),
            "a\nb\n\nc"
        );
    }

    #[test]
    fn test_parse_join_roundtrip_preserves_bytes() {
        for text in ["", "\n", "a", "a\n", "a\r\nb\r\n", "x\n\n\ny"] {
            let doc = Document::parse(text);
            assert_eq!(doc.lines().join("\n"), text);
        }
    }

    #[test]
    fn test_locator_validates_marker() {
        assert!(SectionLocator::new("## Activity").is_ok());
        assert_eq!(
            SectionLocator::new("Activity").unwrap_err(),
            NoteError::InvalidMarker("Activity".into())
        );
        assert!(SectionLocator::new("## ").is_err());
        assert!(SectionLocator::new("### Deep").is_err());

        let locator = SectionLocator::new("  ## Notes ").unwrap();
        assert_eq!(locator.marker(), "## Notes");
        assert_eq!(
            locator.locate_in(NOTE),
            Some(SectionSpan { start: 6, end: 9 })
        );
    }
}
