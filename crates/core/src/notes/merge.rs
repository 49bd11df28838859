//! Section merging: insert, replace, or delete one marker-identified section
//! while leaving the rest of the note untouched.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::section::{Document, SectionLocator};
use crate::errors::NoteError;

/// Line written under the marker when an empty day is rendered as a
/// placeholder section.
pub const DEFAULT_PLACEHOLDER: &str = "*No GitHub activity for this day.*";

/// What an empty section body turns into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptySectionPolicy {
    /// Write nothing: new notes get the header only and stale sections are
    /// removed.
    #[default]
    Omit,
    /// Write a placeholder section in place of the empty body.
    Placeholder,
}

/// Existing note text, or the header to start a new note with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing<'a> {
    Present(&'a str),
    Absent { header: &'a str },
}

/// Which branch of the merge was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// New note built from the header (and body, if any).
    Created,
    /// Existing section replaced by the body.
    Replaced,
    /// Existing section removed because the body was empty.
    Removed,
    /// Section appended at the end of the note.
    Appended,
    /// Nothing to insert and nothing to remove.
    Untouched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub text: String,
    pub action: MergeAction,
}

/// Merges freshly rendered section bodies into notes.
#[derive(Debug, Clone)]
pub struct SectionMerger {
    locator: SectionLocator,
    policy: EmptySectionPolicy,
    placeholder: String,
}

impl SectionMerger {
    pub fn new(marker: &str) -> Result<Self, NoteError> {
        Ok(Self {
            locator: SectionLocator::new(marker)?,
            policy: EmptySectionPolicy::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        })
    }

    pub fn with_policy(mut self, policy: EmptySectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn marker(&self) -> &str {
        self.locator.marker()
    }

    pub fn locator(&self) -> &SectionLocator {
        &self.locator
    }

    pub fn policy(&self) -> EmptySectionPolicy {
        self.policy
    }

    /// The section written for an empty body under
    /// [`EmptySectionPolicy::Placeholder`].
    pub fn placeholder_section(&self) -> String {
        format!("{}\n\n{}\n", self.marker(), self.placeholder)
    }

    /// Merge `body` into `existing`.
    ///
    /// A blank `body` means "no activity". Under the default policy it
    /// removes the section from an existing note and yields a header-only
    /// new note. A non-empty `body` must start with the marker line so that
    /// the next merge finds and replaces it.
    pub fn merge(&self, existing: Existing<'_>, body: &str) -> MergeResult {
        let body = self.effective_body(body);
        if !body.is_empty() && body.lines().next().map(str::trim) != Some(self.marker()) {
            warn!(
                marker = self.marker(),
                "section body does not start with its marker; repeated merges will append"
            );
        }

        match existing {
            Existing::Absent { header } => {
                debug!(marker = self.marker(), "creating new note");
                let text = if body.is_empty() {
                    format!("{header}\n")
                } else {
                    [header, "", &body].join("\n")
                };
                MergeResult {
                    text,
                    action: MergeAction::Created,
                }
            }
            Existing::Present(text) => self.merge_present(text, &body),
        }
    }

    fn merge_present(&self, text: &str, body: &str) -> MergeResult {
        let doc = Document::parse(text);
        let span = self.locator.locate(&doc);

        match (span, body.is_empty()) {
            (Some(span), false) => MergeResult {
                text: splice_checked(&doc, span, Some(body), text),
                action: MergeAction::Replaced,
            },
            (Some(span), true) => MergeResult {
                text: splice_checked(&doc, span, None, text),
                action: MergeAction::Removed,
            },
            (None, false) => MergeResult {
                text: append_block(text, body),
                action: MergeAction::Appended,
            },
            (None, true) => MergeResult {
                text: text.to_string(),
                action: MergeAction::Untouched,
            },
        }
    }

    /// Remove the section if it holds nothing but the placeholder line.
    /// Returns `None` when there is nothing to clean.
    pub fn strip_placeholder(&self, text: &str) -> Option<String> {
        let doc = Document::parse(text);
        let span = self.locator.locate(&doc)?;
        let lines = doc.section_lines(span).ok()?;

        let mut content = lines[1..].iter().map(|l| l.trim()).filter(|l| !l.is_empty());
        let only_placeholder = content.next() == Some(self.placeholder.trim())
            && content.next().is_none();
        if !only_placeholder {
            return None;
        }
        doc.splice(span, None).ok()
    }

    fn effective_body<'b>(&self, body: &'b str) -> Cow<'b, str> {
        if !body.trim().is_empty() {
            return Cow::Borrowed(body);
        }
        match self.policy {
            EmptySectionPolicy::Omit => Cow::Borrowed(""),
            EmptySectionPolicy::Placeholder => Cow::Owned(self.placeholder_section()),
        }
    }
}

// Spans from `locate` always fit the document they came from.
fn splice_checked(
    doc: &Document<'_>,
    span: super::section::SectionSpan,
    replacement: Option<&str>,
    original: &str,
) -> String {
    match doc.splice(span, replacement) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "located span rejected by splice; leaving note unchanged");
            original.to_string()
        }
    }
}

/// Append `block` as the final block, separated from existing content by
/// exactly one blank line.
fn append_block(text: &str, block: &str) -> String {
    if text.is_empty() {
        return block.to_string();
    }
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|l| !l.trim().is_empty()) {
        lines.push("");
    }
    lines.push(block);
    lines.join("\n")
}
