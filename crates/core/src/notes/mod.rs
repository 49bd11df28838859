//! Note merge engine and the note formats built on it.
//!
//! [`SectionLocator`] finds a `## ` section by its marker line and
//! [`SectionMerger`] splices a freshly rendered body into a note. Both are
//! pure text transforms; reading and writing notes is the job of
//! [`crate::store::NoteStore`].

pub mod calendar;
pub mod layout;
pub mod merge;
pub mod render;
pub mod section;

pub use layout::{daily_header, VaultLayout};
pub use merge::{EmptySectionPolicy, Existing, MergeAction, MergeResult, SectionMerger};
pub use render::{BriefFormat, CommitFormat, DetailedFormat, Renderer};
pub use section::{locate, Document, SectionLocator, SectionSpan, HEADING_PREFIX};
