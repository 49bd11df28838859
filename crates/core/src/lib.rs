//! vaultsync core library.
//!
//! This crate provides the building blocks for mirroring GitHub commit
//! history into a notes vault: configuration, the note merge engine
//! (section locating and splicing), commit renderers, the daily-note and
//! monthly-calendar layout, the GitHub fetch layer, note storage, and the
//! sync engine that ties them together.

pub mod commit_text;
pub mod config;
pub mod errors;
pub mod github;
pub mod models;
pub mod notes;
pub mod store;
pub mod sync_engine;
pub mod tracker;

// Re-exports for convenience.
pub use config::AppConfig;
pub use notes::{SectionLocator, SectionMerger};
pub use store::{FsNoteStore, NoteStore};
pub use sync_engine::VaultSync;
pub use tracker::Tracker;
