//! GitHub fetch layer for vaultsync.

pub mod client;
pub mod fetch;

pub use client::GitHubClient;
pub use fetch::{CommitFetcher, CommitSource, CommitsByDay};
