//! Error types for the vaultsync core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Note(#[from] NoteError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

// ---------------------------------------------------------------------------
// Note merge engine errors
// ---------------------------------------------------------------------------

/// Errors from the section locator / merger.
///
/// The merge engine is a pure text transformer; these only fire on invalid
/// input shapes, never on document content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    /// A splice span does not fit the document.
    #[error("invalid section span [{start}, {end}) for a document of {len} lines")]
    InvalidSpan { start: usize, end: usize, len: usize },

    /// A marker that is empty or not a level-2 heading.
    #[error("invalid section marker '{0}': expected a '## <label>' heading")]
    InvalidMarker(String),
}

// ---------------------------------------------------------------------------
// GitHub API errors
// ---------------------------------------------------------------------------

/// Errors from GitHub REST API interactions.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("GitHub HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("GitHub API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    /// Authentication token is missing or invalid.
    #[error("GitHub authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested repository or commit does not exist.
    #[error("GitHub resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("GitHub rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    /// A payload could not be interpreted.
    #[error("GitHub response parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A required environment variable is not set.
    #[error("required environment variable '{var}' is not set (referenced by config field '{field}')")]
    EnvVarMissing { var: String, field: String },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Vault storage errors
// ---------------------------------------------------------------------------

/// Errors from the note storage layer.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Reading a note failed for a reason other than absence.
    #[error("failed to read note '{}': {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing (or atomically replacing) a note failed.
    #[error("failed to write note '{}': {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Walking the vault directory tree failed.
    #[error("failed to scan vault directory '{}': {detail}", path.display())]
    ScanFailed { path: PathBuf, detail: String },
}

// ---------------------------------------------------------------------------
// Sync engine errors
// ---------------------------------------------------------------------------

/// Errors from the vault sync engine and tracker.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another run is already in progress.
    #[error("sync already in progress (started at {started_at})")]
    AlreadyRunning { started_at: String },

    /// The requested date range is empty or inverted.
    #[error("invalid date range: {from} is after {to}")]
    InvalidRange { from: String, to: String },

    /// A calendar date could not be constructed.
    #[error("invalid calendar date {year}-{month:02}")]
    InvalidDate { year: i32, month: u32 },

    /// Merge engine error during sync.
    #[error("sync note error: {0}")]
    NoteError(#[from] NoteError),

    /// Storage error during sync.
    #[error("sync vault error: {0}")]
    VaultError(#[from] VaultError),

    /// GitHub error during sync.
    #[error("sync GitHub error: {0}")]
    GitHubError(#[from] GitHubError),
}
