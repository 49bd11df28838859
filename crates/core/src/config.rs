//! Configuration for vaultsync.
//!
//! A single immutable [`AppConfig`] is loaded from TOML once at process
//! start, has its `*_env` references resolved, is validated, and is then
//! passed explicitly to every component constructor.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::notes::{EmptySectionPolicy, HEADING_PREFIX};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// GitHub account and API settings.
    pub github: GitHubConfig,

    /// Notes vault location and layout.
    pub vault: VaultConfig,

    /// Fetching, filtering and rendering behaviour.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Scheduler and logging settings for the daemon.
    #[serde(default)]
    pub daemon: DaemonConfig,
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// GitHub account and API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API base URL (default `https://api.github.com`).
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Account whose repositories and authored commits are tracked.
    pub username: String,

    /// Environment variable holding the GitHub personal access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Glob patterns of repository names to track. Empty = all.
    #[serde(default)]
    pub include_repos: Vec<String>,

    /// Glob patterns of repository names to skip.
    #[serde(default)]
    pub exclude_repos: Vec<String>,

    /// Resolved token (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub token: Option<String>,
}

impl GitHubConfig {
    /// Whether a repository name passes the include/exclude patterns.
    pub fn tracks_repo(&self, name: &str) -> bool {
        let included = self.include_repos.is_empty()
            || self
                .include_repos
                .iter()
                .any(|pat| glob_match::glob_match(pat, name));
        let excluded = self
            .exclude_repos
            .iter()
            .any(|pat| glob_match::glob_match(pat, name));
        included && !excluded
    }
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// Notes vault location and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Root directory of the vault. `~/` is expanded on resolve.
    pub path: PathBuf,

    /// Folder inside the vault that holds the year/month tree.
    #[serde(default = "default_calendar_folder")]
    pub calendar_folder: String,
}

fn default_calendar_folder() -> String {
    "Calendar".into()
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// How each commit entry is rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommitFormatKind {
    /// Heading per commit with file-level details.
    #[default]
    Detailed,
    /// Two or three `<small>` lines per commit.
    Brief,
}

/// Fetching, filtering and rendering behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Days covered by `backfill` when no explicit count is given.
    #[serde(default = "default_days_to_backfill")]
    pub days_to_backfill: u32,

    /// Commits kept per day after sorting newest-first.
    #[serde(default = "default_max_commits_per_day")]
    pub max_commits_per_day: usize,

    /// Drop commits whose message contains one of `filter_keywords`.
    #[serde(default = "default_true")]
    pub filter_keywords_enabled: bool,

    /// Case-insensitive keywords marking automated commits.
    #[serde(default = "default_filter_keywords")]
    pub filter_keywords: Vec<String>,

    /// Rewrite conventional-commit messages into plain sentences.
    #[serde(default = "default_true")]
    pub readable_messages: bool,

    /// Commit entry style.
    #[serde(default)]
    pub commit_format: CommitFormatKind,

    /// Append a rough time estimate to brief entries.
    #[serde(default)]
    pub show_commit_time: bool,

    /// What to write for a day without activity.
    #[serde(default)]
    pub empty_day: EmptySectionPolicy,

    /// Heading line of the activity section in daily notes.
    #[serde(default = "default_activity_heading")]
    pub activity_heading: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            days_to_backfill: default_days_to_backfill(),
            max_commits_per_day: default_max_commits_per_day(),
            filter_keywords_enabled: true,
            filter_keywords: default_filter_keywords(),
            readable_messages: true,
            commit_format: CommitFormatKind::default(),
            show_commit_time: false,
            empty_day: EmptySectionPolicy::default(),
            activity_heading: default_activity_heading(),
        }
    }
}

fn default_days_to_backfill() -> u32 {
    30
}

fn default_max_commits_per_day() -> usize {
    10
}

fn default_filter_keywords() -> Vec<String> {
    ["quartz", "sync", "update", "auto"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_activity_heading() -> String {
    "## 📊 GitHub Activity".into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Daemon
// ---------------------------------------------------------------------------

/// Scheduler and logging settings for the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between daily-note refreshes (default 3600).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for a daily-rolling log file. Console only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".into()
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve `*_env` fields from the environment and expand `~` in paths.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        info!("resolving environment variable references in config");

        self.github.token = resolve_optional_env(&self.github.token_env, "github.token_env");
        self.vault.path = expand_tilde(&self.vault.path);
        if let Some(dir) = &self.daemon.log_dir {
            self.daemon.log_dir = Some(expand_tilde(dir));
        }

        debug!("config environment variable resolution complete");
        Ok(())
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.username.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.username".into(),
                detail: "GitHub username must not be empty".into(),
            });
        }
        if self.github.api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.api_url".into(),
                detail: "GitHub API URL must not be empty".into(),
            });
        }
        if self.vault.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "vault.path".into(),
                detail: "vault path must not be empty".into(),
            });
        }
        if self.vault.calendar_folder.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "vault.calendar_folder".into(),
                detail: "calendar folder must not be empty".into(),
            });
        }
        if self.sync.days_to_backfill == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.days_to_backfill".into(),
                detail: "backfill window must be > 0 days".into(),
            });
        }
        if self.sync.max_commits_per_day == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.max_commits_per_day".into(),
                detail: "per-day commit cap must be > 0".into(),
            });
        }
        let heading = self.sync.activity_heading.trim();
        if !heading.starts_with(HEADING_PREFIX) || heading.len() <= HEADING_PREFIX.len() {
            return Err(ConfigError::InvalidValue {
                field: "sync.activity_heading".into(),
                detail: format!("heading must look like '{}<label>'", HEADING_PREFIX),
            });
        }
        if self.daemon.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "daemon.poll_interval_secs".into(),
                detail: "poll interval must be > 0".into(),
            });
        }
        Ok(())
    }

    /// The resolved GitHub token, or an error naming the missing variable.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.github
            .token
            .as_deref()
            .ok_or_else(|| ConfigError::EnvVarMissing {
                var: self.github.token_env.clone(),
                field: "github.token_env".into(),
            })
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Generate a default TOML config template string.
    pub fn default_template() -> &'static str {
        r###"# vaultsync configuration

[github]
api_url = "https://api.github.com"
username = "your-github-username"
token_env = "GITHUB_TOKEN"
# include_repos = ["*"]
# exclude_repos = ["*.github.io"]

[vault]
path = "~/Notes"
calendar_folder = "Calendar"

[sync]
days_to_backfill = 30
max_commits_per_day = 10
filter_keywords_enabled = true
filter_keywords = ["quartz", "sync", "update", "auto"]
readable_messages = true
commit_format = "detailed"   # or "brief"
show_commit_time = false
empty_day = "omit"           # or "placeholder"
# activity_heading = "## 📊 GitHub Activity"

[daemon]
poll_interval_secs = 3600
log_level = "info"
# log_dir = "~/.local/state/vaultsync"
"###
    }
}

/// Try to read an environment variable by name.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            warn!(field, env_name, "env var not set");
            None
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
