//! vaultsync command-line tool.
//!
//! One-shot commands for mirroring GitHub activity into a notes vault:
//! today's note, a backfill window, month calendars, placeholder cleanup,
//! and a dry-run preview. Also generates and validates configuration files.

mod report;
mod style;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use vaultsync_core::config::{expand_tilde, AppConfig};
use vaultsync_core::github::CommitFetcher;
use vaultsync_core::models::RunStats;
use vaultsync_core::{FsNoteStore, Tracker, VaultSync};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// vaultsync command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "vaultsync",
    version,
    about = "Sync GitHub commit history into an Obsidian-style notes vault"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        short,
        long,
        global = true,
        default_value = "~/.config/vaultsync/config.toml"
    )]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file (defaults to --config).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file.
    Validate,

    /// Sync today's daily note and this month's calendar.
    Today,

    /// Sync every day in a window ending today.
    Backfill {
        /// Number of days, including today (defaults to sync.days_to_backfill).
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Create missing month calendars and refresh their summaries.
    Calendar {
        /// First day of the range (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range (YYYY-MM-DD).
        #[arg(long)]
        to: NaiveDate,
    },

    /// Remove placeholder-only activity sections from daily notes.
    Cleanup,

    /// Print a daily note as it would look after syncing, without writing it.
    Preview {
        /// Day to preview (YYYY-MM-DD, defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", style::error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means it finished but some days or
/// calendars failed.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = expand_tilde(&cli.config);

    match cli.command {
        Commands::Init { output } => {
            let output = output.map(|p| expand_tilde(&p)).unwrap_or(config_path);
            cmd_init(&output).map(|()| true)
        }
        Commands::Validate => cmd_validate(&config_path).map(|()| true),
        Commands::Today => {
            let config = load_config(&config_path)?;
            let tracker = build_tracker(&config)?;
            let today = Local::now().date_naive();
            let stats = with_spinner(
                "Fetching today's GitHub activity...",
                tracker.run_today(today),
            )
            .await?;
            Ok(print_run(&stats))
        }
        Commands::Backfill { days } => {
            let config = load_config(&config_path)?;
            let days = days.unwrap_or(config.sync.days_to_backfill);
            let tracker = build_tracker(&config)?;
            let today = Local::now().date_naive();
            let stats = with_spinner(
                &format!("Fetching {days} day(s) of GitHub activity..."),
                tracker.run_backfill(days, today),
            )
            .await?;
            Ok(print_run(&stats))
        }
        Commands::Calendar { from, to } => {
            let config = load_config(&config_path)?;
            let vault = build_vault(&config)?;
            let report = vault
                .ensure_calendars(from, to)
                .context("failed to sync month calendars")?;
            report::print_backfill(&report);
            Ok(report.is_clean())
        }
        Commands::Cleanup => {
            let config = load_config(&config_path)?;
            let vault = build_vault(&config)?;
            let report = vault
                .cleanup_placeholders()
                .context("failed to clean up placeholder sections")?;
            report::print_cleanup(&report);
            Ok(report.errors.is_empty())
        }
        Commands::Preview { date } => {
            let config = load_config(&config_path)?;
            let tracker = build_tracker(&config)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let text = with_spinner("Fetching GitHub activity...", tracker.preview(date)).await?;
            println!(
                "{}",
                style::dim(&tracker.vault().layout().daily_note_path(date).display().to_string())
            );
            println!();
            print!("{}", text);
            Ok(true)
        }
    }
}

// ---------------------------------------------------------------------------
// Config and wiring helpers
// ---------------------------------------------------------------------------

fn load_config(path: &Path) -> Result<AppConfig> {
    AppConfig::load_and_resolve(path).with_context(|| {
        format!(
            "failed to load configuration from {} (run 'vaultsync init' to create one)",
            path.display()
        )
    })
}

fn build_vault(config: &AppConfig) -> Result<VaultSync<FsNoteStore>> {
    VaultSync::new(config, FsNoteStore).context("failed to initialize vault sync")
}

fn build_tracker(config: &AppConfig) -> Result<Tracker<CommitFetcher, FsNoteStore>> {
    Tracker::from_config(config).context("failed to set up GitHub sync")
}

/// Await `fut` behind a terminal spinner.
async fn with_spinner<T, E, F>(message: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .context("invalid spinner template")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = fut.await;
    spinner.finish_and_clear();
    Ok(result?)
}

fn print_run(stats: &RunStats) -> bool {
    report::print_summary(&stats.summary);
    report::print_backfill(&stats.report);
    if let (Some(start), Some(end)) = (stats.started_at, stats.completed_at) {
        let secs = (end - start).num_milliseconds() as f64 / 1000.0;
        println!("{}", style::dim(&format!("finished in {secs:.1}s")));
    }
    stats.report.is_clean()
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, AppConfig::default_template()).context("failed to write config file")?;

    println!("{}", style::success(&format!("Default configuration written to {}", output.display())));
    println!();
    println!("Next steps:");
    println!("  1. Set your GitHub username and vault path");
    println!("  2. Export a token in the variable named by github.token_env (GITHUB_TOKEN)");
    println!("  3. Validate with: vaultsync validate --config {}", output.display());
    println!("  4. Backfill with: vaultsync backfill --config {}", output.display());

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let mut config =
        AppConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  {}", style::success("TOML structure is valid"));

    config
        .resolve_env_vars()
        .context("failed to resolve environment variables")?;
    println!("  {}", style::success("Environment variable references processed"));

    if let Err(e) = config.validate() {
        println!("  {}", style::error(&format!("Validation error: {}", e)));
        anyhow::bail!("configuration validation failed");
    }
    println!("  {}", style::success("All required fields are valid"));

    if !config.vault.path.is_dir() {
        println!(
            "  {}",
            style::warn(&format!("vault directory does not exist yet: {}", config.vault.path.display()))
        );
    }

    println!();
    println!("{}", style::header("Configuration summary"));
    println!("  GitHub user   : {}", config.github.username);
    println!("  GitHub API    : {}", config.github.api_url);
    println!(
        "  GitHub token  : {}",
        if config.github.token.is_some() {
            "set".to_string()
        } else {
            format!("NOT SET (export {})", config.github.token_env)
        }
    );
    println!("  Vault         : {}", config.vault.path.display());
    println!("  Calendar      : {}", config.vault.calendar_folder);
    println!("  Backfill days : {}", config.sync.days_to_backfill);
    println!("  Commits/day   : {}", config.sync.max_commits_per_day);
    println!("  Format        : {:?}", config.sync.commit_format);
    println!("  Empty days    : {:?}", config.sync.empty_day);
    println!("  Poll interval : {}s", config.daemon.poll_interval_secs);
    println!();
    println!("Configuration is valid.");

    Ok(())
}
