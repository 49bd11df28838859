//! vaultsync daemon entry point.
//!
//! Loads configuration, wires the GitHub fetcher and the vault, then keeps
//! today's daily note current on the configured interval until SIGINT or
//! SIGTERM.

mod scheduler;
mod signals;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use vaultsync_core::config::{expand_tilde, AppConfig, DaemonConfig};
use vaultsync_core::Tracker;

const LOG_FILE_PREFIX: &str = "vaultsync.log";

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// vaultsync background sync daemon.
#[derive(Parser, Debug)]
#[command(
    name = "vaultsync-daemon",
    version,
    about = "Keep today's vault note in sync with GitHub activity"
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "~/.config/vaultsync/config.toml")]
    config: PathBuf,

    /// Override the log level from the config file (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Run a single sync cycle and exit.
    #[arg(long)]
    once: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = expand_tilde(&args.config);

    let config =
        AppConfig::load_and_resolve(&config_path).context("failed to load configuration")?;

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.daemon.log_level)
        .to_string();
    let _log_guard = init_tracing(&log_level, &config.daemon)?;

    info!("========================================");
    info!("  vaultsync daemon v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");
    info!("Config file   : {}", config_path.display());
    info!("GitHub user   : {}", config.github.username);
    info!("Vault         : {}", config.vault.path.display());
    info!("Poll interval : {}s", config.daemon.poll_interval_secs);
    info!("Log level     : {}", log_level);
    info!("========================================");

    let tracker =
        Arc::new(Tracker::from_config(&config).context("failed to set up GitHub sync")?);

    let poll_interval = Duration::from_secs(config.daemon.poll_interval_secs);
    let sched = Arc::new(scheduler::Scheduler::new(tracker, poll_interval));

    if args.once {
        sched.maybe_run_cycle().await;
        let stats = sched.stats();
        if stats.total_errors.load(std::sync::atomic::Ordering::SeqCst) > 0 {
            anyhow::bail!("sync cycle failed");
        }
        return Ok(());
    }

    let shutdown = Arc::new(tokio::sync::Notify::new());
    let scheduler_handle = {
        let sched = sched.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { sched.run(shutdown).await })
    };

    signals::wait_for_shutdown().await;
    info!("Shutdown signal received, stopping...");
    shutdown.notify_one();

    // Let a cycle in progress finish (up to 30s).
    match tokio::time::timeout(Duration::from_secs(30), scheduler_handle).await {
        Ok(Ok(())) => info!("scheduler stopped gracefully"),
        Ok(Err(e)) => warn!("scheduler task error: {}", e),
        Err(_) => warn!("scheduler did not stop within 30s, forcing shutdown"),
    }

    info!("vaultsync daemon stopped.");
    Ok(())
}

/// Install the global subscriber: stdout always, plus a daily-rolling file
/// under `daemon.log_dir` when configured. The returned guard flushes the
/// file writer on drop and must live until exit.
fn init_tracing(level: &str, daemon: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &daemon.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    Ok(guard)
}
