//! appselect binary entrypoint kept minimal. The session runtime lives in `app`.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use appselect::{app, args};
use clap::Parser;

struct AppselectTimer;

impl tracing_subscriber::fmt::time::FormatTime for AppselectTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        // "YYYY-MM-DD-T HH:MM:SS"
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d-T %H:%M:%S"))
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Install the global tracing subscriber.
///
/// Inputs:
/// - `level`: Default filter directive when `RUST_LOG` is unset
/// - `logs_dir`: Directory for `appselect.log`
///
/// Details:
/// - Writes to `<logs_dir>/appselect.log` through a non-blocking appender,
///   keeping stdout free for the derived list.
/// - Falls back to stderr when the log file cannot be opened.
fn init_logging(level: &str, logs_dir: &Path) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    let log_path = logs_dir.join("appselect.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(AppselectTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(AppselectTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() {
    let args = args::Args::parse();
    init_logging(&args::determine_log_level(&args), &args.logs_dir());

    tracing::info!(catalog = %args.catalog.display(), watch = args.watch, "appselect starting");
    if let Err(err) = app::run(args).await {
        tracing::error!(error = %err, "session failed");
        eprintln!("appselect: {err}");
        std::process::exit(1);
    }
    tracing::info!("appselect exited");
}
