//! Tracing setup.
//!
//! The interactive panel owns the terminal, so logs go to a daily-rotated file
//! (`cleanwatch.log` under the log directory). Headless runs also log to stderr.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter from `RUST_LOG`, else `CLEANWATCH_LOG`, else `info`.
/// An unparsable filter falls back to `warn`.
fn log_filter() -> tracing_subscriber::EnvFilter {
    let level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("CLEANWATCH_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive until
/// the process exits.
///
/// # Errors
///
/// Fails if `log_dir` cannot be created or a global subscriber is already set.
pub fn init(log_dir: &Path, also_stderr: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "cleanwatch.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer =
        also_stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(log_filter())
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
