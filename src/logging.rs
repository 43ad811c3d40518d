//! Log setup for the two ways the binary runs.
//!
//! `serve` is long-lived, so its events also go to a JSON file under the
//! configured logs directory, one file per day ([`init_production`]). The
//! interactive and one-shot commands print answers on stdout; their log
//! lines stay on stderr and default to `warn` ([`init_cli`]).
//!
//! `RUST_LOG` overrides the default level in both modes.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name prefix of the daily JSON logs; the date is appended.
pub const LOG_FILE_PREFIX: &str = "persona-relay.log";

/// Default level for the server.
const SERVE_LEVEL: &str = "info";

/// Default level for `chat`, `ask` and `prompt`.
const CLI_LEVEL: &str = "warn";

/// Keeps the background file writer of the server running.
///
/// Hold it in `main` for as long as the server runs; buffered chat events
/// are written out when it is dropped.
pub struct LoggingGuard {
    _writer: WorkerGuard,
}

/// Start logging for `serve`.
///
/// Every event is written twice: as JSON to
/// `{logs_dir}/persona-relay.log.YYYY-MM-DD` and as plain text to stderr.
///
/// # Errors
///
/// Returns an error if `logs_dir` cannot be created.
pub fn init_production(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("failed to create logs directory {}", logs_dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(level_filter(SERVE_LEVEL))
        .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(LoggingGuard { _writer: guard })
}

/// Start stderr-only logging for the terminal commands.
pub fn init_cli() {
    tracing_subscriber::fmt()
        .with_env_filter(level_filter(CLI_LEVEL))
        .with_writer(std::io::stderr)
        .init();
}

fn level_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
