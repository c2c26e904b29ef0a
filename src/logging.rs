//! Logging configuration for sqldesk.

use tracing_subscriber::EnvFilter;

/// Initializes logging on stderr.
///
/// The filter is taken from the environment (`RUST_LOG`), falling back to
/// `info`. Logs go to stderr so query output on stdout stays clean.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
