//! Structured logging setup using `tracing-subscriber`.
//!
//! One mode: human-readable output to stderr, filtered by `RUST_LOG`.
//! The binary is a one-shot notifier, so there is no file rotation or
//! JSON sink; anything long-lived enough to need those runs elsewhere.

use tracing_subscriber::EnvFilter;

/// Initialise logging for the CLI.
///
/// Emits human-readable output to stderr only, controlled by the
/// `RUST_LOG` environment variable (default: `info`). Stdout stays
/// reserved for command output such as payload and handle JSON.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
