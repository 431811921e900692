//! Diagnostic logging setup.
//!
//! Diagnostics are `tracing` events written to stderr, so stdout carries
//! only the report from [`crate::output`]. `RUST_LOG` takes precedence;
//! otherwise this crate logs at `warn`, or `debug` with `--verbose`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), level)
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    // Err only means a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init();
}
