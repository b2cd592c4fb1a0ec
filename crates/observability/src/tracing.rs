//! Tracing/logging initialization.
//!
//! JSON lines on stdout, filter from `RUST_LOG` with a caller-supplied
//! default. Services call this once at startup before anything logs.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// `default_directive` applies when `RUST_LOG` is unset (e.g. `"info"` or
/// `"info,sqlx=warn"`). Safe to call multiple times (subsequent calls are
/// no-ops).
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_current_span(true)
        .try_init();
}
