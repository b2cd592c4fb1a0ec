//! `stratum-observability` — shared logging setup for platform services.

/// Initialize process-wide structured logging with the default `info` level.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Tracing configuration (filters, layers).
pub mod tracing;
