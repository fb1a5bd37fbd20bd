//! Tracing subscriber setup for binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the entry point.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber honouring `RUST_LOG`.
///
/// Without `RUST_LOG`, verbose runs log at `info` and quiet runs at `warn`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
