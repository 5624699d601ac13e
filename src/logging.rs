// src/logging.rs
//! Tracing subscriber setup for the binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the caller. `RUST_LOG` takes precedence over the level passed in, e.g.
//!
//! ```bash
//! RUST_LOG=hjb_control::solvers=debug hjb-solve --scenario 3
//! ```

use tracing_subscriber::filter::EnvFilter;

/// Install a compact fmt subscriber writing to stderr.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}
