//! Tracing setup.
//!
//! The engine only emits `tracing` events; installing a subscriber is left
//! to the host. [`init_tracing`] is a convenience for binaries, benches and
//! debugging sessions.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "RIPPLE_LOG";

/// Install a global fmt subscriber filtered by `RIPPLE_LOG`.
///
/// Example: `RIPPLE_LOG=ripple_core::graph=trace`. Falls back to
/// `ripple_core=info` when the variable is unset or invalid. Calling this
/// more than once is a no-op, and so is calling it when another global
/// subscriber is already installed.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("ripple_core=info"));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init();
    });
}
