//! Logging Setup Module
//!
//! Thin tracing-subscriber initialization for hosts embedding the engine.
//! The engine itself only emits `tracing` events (notably when a stored date
//! string fails to re-render and is passed through unchanged).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact fmt subscriber filtered by `RUST_LOG` (default "info").
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
