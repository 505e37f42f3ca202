//! Tracing subscriber setup for hosts embedding the dispatch core.
//!
//! The core itself only emits `tracing` events. Binaries and test harnesses
//! call [`init`] once to route them to stderr.

use dispatch_types::{DispatchError, DispatchSettings};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise the configured log level.
pub fn env_filter(settings: &DispatchSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level))
}

/// Install a global fmt subscriber.
///
/// # Errors
///
/// Returns `DispatchError::Config` if a global subscriber is already set.
pub fn init(settings: &DispatchSettings) -> Result<(), DispatchError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .try_init()
        .map_err(|e| DispatchError::Config(format!("Failed to set tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let settings = DispatchSettings::default();
        // Another test may have installed a subscriber first; either way the
        // next attempt must fail.
        let _ = init(&settings);
        assert!(matches!(init(&settings), Err(DispatchError::Config(_))));
    }
}
