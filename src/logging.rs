//! Tracing setup
//!
//! The host app calls `init_logging` once at startup. `RUST_LOG` takes
//! precedence over the configured filter.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// Returns `false` if a subscriber was already installed (e.g. by the host
/// or a previous call); that is not an error.
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging("openlibrary_core=debug");
        assert!(!init_logging("openlibrary_core=debug"));
    }
}
