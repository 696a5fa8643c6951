//! Logging setup
//!
//! Library crates only emit `tracing` events; binaries call [`init`] once.

use crate::config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Build the filter for `level`, letting `RUST_LOG` take precedence
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()))
}

/// Install the global fmt subscriber
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(level: LogLevel) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        let _ = init(LogLevel::Warn);
        assert!(!init(LogLevel::Warn));
    }
}
