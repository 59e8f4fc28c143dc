//! Logging initialization for the gridboard CLI.
//!
//! Configures the `tracing` subscriber with level filtering via the
//! `GRIDBOARD_LOG` environment variable. When the variable is unset or
//! invalid, the level from the `[logging]` config section is used.
//!
//! # Usage
//!
//! ```bash
//! # Level from config.toml (default: warn)
//! gridboard list
//!
//! # Debug level, including every reconciliation
//! GRIDBOARD_LOG=debug gridboard add text
//!
//! # Module-specific filtering
//! GRIDBOARD_LOG=gridboard::surface=trace,warn gridboard move widget-1 4 0
//! ```

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV_VAR: &str = "GRIDBOARD_LOG";

/// Builds the filter from `GRIDBOARD_LOG`, falling back to `fallback`.
pub fn env_filter(fallback: &LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback.as_str()))
}

/// Initialize the tracing subscriber.
///
/// Output goes to stderr so stdout stays clean for command output.
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init(fallback: &LogLevel) {
    let _ = fmt()
        .with_env_filter(env_filter(fallback))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
