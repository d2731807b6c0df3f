//! Logging initialization
//!
//! Builds a `tracing` subscriber from environment configuration:
//! - `LOG_LEVEL` selects the default filter level (default: INFO)
//! - `LOG_JSON` switches output from pretty console format to JSON lines

use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Logging configuration resolved from the process environment
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is not set (e.g. "info", "debug")
    pub level: String,
    /// Emit JSON lines instead of pretty console output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Resolve configuration from `LOG_LEVEL` / `LOG_JSON`
    pub fn from_env() -> Self {
        let level = env::var("LOG_LEVEL")
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let json = env::var("LOG_JSON")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self { level, json }
    }
}

/// Initialize the global tracing subscriber
///
/// Filter precedence: `RUST_LOG` (if set) > `config.level`. Calling this
/// twice in one process returns an error from the subscriber registry.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to initialize logging")
}
