//! Logging
//!
//! Structured logging through `tracing`. The filter comes from `RECOURSE_LOG`
//! when set, otherwise from the configured level. Output goes to stderr.

use crate::config::{LogFormat, LoggingSettings};
use crate::error::ConfigError;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "RECOURSE_LOG";

/// Install the global subscriber
///
/// Returns `Ok(false)` when another subscriber was already installed; that one is kept.
pub fn init_logging(settings: &LoggingSettings) -> Result<bool, ConfigError> {
    let filter = build_env_filter(settings)?;

    let installed = match settings.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    match installed {
        Ok(()) => Ok(true),
        Err(e) => {
            tracing::debug!(error = %e, "global subscriber already installed");
            Ok(false)
        }
    }
}

fn build_env_filter(settings: &LoggingSettings) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    EnvFilter::try_new(&settings.level).map_err(|e| {
        ConfigError::Invalid(format!("Invalid log level '{}': {}", settings.level, e))
    })
}
