//! # Telemetry
//!
//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level. Call [`init`]
//! once at process start; later calls fail with
//! [`TelemetryError::AlreadyInitialized`].

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Telemetry setup errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log level/filter '{value}'")]
    Filter {
        /// The directive.
        value: String,
        /// Parse failure.
        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("telemetry already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Builds the filter, preferring `RUST_LOG`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] if `RUST_LOG` is unset and the
/// configured level does not parse.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|source| TelemetryError::Filter {
            value: config.level.clone(),
            source,
        }),
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_is_reported() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "estimate=loud[".to_string(),
            format: LogFormat::Compact,
        };
        assert!(matches!(filter(&config), Err(TelemetryError::Filter { .. })));
    }

    #[test]
    fn default_level_parses() {
        assert!(filter(&LoggingConfig::default()).is_ok());
    }
}
