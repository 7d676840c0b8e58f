//! # Configuration
//!
//! Layered engine configuration.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. `ESTIMATE__*` environment variables, e.g.
//!    `ESTIMATE__WORKFLOW__LATENCY_BUDGET_MS=250` or
//!    `ESTIMATE__BROADCAST__MAX_CONCURRENT_DISPATCHES=4`
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.workflow.latency_budget_ms, 500);
//! assert_eq!(config.broadcast.max_concurrent_dispatches, 8);
//! ```

use crate::application::services::BroadcastConfig;
use crate::application::validation::ValidationLimits;
use crate::application::workflow::WorkflowSettings;
use crate::domain::entities::ReminderThresholds;
use crate::domain::services::TierPolicy;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ESTIMATE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or merged.
    #[error("could not load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range.
    #[error("invalid configuration value for `{key}`: {message}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// What is wrong.
        message: String,
    },
}

/// Workflow timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Operations slower than this are logged as slow.
    pub latency_budget_ms: u64,
    /// Budget for every collaborator call.
    pub dependency_timeout_ms: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            latency_budget_ms: 500,
            dependency_timeout_ms: 2_000,
        }
    }
}

/// Reminder thresholds in hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Hours a shop has to answer.
    pub awaiting_response_hours: u64,
    /// Hours a requester has to decide.
    pub awaiting_decision_hours: u64,
    /// Hours before expiry at which `ExpiringSoon` fires.
    pub expiring_soon_hours: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            awaiting_response_hours: 24,
            awaiting_decision_hours: 24,
            expiring_soon_hours: 24,
        }
    }
}

impl ReminderConfig {
    /// Converts to domain thresholds.
    #[must_use]
    pub fn thresholds(&self) -> ReminderThresholds {
        let hours = |h: u64| Duration::from_secs(h.saturating_mul(3_600));
        ReminderThresholds {
            awaiting_response: hours(self.awaiting_response_hours),
            awaiting_decision: hours(self.awaiting_decision_hours),
            expiring_soon: hours(self.expiring_soon_hours),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Workflow timing.
    pub workflow: WorkflowConfig,
    /// Broadcast dispatch.
    pub broadcast: BroadcastConfig,
    /// Request validation limits.
    pub validation: ValidationLimits,
    /// Reminder thresholds.
    pub reminders: ReminderConfig,
    /// Logging.
    pub logging: LoggingConfig,
    /// HTTP server.
    pub server: ServerConfig,
}

impl EngineConfig {
    /// Loads configuration from defaults, an optional file and the
    /// environment.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workflow.dependency_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "workflow.dependency_timeout_ms",
                message: "must be positive".to_string(),
            });
        }
        if self.broadcast.max_concurrent_dispatches == 0 {
            return Err(ConfigError::Invalid {
                key: "broadcast.max_concurrent_dispatches",
                message: "must be positive".to_string(),
            });
        }
        if self.broadcast.dispatch_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "broadcast.dispatch_timeout_ms",
                message: "must be positive".to_string(),
            });
        }
        if self.validation.max_timeline_days == 0 {
            return Err(ConfigError::Invalid {
                key: "validation.max_timeline_days",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Builds workflow settings with the standard tier policy.
    #[must_use]
    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            policy: TierPolicy::standard(),
            latency_budget: Duration::from_millis(self.workflow.latency_budget_ms),
            dependency_timeout: Duration::from_millis(self.workflow.dependency_timeout_ms),
            broadcast: self.broadcast.clone(),
            limits: self.validation.clone(),
            reminders: self.reminders.thresholds(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_uses_defaults() {
        let config = EngineConfig::load(Some(Path::new("/nonexistent/estimate.toml"))).unwrap();
        assert_eq!(config.workflow, WorkflowConfig::default());
        assert_eq!(config.validation.media_free, 3);
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("estimate-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[workflow]\nlatency_budget_ms = 250\n\n[broadcast]\nmax_concurrent_dispatches = 2\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = EngineConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.workflow.latency_budget_ms, 250);
        assert_eq!(config.workflow.dependency_timeout_ms, 2_000);
        assert_eq!(config.broadcast.max_concurrent_dispatches, 2);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = EngineConfig::default();
        config.broadcast.max_concurrent_dispatches = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "broadcast.max_concurrent_dispatches",
                ..
            })
        ));
    }

    #[test]
    fn settings_carry_durations() {
        let settings = EngineConfig::default().workflow_settings();
        assert_eq!(settings.latency_budget, Duration::from_millis(500));
        assert_eq!(settings.reminders.expiring_soon, Duration::from_secs(86_400));
    }
}
