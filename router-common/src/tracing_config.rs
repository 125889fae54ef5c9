//! Log output for the router client.
//!
//! Logs always go to stderr so stdout carries only command output. `RUST_LOG`
//! takes precedence over the configured level.

use crate::PlatformError;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Variable holding the default log level.
pub const LOG_LEVEL_VAR: &str = "LUIS_LOG_LEVEL";

/// Variable switching output to JSON lines.
pub const LOG_JSON_VAR: &str = "LUIS_LOG_JSON";

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name reported at startup
    pub service_name: String,
    /// Log level filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "luis-router".to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Read [`LOG_LEVEL_VAR`] and [`LOG_JSON_VAR`] from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read the log settings through `var`.
    #[must_use]
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(level) = var(LOG_LEVEL_VAR).filter(|l| !l.trim().is_empty()) {
            config.log_level = level.trim().to_string();
        }
        config.json_output = var(LOG_JSON_VAR)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        config
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    fn filter(&self) -> Result<EnvFilter, PlatformError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.log_level).map_err(|e| {
            PlatformError::invalid_input(format!("log level '{}' is invalid: {e}", self.log_level))
        })
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log level does not parse or a subscriber is
/// already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<(), PlatformError> {
    let filter = config.filter()?;
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let installed = if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(layer).try_init()
    };
    installed.map_err(|e| PlatformError::internal(format!("tracing already initialized: {e}")))?;

    info!(service = %config.service_name, json = config.json_output, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_vars() {
        let config = TracingConfig::from_vars(|_| None);
        assert_eq!(config.service_name, "luis-router");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_output);
    }

    #[test]
    fn test_vars_set_level_and_json() {
        let config = TracingConfig::from_vars(|name| match name {
            LOG_LEVEL_VAR => Some(" luis_router=debug ".to_string()),
            LOG_JSON_VAR => Some("TRUE".to_string()),
            _ => None,
        });
        assert_eq!(config.log_level, "luis_router=debug");
        assert!(config.json_output);
    }

    #[test]
    fn test_blank_level_keeps_default() {
        let config = TracingConfig::from_vars(|name| {
            (name == LOG_LEVEL_VAR).then(|| "  ".to_string())
        });
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = TracingConfig::default().with_log_level("luis_router=loud");
        assert!(matches!(config.filter(), Err(PlatformError::InvalidInput(_))));
    }
}
