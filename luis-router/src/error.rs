//! Router error types using thiserror 2.0.
//!
//! Provides router-specific errors with retryability classification
//! and integration with platform common errors.

use router_common::{PlatformError, Retryable};
use thiserror::Error;

/// Router client errors.
#[derive(Error, Debug)]
pub enum RouterError {
    /// HTTP transport error (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Token store failure
    #[error("Token store error: {0}")]
    Store(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Platform error
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

impl RouterError {
    /// Check if error is retryable.
    ///
    /// Transport and storage hiccups are; configuration and encryption
    /// failures will fail the same way on every attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Serialization(_) | Self::Store(_) => true,
            Self::Config(_) => false,
            Self::Platform(e) => e.is_retryable(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a token store error.
    #[must_use]
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl Retryable for RouterError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouterError::config("LuisRouterUrl is required");
        assert_eq!(err.to_string(), "Invalid configuration: LuisRouterUrl is required");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(RouterError::store("lock poisoned").is_retryable());
        assert!(RouterError::from(PlatformError::unavailable("down")).is_retryable());
        assert!(!RouterError::config("bad").is_retryable());
        assert!(!RouterError::from(PlatformError::encryption("empty key")).is_retryable());
    }

    #[test]
    fn test_from_platform_error() {
        let err: RouterError = PlatformError::invalid_input("x").into();
        assert!(matches!(err, RouterError::Platform(_)));
        assert_eq!(err.to_string(), "Invalid input: x");
    }
}
