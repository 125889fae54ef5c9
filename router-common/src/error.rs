//! Centralized error types shared by the router crates.
//!
//! This module provides a unified error type with built-in retryability
//! classification, so callers can tell a flaky network from a broken setup.

use thiserror::Error;

/// Common error type for platform operations.
///
/// All errors are classified as either retryable or non-retryable,
/// which helps callers decide whether to retry failed operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP request failed (connect, timeout, body decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Encryption/decryption error
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Timeout occurred
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// Check if this error is retryable.
    ///
    /// Retryable errors are transient failures that may succeed on retry,
    /// such as network issues, malformed responses from a struggling peer,
    /// or temporary unavailability.
    ///
    /// # Examples
    ///
    /// ```
    /// use router_common::PlatformError;
    ///
    /// let err = PlatformError::unavailable("router restarting");
    /// assert!(err.is_retryable());
    ///
    /// let err = PlatformError::encryption("bad key");
    /// assert!(!err.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Serialization(_) | Self::Unavailable(_) | Self::Timeout(_)
        )
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an encryption error with the given message.
    #[must_use]
    pub fn encryption(msg: impl Into<String>) -> Self {
        Self::Encryption(msg.into())
    }

    /// Create an internal error with the given message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PlatformError::unavailable("test").is_retryable());
        assert!(PlatformError::Timeout("test".to_string()).is_retryable());

        let malformed = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(PlatformError::from(malformed).is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!PlatformError::invalid_input("test").is_retryable());
        assert!(!PlatformError::encryption("test").is_retryable());
        assert!(!PlatformError::internal("test").is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = PlatformError::unavailable("router");
        assert_eq!(err.to_string(), "Service unavailable: router");

        let err = PlatformError::encryption("empty key");
        assert_eq!(err.to_string(), "Encryption error: empty key");
    }
}
