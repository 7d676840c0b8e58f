//! # Oracle Errors
//!
//! Error types for AI oracle calls.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::infrastructure::oracle::error::OracleError;
//!
//! let error = OracleError::timeout_with_duration("assessment timed out", 2000);
//! assert!(error.is_timeout());
//! ```

use thiserror::Error;

/// Error type for AI oracle operations.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// Request timed out.
    #[error("oracle timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// The oracle is unreachable or unhealthy.
    #[error("oracle unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// The oracle refused the input.
    #[error("oracle invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// The oracle answered with something unusable.
    #[error("oracle invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}

impl OracleError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns true if this is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for oracle operations.
pub type OracleResult<T> = Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_timeouts() {
        assert!(OracleError::timeout("slow").is_timeout());
        assert!(!OracleError::unavailable("down").is_timeout());
        assert!(!OracleError::invalid_response("garbage").is_timeout());
    }

    #[test]
    fn display_includes_message() {
        let err = OracleError::invalid_request("no media");
        assert_eq!(err.to_string(), "oracle invalid request: no media");
    }
}
