//! # Notifier Errors
//!
//! Error types for notification delivery.

use crate::domain::value_objects::PartyId;
use thiserror::Error;

/// Error type for notifier operations.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The delivery channel rejected the notification.
    #[error("notification to {party_id} rejected: {message}")]
    Rejected {
        /// Intended recipient.
        party_id: PartyId,
        /// Error message.
        message: String,
    },

    /// The delivery channel is unreachable.
    #[error("notifier unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// The payload could not be encoded.
    #[error("notification payload error: {message}")]
    Payload {
        /// Error message.
        message: String,
    },
}

impl NotifierError {
    /// Creates a rejected error.
    #[must_use]
    pub fn rejected(party_id: PartyId, message: impl Into<String>) -> Self {
        Self::Rejected {
            party_id,
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a payload error.
    #[must_use]
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for NotifierError {
    fn from(err: serde_json::Error) -> Self {
        Self::payload(err.to_string())
    }
}

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;
