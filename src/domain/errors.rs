//! # Domain Errors
//!
//! Business rule violations raised by value objects and aggregates.
//!
//! Every variant that concerns an estimate carries its id so the
//! application layer can report which aggregate refused the change.

use crate::domain::value_objects::estimate_status::EstimateStatus;
use crate::domain::value_objects::ids::{EstimateId, PartyId, ResolutionId};
use thiserror::Error;

/// Role a party must hold on an estimate for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    /// The party that requested the estimate.
    Requester,
    /// The shop the estimate is addressed to.
    RecipientShop,
    /// Either the requester or the recipient shop.
    Participant,
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requester => write!(f, "requester"),
            Self::RecipientShop => write!(f, "recipient shop"),
            Self::Participant => write!(f, "participant"),
        }
    }
}

/// Error type for domain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The requested transition is not allowed from the current status.
    #[error("estimate {estimate_id}: cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Target estimate.
        estimate_id: EstimateId,
        /// Current (effective) status.
        from: EstimateStatus,
        /// Requested status.
        to: EstimateStatus,
    },

    /// The estimate expired; no further writes are accepted.
    #[error("estimate {estimate_id} has expired")]
    Expired {
        /// Target estimate.
        estimate_id: EstimateId,
    },

    /// The estimate reached a terminal status; no further writes are accepted.
    #[error("estimate {estimate_id} is closed ({status})")]
    Closed {
        /// Target estimate.
        estimate_id: EstimateId,
        /// Terminal status.
        status: EstimateStatus,
    },

    /// The acting party does not hold the required role on the estimate.
    #[error("party {party_id} is not the {role} of estimate {estimate_id}")]
    NotPermitted {
        /// Target estimate.
        estimate_id: EstimateId,
        /// Acting party.
        party_id: PartyId,
        /// Required role.
        role: PartyRole,
    },

    /// A value violates a domain constraint.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Wire name of the offending field.
        field: &'static str,
        /// Description of the violation.
        message: String,
    },

    /// The resolution has already been applied.
    #[error("resolution {resolution_id} for estimate {estimate_id} is already applied")]
    ResolutionClosed {
        /// Estimate the resolution belongs to.
        estimate_id: EstimateId,
        /// The resolution.
        resolution_id: ResolutionId,
    },

    /// The chosen option is not one the resolution offered.
    #[error("resolution {resolution_id} has no option {option}")]
    UnknownResolutionOption {
        /// The resolution.
        resolution_id: ResolutionId,
        /// The rejected option key.
        option: String,
    },
}

impl DomainError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }

    /// Returns the estimate id the error concerns, if any.
    #[must_use]
    pub fn estimate_id(&self) -> Option<EstimateId> {
        match self {
            Self::InvalidStateTransition { estimate_id, .. }
            | Self::Expired { estimate_id }
            | Self::Closed { estimate_id, .. }
            | Self::NotPermitted { estimate_id, .. }
            | Self::ResolutionClosed { estimate_id, .. } => Some(*estimate_id),
            Self::InvalidValue { .. } | Self::UnknownResolutionOption { .. } => None,
        }
    }

    /// Returns true if the error reflects an incompatible current state.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::InvalidStateTransition { .. }
                | Self::Expired { .. }
                | Self::Closed { .. }
                | Self::ResolutionClosed { .. }
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
