//! # Application Errors
//!
//! The closed error taxonomy surfaced by the workflow facade.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(ValidationErrors)  - malformed input, every violated field
//! ├── Unauthorized                  - tier or ownership refused
//! ├── Conflict                      - incompatible current state of an estimate
//! ├── NotFound                      - referenced estimate or resolution missing
//! └── Dependency                    - a collaborator timed out or failed
//! ```
//!
//! Lower layer errors are folded into these five kinds by the `From`
//! conversions below. Collaborator errors stay reachable through
//! [`std::error::Error::source`].
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::application::error::{ApplicationError, Collaborator, ErrorKind};
//!
//! let err = ApplicationError::dependency_timeout(Collaborator::Oracle, 2000);
//! assert_eq!(err.kind(), ErrorKind::DependencyTimeout);
//! assert!(err.is_dependency());
//! ```

use crate::application::validation::ValidationErrors;
use crate::domain::errors::DomainError;
use crate::domain::services::TierDenied;
use crate::domain::value_objects::EstimateId;
use crate::infrastructure::notifications::NotifierError;
use crate::infrastructure::oracle::OracleError;
use crate::infrastructure::persistence::RepositoryError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// External collaborator the engine called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collaborator {
    /// Estimate or resolution storage.
    Repository,
    /// Notification delivery.
    Notifier,
    /// AI oracle.
    Oracle,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository => write!(f, "repository"),
            Self::Notifier => write!(f, "notifier"),
            Self::Oracle => write!(f, "oracle"),
        }
    }
}

/// How a collaborator call went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyFailure {
    /// No answer within the budget.
    TimedOut {
        /// Budget in milliseconds.
        budget_ms: u64,
    },
    /// The collaborator answered with an error.
    Failed,
}

impl fmt::Display for DependencyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimedOut { budget_ms } => write!(f, "timed out after {budget_ms}ms"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Error raised by a collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Storage error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// Notifier error.
    #[error(transparent)]
    Notifier(#[from] NotifierError),
    /// Oracle error.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl CollaboratorError {
    /// Returns which collaborator raised the error.
    #[must_use]
    pub fn collaborator(&self) -> Collaborator {
        match self {
            Self::Repository(_) => Collaborator::Repository,
            Self::Notifier(_) => Collaborator::Notifier,
            Self::Oracle(_) => Collaborator::Oracle,
        }
    }
}

/// Coarse classification of an [`ApplicationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input failed validation.
    Validation,
    /// Tier or ownership refused.
    Unauthorized,
    /// Incompatible current state.
    Conflict,
    /// Referenced entity missing.
    NotFound,
    /// A collaborator timed out or failed.
    DependencyTimeout,
}

impl ErrorKind {
    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Conflict => "CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::DependencyTimeout => "DEPENDENCY_TIMEOUT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The caller's tier or role does not permit the operation.
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Why access was refused.
        reason: String,
    },

    /// The estimate's current state does not admit the operation.
    #[error("conflict on estimate {estimate_id}: {reason}")]
    Conflict {
        /// Estimate in conflict.
        estimate_id: EstimateId,
        /// What conflicted.
        reason: String,
    },

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: &'static str,
        /// Resource identifier.
        id: String,
    },

    /// A collaborator did not answer in time or failed.
    #[error("dependency {collaborator} {failure}")]
    Dependency {
        /// The collaborator.
        collaborator: Collaborator,
        /// What happened.
        failure: DependencyFailure,
        /// Underlying collaborator error.
        #[source]
        source: Option<CollaboratorError>,
    },
}

impl ApplicationError {
    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(estimate_id: EstimateId, reason: impl Into<String>) -> Self {
        Self::Conflict {
            estimate_id,
            reason: reason.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a dependency timeout error.
    #[must_use]
    pub fn dependency_timeout(collaborator: Collaborator, budget_ms: u64) -> Self {
        Self::Dependency {
            collaborator,
            failure: DependencyFailure::TimedOut { budget_ms },
            source: None,
        }
    }

    /// Creates a dependency failure wrapping the collaborator's error.
    #[must_use]
    pub fn dependency_failed(source: impl Into<CollaboratorError>) -> Self {
        let source = source.into();
        Self::Dependency {
            collaborator: source.collaborator(),
            failure: DependencyFailure::Failed,
            source: Some(source),
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Dependency { .. } => ErrorKind::DependencyTimeout,
        }
    }

    /// Returns the estimate id the error concerns, if any.
    #[must_use]
    pub fn estimate_id(&self) -> Option<EstimateId> {
        match self {
            Self::Conflict { estimate_id, .. } => Some(*estimate_id),
            _ => None,
        }
    }

    /// Returns the validation errors, if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an unauthorized error.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns true if this is a conflict error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if a collaborator timed out or failed.
    #[must_use]
    pub fn is_dependency(&self) -> bool {
        matches!(self, Self::Dependency { .. })
    }

    /// Returns true if a collaborator timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Dependency {
                failure: DependencyFailure::TimedOut { .. },
                ..
            }
        )
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidValue { field, message } => {
                Self::Validation(ValidationErrors::single(field, message))
            }
            DomainError::UnknownResolutionOption { ref option, .. } => Self::Validation(
                ValidationErrors::single("chosenOption", format!("{option} is not an offered option")),
            ),
            DomainError::NotPermitted { .. } => Self::unauthorized(err.to_string()),
            DomainError::InvalidStateTransition { estimate_id, .. }
            | DomainError::Expired { estimate_id }
            | DomainError::Closed { estimate_id, .. }
            | DomainError::ResolutionClosed { estimate_id, .. } => {
                Self::conflict(estimate_id, err.to_string())
            }
        }
    }
}

impl From<TierDenied> for ApplicationError {
    fn from(err: TierDenied) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::dependency_failed(err)
    }
}

impl From<OracleError> for ApplicationError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Timeout {
                timeout_ms: Some(budget_ms),
                ..
            } => Self::Dependency {
                collaborator: Collaborator::Oracle,
                failure: DependencyFailure::TimedOut { budget_ms },
                source: Some(CollaboratorError::Oracle(err)),
            },
            other => Self::dependency_failed(other),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::errors::PartyRole;
    use crate::domain::services::Operation;
    use crate::domain::value_objects::{EstimateStatus, PartyId, Tier};
    use std::error::Error as _;

    mod domain_mapping {
        use super::*;

        #[test]
        fn transition_becomes_conflict_with_id() {
            let id = EstimateId::new_v4();
            let err: ApplicationError = DomainError::InvalidStateTransition {
                estimate_id: id,
                from: EstimateStatus::Quoted,
                to: EstimateStatus::Quoted,
            }
            .into();
            assert_eq!(err.kind(), ErrorKind::Conflict);
            assert_eq!(err.estimate_id(), Some(id));
        }

        #[test]
        fn expired_becomes_conflict() {
            let err: ApplicationError = DomainError::Expired {
                estimate_id: EstimateId::new_v4(),
            }
            .into();
            assert!(err.is_conflict());
        }

        #[test]
        fn not_permitted_becomes_unauthorized() {
            let err: ApplicationError = DomainError::NotPermitted {
                estimate_id: EstimateId::new_v4(),
                party_id: PartyId::new("x"),
                role: PartyRole::Requester,
            }
            .into();
            assert!(err.is_unauthorized());
        }

        #[test]
        fn invalid_value_keeps_field_path() {
            let err: ApplicationError = DomainError::invalid_value("quotedCost", "must be positive").into();
            let violations = err.validation_errors().unwrap();
            assert_eq!(violations.fields(), vec!["quotedCost"]);
        }
    }

    #[test]
    fn tier_denied_is_unauthorized() {
        let err: ApplicationError = TierDenied {
            tier: Tier::Free,
            operation: Operation::BroadcastEstimate,
            required: Some(Tier::Premium),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn repository_failure_keeps_source() {
        let err: ApplicationError = RepositoryError::unavailable("refused").into();
        assert_eq!(err.kind(), ErrorKind::DependencyTimeout);
        assert!(!err.is_timeout());
        assert!(err.source().unwrap().to_string().contains("refused"));
    }

    #[test]
    fn oracle_timeout_with_budget_is_timeout() {
        let err: ApplicationError = OracleError::timeout_with_duration("slow", 1500).into();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "dependency oracle timed out after 1500ms");
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorKind::Validation.code(), "VALIDATION_ERROR");
        assert_eq!(ErrorKind::DependencyTimeout.to_string(), "DEPENDENCY_TIMEOUT");
    }
}
