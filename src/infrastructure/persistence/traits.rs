//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! Storage is an external collaborator; the engine only talks to these
//! traits. Both repositories use optimistic locking: `save` succeeds only
//! when the stored version is exactly one below the saved one, or when the
//! entity is new.
//!
//! # Available Repositories
//!
//! - [`EstimateRepository`]: Persistence for estimates
//! - [`ResolutionRepository`]: Persistence for conflict resolutions
//!
//! # Examples
//!
//! ```ignore
//! use estimate_workflow::infrastructure::persistence::traits::EstimateRepository;
//!
//! async fn open_count(repo: &impl EstimateRepository) {
//!     let open = repo.find_open().await.unwrap();
//!     println!("{} open estimates", open.len());
//! }
//! ```

use crate::domain::entities::{ConflictResolution, Estimate};
use crate::domain::value_objects::{EstimateId, PartyId, ResolutionId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Optimistic locking conflict.
    #[error("Version conflict: {entity_type} with id {id} has been modified")]
    VersionConflict {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
        /// Version the writer expected to replace.
        expected: u64,
        /// Version actually stored.
        actual: u64,
    },

    /// The backing store did not accept the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Creates a version conflict error.
    #[must_use]
    pub fn version_conflict(
        entity_type: &'static str,
        id: impl Into<String>,
        expected: u64,
        actual: u64,
    ) -> Self {
        Self::VersionConflict {
            entity_type,
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Creates an unavailable-store error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Returns true if this is a version conflict error.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Checks the optimistic locking rule shared by all repositories.
///
/// `stored` is the currently persisted version, if any.
///
/// # Errors
///
/// Returns `RepositoryError::VersionConflict` when `incoming` does not
/// directly follow `stored`.
pub fn check_version(
    entity_type: &'static str,
    id: impl fmt::Display,
    stored: Option<u64>,
    incoming: u64,
) -> RepositoryResult<()> {
    match stored {
        Some(actual) if actual.saturating_add(1) != incoming => Err(
            RepositoryError::version_conflict(
                entity_type,
                id.to_string(),
                incoming.saturating_sub(1),
                actual,
            ),
        ),
        _ => Ok(()),
    }
}

/// Repository for estimates.
#[async_trait]
pub trait EstimateRepository: Send + Sync + fmt::Debug {
    /// Saves an estimate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VersionConflict` if the estimate has been
    /// modified since it was loaded.
    async fn save(&self, estimate: &Estimate) -> RepositoryResult<()>;

    /// Gets an estimate by ID.
    ///
    /// Returns `None` if the estimate does not exist.
    async fn find_by_id(&self, id: &EstimateId) -> RepositoryResult<Option<Estimate>>;

    /// Finds estimates owned by a requester.
    async fn find_by_owner(&self, owner: &PartyId) -> RepositoryResult<Vec<Estimate>>;

    /// Finds estimates addressed to a shop.
    async fn find_by_recipient(&self, shop: &PartyId) -> RepositoryResult<Vec<Estimate>>;

    /// Finds estimates whose stored status is not terminal.
    ///
    /// Callers still apply the expiry to get the effective status.
    async fn find_open(&self) -> RepositoryResult<Vec<Estimate>>;

    /// Counts all estimates.
    async fn count(&self) -> RepositoryResult<u64>;
}

/// Repository for conflict resolutions.
#[async_trait]
pub trait ResolutionRepository: Send + Sync + fmt::Debug {
    /// Saves a resolution.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::VersionConflict` if the resolution has been
    /// modified since it was loaded.
    async fn save(&self, resolution: &ConflictResolution) -> RepositoryResult<()>;

    /// Gets a resolution by ID.
    async fn find_by_id(&self, id: &ResolutionId) -> RepositoryResult<Option<ConflictResolution>>;

    /// Finds all resolutions opened for an estimate.
    async fn find_by_estimate(
        &self,
        estimate_id: &EstimateId,
    ) -> RepositoryResult<Vec<ConflictResolution>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_entities_always_pass() {
        assert!(check_version("Estimate", "e-1", None, 1).is_ok());
    }

    #[test]
    fn next_version_passes() {
        assert!(check_version("Estimate", "e-1", Some(3), 4).is_ok());
    }

    #[test]
    fn stale_or_repeated_versions_conflict() {
        let stale = check_version("Estimate", "e-1", Some(4), 4).unwrap_err();
        assert!(stale.is_version_conflict());
        assert!(matches!(
            stale,
            RepositoryError::VersionConflict { expected: 3, actual: 4, .. }
        ));
        assert!(check_version("Estimate", "e-1", Some(2), 4).is_err());
    }
}
