//! # Dependency Guard
//!
//! Bounds every collaborator call by a timeout budget.
//!
//! A call that does not finish within the budget is abandoned and surfaces
//! as [`ApplicationError::Dependency`] with
//! [`DependencyFailure::TimedOut`](crate::application::error::DependencyFailure::TimedOut).

use crate::application::error::{
    ApplicationError, ApplicationResult, Collaborator, CollaboratorError,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Default collaborator budget in milliseconds.
pub const DEFAULT_DEPENDENCY_TIMEOUT_MS: u64 = 2_000;

/// Applies a timeout budget to collaborator calls.
#[derive(Debug, Clone, Copy)]
pub struct DependencyGuard {
    timeout: Duration,
}

impl Default for DependencyGuard {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DEPENDENCY_TIMEOUT_MS)
    }
}

impl DependencyGuard {
    /// Creates a guard with the given budget.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Creates a guard with a budget in milliseconds.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Returns the budget.
    #[inline]
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.timeout
    }

    fn budget_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Runs `fut` within the budget and returns its output untouched.
    ///
    /// # Errors
    ///
    /// Returns a dependency timeout if the budget elapses first.
    pub async fn bounded<F, T>(&self, collaborator: Collaborator, fut: F) -> ApplicationResult<T>
    where
        F: Future<Output = T>,
    {
        timeout(self.timeout, fut)
            .await
            .map_err(|_| ApplicationError::dependency_timeout(collaborator, self.budget_ms()))
    }

    /// Runs a fallible collaborator call within the budget.
    ///
    /// # Errors
    ///
    /// Returns a dependency timeout if the budget elapses, or the call's own
    /// error folded into [`ApplicationError`].
    pub async fn call<F, T, E>(&self, collaborator: Collaborator, fut: F) -> ApplicationResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<CollaboratorError>,
    {
        self.bounded(collaborator, fut)
            .await?
            .map_err(ApplicationError::dependency_failed)
    }
}
