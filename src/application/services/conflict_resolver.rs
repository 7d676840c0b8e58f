//! # Conflict Resolver
//!
//! Serializes mutation of a single estimate.
//!
//! Each estimate id gets its own async lock, so mutations of unrelated
//! estimates never contend. Inside the lock the estimate is loaded, the
//! domain mutation applied, and the result saved with an optimistic version
//! check. A writer that loaded a stale version is rejected with a conflict
//! even if it bypassed the lock, and a rejected mutation leaves nothing
//! behind.

use crate::application::error::{ApplicationError, ApplicationResult, Collaborator};
use crate::application::services::dependency::DependencyGuard;
use crate::domain::entities::Estimate;
use crate::domain::errors::DomainResult;
use crate::domain::value_objects::EstimateId;
use crate::infrastructure::persistence::EstimateRepository;
use dashmap::DashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Per-estimate mutation serializer.
pub struct ConflictResolver {
    repository: Arc<dyn EstimateRepository>,
    guard: DependencyGuard,
    locks: DashMap<EstimateId, Arc<Mutex<()>>>,
}

impl fmt::Debug for ConflictResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflictResolver")
            .field("repository", &self.repository)
            .field("guard", &self.guard)
            .field("held_locks", &self.locks.len())
            .finish()
    }
}

impl ConflictResolver {
    /// Creates a resolver over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn EstimateRepository>, guard: DependencyGuard) -> Self {
        Self {
            repository,
            guard,
            locks: DashMap::new(),
        }
    }

    /// Returns the number of ids with a live lock.
    #[must_use]
    pub fn held_locks(&self) -> usize {
        self.locks.len()
    }

    /// Runs `work` while holding the lock for `id`.
    pub async fn exclusive<Fut, T>(&self, id: EstimateId, work: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        let lock = Arc::clone(&self.locks.entry(id).or_default());
        let output = {
            let _held = lock.lock().await;
            work.await
        };
        drop(lock);
        self.locks.remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
        output
    }

    /// Loads an estimate.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist, or a dependency error.
    pub async fn load(&self, id: EstimateId) -> ApplicationResult<Estimate> {
        self.guard
            .call(Collaborator::Repository, self.repository.find_by_id(&id))
            .await?
            .ok_or_else(|| ApplicationError::not_found("Estimate", id))
    }

    /// Saves an estimate, mapping a stale version to a conflict.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if another writer committed first, or a dependency
    /// error.
    pub async fn store(&self, estimate: &Estimate) -> ApplicationResult<()> {
        match self
            .guard
            .bounded(Collaborator::Repository, self.repository.save(estimate))
            .await?
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_version_conflict() => {
                debug!(estimate_id = %estimate.id(), error = %err, "stale write rejected");
                Err(ApplicationError::conflict(estimate.id(), err.to_string()))
            }
            Err(err) => Err(ApplicationError::dependency_failed(err)),
        }
    }

    /// Loads, mutates and saves an estimate under its lock.
    ///
    /// `apply` runs on a private copy; the copy is only saved if `apply`
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, the mapped domain error, `Conflict` on a stale
    /// write, or a dependency error.
    pub async fn mutate<T, F>(&self, id: EstimateId, apply: F) -> ApplicationResult<(Estimate, T)>
    where
        F: FnOnce(&mut Estimate) -> DomainResult<T>,
    {
        self.exclusive(id, async {
            let mut estimate = self.load(id).await?;
            let outcome = apply(&mut estimate)?;
            self.store(&estimate).await?;
            Ok((estimate, outcome))
        })
        .await
    }
}
