//! # In-Memory Resolution Repository
//!
//! In-memory implementation of [`ResolutionRepository`].

use crate::domain::entities::ConflictResolution;
use crate::domain::value_objects::{EstimateId, ResolutionId};
use crate::infrastructure::persistence::traits::{
    RepositoryResult, ResolutionRepository, check_version,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`ResolutionRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolutionRepository {
    storage: Arc<RwLock<HashMap<ResolutionId, ConflictResolution>>>,
}

impl InMemoryResolutionRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResolutionRepository for InMemoryResolutionRepository {
    async fn save(&self, resolution: &ConflictResolution) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let stored = storage.get(&resolution.id()).map(ConflictResolution::version);
        check_version("ConflictResolution", resolution.id(), stored, resolution.version())?;
        storage.insert(resolution.id(), resolution.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ResolutionId) -> RepositoryResult<Option<ConflictResolution>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_by_estimate(
        &self,
        estimate_id: &EstimateId,
    ) -> RepositoryResult<Vec<ConflictResolution>> {
        let storage = self.storage.read().await;
        let mut found: Vec<ConflictResolution> = storage
            .values()
            .filter(|r| r.estimate_id() == *estimate_id)
            .cloned()
            .collect();
        found.sort_by_key(ConflictResolution::created_at);
        Ok(found)
    }
}
