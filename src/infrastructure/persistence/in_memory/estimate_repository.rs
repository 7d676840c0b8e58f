//! # In-Memory Estimate Repository
//!
//! In-memory implementation of [`EstimateRepository`] for tests and the
//! demo server.

use crate::domain::entities::Estimate;
use crate::domain::value_objects::{EstimateId, PartyId};
use crate::infrastructure::persistence::traits::{
    EstimateRepository, RepositoryResult, check_version,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`EstimateRepository`].
///
/// The version check and the insert happen under one write lock, so two
/// writers holding the same loaded version cannot both succeed.
#[derive(Debug, Clone)]
pub struct InMemoryEstimateRepository {
    storage: Arc<RwLock<HashMap<EstimateId, Estimate>>>,
}

impl InMemoryEstimateRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clears all estimates.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }

    async fn filtered(&self, keep: impl Fn(&Estimate) -> bool) -> Vec<Estimate> {
        let storage = self.storage.read().await;
        let mut found: Vec<Estimate> = storage.values().filter(|e| keep(e)).cloned().collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        found
    }
}

impl Default for InMemoryEstimateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EstimateRepository for InMemoryEstimateRepository {
    async fn save(&self, estimate: &Estimate) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let stored = storage.get(&estimate.id()).map(Estimate::version);
        check_version("Estimate", estimate.id(), stored, estimate.version())?;
        storage.insert(estimate.id(), estimate.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EstimateId) -> RepositoryResult<Option<Estimate>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_by_owner(&self, owner: &PartyId) -> RepositoryResult<Vec<Estimate>> {
        Ok(self.filtered(|e| e.requester_id() == owner).await)
    }

    async fn find_by_recipient(&self, shop: &PartyId) -> RepositoryResult<Vec<Estimate>> {
        Ok(self.filtered(|e| e.recipient_shop_id() == shop).await)
    }

    async fn find_open(&self) -> RepositoryResult<Vec<Estimate>> {
        Ok(self.filtered(|e| !e.status().is_terminal()).await)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let storage = self.storage.read().await;
        Ok(storage.len() as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{EstimateDraft, QuoteTerms};
    use crate::domain::value_objects::{Cost, Timestamp, VehicleDescriptor};
    use rust_decimal::Decimal;

    fn estimate(requester: &str, shop: &str, now: Timestamp) -> Estimate {
        let draft = EstimateDraft::new(
            PartyId::new(requester),
            VehicleDescriptor::new("Kia", "Rio"),
            "Cracked windshield",
        );
        Estimate::open(draft, PartyId::new(shop), now).0
    }

    #[tokio::test]
    async fn save_and_find() {
        let repo = InMemoryEstimateRepository::new();
        let estimate = estimate("req-1", "shop-1", Timestamp::now());
        repo.save(&estimate).await.unwrap();

        assert_eq!(repo.find_by_id(&estimate.id()).await.unwrap(), Some(estimate));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_estimate_is_none() {
        let repo = InMemoryEstimateRepository::new();
        assert!(repo.find_by_id(&EstimateId::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_writer_is_rejected() {
        let repo = InMemoryEstimateRepository::new();
        let now = Timestamp::now();
        let original = estimate("req-1", "shop-1", now);
        repo.save(&original).await.unwrap();

        let shop = PartyId::new("shop-1");
        let mut first = original.clone();
        let mut second = original.clone();
        first
            .respond(&shop, QuoteTerms::new(Cost::new(Decimal::from(10)).unwrap()), now)
            .unwrap();
        second
            .respond(&shop, QuoteTerms::new(Cost::new(Decimal::from(20)).unwrap()), now)
            .unwrap();

        repo.save(&first).await.unwrap();
        let err = repo.save(&second).await.unwrap_err();
        assert!(err.is_version_conflict());

        let stored = repo.find_by_id(&original.id()).await.unwrap().unwrap();
        assert_eq!(stored.quoted_cost(), first.quoted_cost());
    }

    #[tokio::test]
    async fn finders_filter_and_sort_newest_first() {
        let repo = InMemoryEstimateRepository::new();
        let now = Timestamp::now();
        let older = estimate("req-1", "shop-1", now);
        let newer = estimate("req-1", "shop-2", now.add_secs(5));
        let other = estimate("req-2", "shop-1", now.add_secs(10));
        for e in [&older, &newer, &other] {
            repo.save(e).await.unwrap();
        }

        let owned = repo.find_by_owner(&PartyId::new("req-1")).await.unwrap();
        assert_eq!(
            owned.iter().map(Estimate::id).collect::<Vec<_>>(),
            vec![newer.id(), older.id()]
        );

        let addressed = repo.find_by_recipient(&PartyId::new("shop-1")).await.unwrap();
        assert_eq!(addressed.len(), 2);
        assert_eq!(repo.find_open().await.unwrap().len(), 3);
    }
}
