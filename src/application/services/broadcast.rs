//! # Broadcast Coordinator
//!
//! Fans one estimate request out to several repair shops.
//!
//! Every recipient gets an independent `Pending` estimate. Dispatches run
//! concurrently, bounded by [`BroadcastConfig::max_concurrent_dispatches`],
//! and each save is bounded by [`BroadcastConfig::dispatch_timeout_ms`].
//! Failures are isolated: one shop failing never affects the others, and
//! the coordinator reports per-recipient outcomes instead of raising.
//!
//! Cancelling the token stops new dispatches. Recipients that were never
//! dispatched are reported as failed; dispatches already in flight run to
//! completion and keep their outcome.

use crate::domain::entities::{Estimate, EstimateDraft};
use crate::domain::events::EstimateEvent;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EstimateId, PartyId};
use crate::infrastructure::persistence::EstimateRepository;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Message reported for recipients skipped by cancellation.
pub const CANCELLED_MESSAGE: &str = "broadcast cancelled before dispatch";

/// Configuration for broadcast dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Maximum dispatches in flight at once.
    pub max_concurrent_dispatches: usize,
    /// Per-dispatch save timeout in milliseconds.
    pub dispatch_timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            max_concurrent_dispatches: 8,
            dispatch_timeout_ms: 2_000,
        }
    }
}

impl BroadcastConfig {
    /// Sets the concurrency bound. Zero is treated as one.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_dispatches = max;
        self
    }

    /// Sets the per-dispatch timeout.
    #[must_use]
    pub fn with_dispatch_timeout(mut self, timeout_ms: u64) -> Self {
        self.dispatch_timeout_ms = timeout_ms;
        self
    }
}

/// Outcome for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    /// Estimate created and persisted.
    Sent,
    /// Dispatch failed or never ran.
    Failed,
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Per-recipient broadcast outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResult {
    /// Recipient shop.
    pub recipient_shop_id: PartyId,
    /// Outcome.
    pub status: DispatchStatus,
    /// Created estimate, when sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_id: Option<EstimateId>,
    /// Human readable outcome.
    pub message: String,
}

impl BroadcastResult {
    fn sent(recipient: PartyId, estimate_id: EstimateId) -> Self {
        Self {
            recipient_shop_id: recipient,
            status: DispatchStatus::Sent,
            estimate_id: Some(estimate_id),
            message: "estimate created".to_string(),
        }
    }

    fn failed(recipient: PartyId, message: impl Into<String>) -> Self {
        Self {
            recipient_shop_id: recipient,
            status: DispatchStatus::Failed,
            estimate_id: None,
            message: message.into(),
        }
    }

    /// Returns true if the estimate was created.
    #[inline]
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.status == DispatchStatus::Sent
    }
}

/// Results of a broadcast, in recipient order.
#[derive(Debug, Clone, Default)]
pub struct BroadcastReport {
    /// One entry per recipient.
    pub results: Vec<BroadcastResult>,
    /// Creation events of the estimates that were sent.
    pub events: Vec<EstimateEvent>,
}

impl BroadcastReport {
    /// Returns the number of recipients that received an estimate.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_sent()).count()
    }

    /// Returns the number of recipients that did not.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.len().saturating_sub(self.sent_count())
    }
}

type DispatchOutcome = Result<(EstimateId, EstimateEvent), String>;

/// Creates one estimate per recipient concurrently.
#[derive(Debug)]
pub struct BroadcastCoordinator {
    repository: Arc<dyn EstimateRepository>,
    config: BroadcastConfig,
}

impl BroadcastCoordinator {
    /// Creates a new coordinator.
    #[must_use]
    pub fn new(repository: Arc<dyn EstimateRepository>, config: BroadcastConfig) -> Self {
        Self { repository, config }
    }

    /// Creates a coordinator with default configuration.
    #[must_use]
    pub fn with_defaults(repository: Arc<dyn EstimateRepository>) -> Self {
        Self::new(repository, BroadcastConfig::default())
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Dispatches `draft` to every recipient.
    ///
    /// Waits for every started dispatch to settle. The report has exactly
    /// one result per recipient, duplicates included.
    pub async fn broadcast(
        &self,
        draft: &EstimateDraft,
        recipients: &[PartyId],
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> BroadcastReport {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_dispatches.max(1)));
        let per_dispatch = Duration::from_millis(self.config.dispatch_timeout_ms);
        let mut handles: Vec<Option<JoinHandle<DispatchOutcome>>> =
            Vec::with_capacity(recipients.len());

        for recipient in recipients {
            if cancel.is_cancelled() {
                handles.push(None);
                continue;
            }
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                permit = Arc::clone(&permits).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                handles.push(None);
                continue;
            };

            let repository = Arc::clone(&self.repository);
            let (estimate, event) = Estimate::open(draft.clone(), recipient.clone(), now);
            handles.push(Some(tokio::spawn(async move {
                let _permit = permit;
                dispatch(repository, estimate, event, per_dispatch).await
            })));
        }

        let mut report = BroadcastReport {
            results: Vec::with_capacity(recipients.len()),
            events: Vec::new(),
        };
        for (recipient, handle) in recipients.iter().zip(handles) {
            let outcome = match handle {
                None => Err(CANCELLED_MESSAGE.to_string()),
                Some(handle) => match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(format!("dispatch task failed: {e}")),
                },
            };
            match outcome {
                Ok((estimate_id, event)) => {
                    report.results.push(BroadcastResult::sent(recipient.clone(), estimate_id));
                    report.events.push(event);
                }
                Err(message) => {
                    warn!(recipient = %recipient, %message, "broadcast dispatch failed");
                    report.results.push(BroadcastResult::failed(recipient.clone(), message));
                }
            }
        }

        debug!(
            recipients = recipients.len(),
            sent = report.sent_count(),
            failed = report.failed_count(),
            "broadcast settled"
        );
        report
    }
}

async fn dispatch(
    repository: Arc<dyn EstimateRepository>,
    estimate: Estimate,
    event: EstimateEvent,
    per_dispatch: Duration,
) -> DispatchOutcome {
    match timeout(per_dispatch, repository.save(&estimate)).await {
        Ok(Ok(())) => Ok((estimate.id(), event)),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "dispatch timed out after {}ms",
            per_dispatch.as_millis()
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::VehicleDescriptor;
    use crate::infrastructure::persistence::in_memory::InMemoryEstimateRepository;
    use crate::infrastructure::persistence::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Repository that refuses estimates addressed to `bad-*` shops and
    /// stalls on `slow-*` shops.
    #[derive(Debug, Default)]
    struct FlakyRepository {
        inner: InMemoryEstimateRepository,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        save_started: Notify,
    }

    #[async_trait]
    impl EstimateRepository for FlakyRepository {
        async fn save(&self, estimate: &Estimate) -> RepositoryResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.save_started.notify_one();
            tokio::time::sleep(Duration::from_millis(20)).await;
            let shop = estimate.recipient_shop_id().as_str().to_string();
            let result = if shop.starts_with("bad") {
                Err(RepositoryError::unavailable("shop unreachable"))
            } else {
                if shop.starts_with("slow") {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                self.inner.save(estimate).await
            };
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        async fn find_by_id(&self, id: &EstimateId) -> RepositoryResult<Option<Estimate>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_owner(&self, owner: &PartyId) -> RepositoryResult<Vec<Estimate>> {
            self.inner.find_by_owner(owner).await
        }

        async fn find_by_recipient(&self, shop: &PartyId) -> RepositoryResult<Vec<Estimate>> {
            self.inner.find_by_recipient(shop).await
        }

        async fn find_open(&self) -> RepositoryResult<Vec<Estimate>> {
            self.inner.find_open().await
        }

        async fn count(&self) -> RepositoryResult<u64> {
            self.inner.count().await
        }
    }

    fn draft() -> EstimateDraft {
        EstimateDraft::new(
            PartyId::new("req-1"),
            VehicleDescriptor::new("Toyota", "Corolla"),
            "Hail damage on roof",
        )
    }

    fn shops(ids: &[&str]) -> Vec<PartyId> {
        ids.iter().map(|s| PartyId::new(*s)).collect()
    }

    mod outcomes {
        use super::*;

        #[tokio::test]
        async fn partial_failure_is_isolated() {
            let repo = Arc::new(FlakyRepository::default());
            let coordinator = BroadcastCoordinator::with_defaults(repo.clone());
            let recipients = shops(&["A", "bad-B", "C"]);

            let report = coordinator
                .broadcast(&draft(), &recipients, Timestamp::now(), &CancellationToken::new())
                .await;

            let statuses: Vec<DispatchStatus> = report.results.iter().map(|r| r.status).collect();
            assert_eq!(
                statuses,
                vec![DispatchStatus::Sent, DispatchStatus::Failed, DispatchStatus::Sent]
            );
            assert_eq!(report.events.len(), 2);
            assert_eq!(repo.count().await.unwrap(), 2);
            assert!(report.results[1].message.contains("shop unreachable"));
        }

        #[tokio::test]
        async fn duplicates_get_independent_estimates() {
            let repo = Arc::new(InMemoryEstimateRepository::new());
            let coordinator = BroadcastCoordinator::with_defaults(repo.clone());
            let recipients = shops(&["A", "A"]);

            let report = coordinator
                .broadcast(&draft(), &recipients, Timestamp::now(), &CancellationToken::new())
                .await;

            assert_eq!(report.sent_count(), 2);
            assert_ne!(report.results[0].estimate_id, report.results[1].estimate_id);
            assert_eq!(repo.find_by_recipient(&PartyId::new("A")).await.unwrap().len(), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn slow_dispatch_times_out() {
            let repo = Arc::new(FlakyRepository::default());
            let coordinator = BroadcastCoordinator::new(
                repo,
                BroadcastConfig::default().with_dispatch_timeout(100),
            );
            let recipients = shops(&["slow-A", "B"]);

            let report = coordinator
                .broadcast(&draft(), &recipients, Timestamp::now(), &CancellationToken::new())
                .await;

            assert!(!report.results[0].is_sent());
            assert!(report.results[0].message.contains("timed out"));
            assert!(report.results[1].is_sent());
        }
    }

    mod concurrency {
        use super::*;

        #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
        async fn dispatches_are_bounded() {
            let repo = Arc::new(FlakyRepository::default());
            let coordinator = BroadcastCoordinator::new(
                repo.clone(),
                BroadcastConfig::default().with_max_concurrent(2),
            );
            let recipients: Vec<PartyId> = (0..10).map(|i| PartyId::new(format!("shop-{i}"))).collect();

            let report = coordinator
                .broadcast(&draft(), &recipients, Timestamp::now(), &CancellationToken::new())
                .await;

            assert_eq!(report.sent_count(), 10);
            assert!(repo.peak.load(Ordering::SeqCst) <= 2);
        }

        #[tokio::test]
        async fn cancelled_before_start_dispatches_nothing() {
            let repo = Arc::new(InMemoryEstimateRepository::new());
            let coordinator = BroadcastCoordinator::with_defaults(repo.clone());
            let cancel = CancellationToken::new();
            cancel.cancel();

            let report = coordinator
                .broadcast(&draft(), &shops(&["A", "B"]), Timestamp::now(), &cancel)
                .await;

            assert_eq!(report.results.len(), 2);
            assert!(report.results.iter().all(|r| r.message == CANCELLED_MESSAGE));
            assert_eq!(repo.count().await.unwrap(), 0);
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn cancellation_keeps_in_flight_dispatches() {
            let repo = Arc::new(FlakyRepository::default());
            let coordinator = Arc::new(BroadcastCoordinator::new(
                repo.clone(),
                BroadcastConfig::default().with_max_concurrent(1),
            ));
            let cancel = CancellationToken::new();
            let recipients = shops(&["A", "B", "C", "D"]);

            let task = {
                let coordinator = Arc::clone(&coordinator);
                let cancel = cancel.clone();
                let recipients = recipients.clone();
                tokio::spawn(async move {
                    coordinator
                        .broadcast(&draft(), &recipients, Timestamp::now(), &cancel)
                        .await
                })
            };
            repo.save_started.notified().await;
            cancel.cancel();
            let report = task.await.unwrap();

            assert_eq!(report.results.len(), 4);
            assert!(report.results[0].is_sent());
            assert!(report.results.iter().any(|r| r.message == CANCELLED_MESSAGE));
            let sent = u64::try_from(report.sent_count()).unwrap();
            assert_eq!(repo.count().await.unwrap(), sent);
        }
    }
}
