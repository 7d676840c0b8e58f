//! # Recording Notifier
//!
//! In-memory [`Notifier`] that keeps every delivered notification.

use crate::domain::events::EventKind;
use crate::domain::value_objects::PartyId;
use crate::infrastructure::notifications::error::{NotifierError, NotifierResult};
use crate::infrastructure::notifications::traits::Notifier;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNotification {
    /// Recipient.
    pub party_id: PartyId,
    /// Event kind.
    pub kind: EventKind,
    /// Serialized event.
    pub payload: serde_json::Value,
}

/// Notifier that records deliveries in memory.
///
/// Can be switched into a failing mode to exercise delivery errors.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<RecordedNotification>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent deliveries fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a snapshot of every delivered notification.
    #[must_use]
    pub fn delivered(&self) -> Vec<RecordedNotification> {
        self.delivered.lock().clone()
    }

    /// Returns the notifications delivered to one party.
    #[must_use]
    pub fn delivered_to(&self, party_id: &PartyId) -> Vec<RecordedNotification> {
        self.delivered
            .lock()
            .iter()
            .filter(|n| &n.party_id == party_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        party_id: &PartyId,
        kind: EventKind,
        payload: &serde_json::Value,
    ) -> NotifierResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifierError::unavailable("recording notifier set to fail"));
        }
        self.delivered.lock().push(RecordedNotification {
            party_id: party_id.clone(),
            kind,
            payload: payload.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_deliveries_per_party() {
        let notifier = RecordingNotifier::new();
        let shop = PartyId::new("shop-1");
        notifier
            .notify(&shop, EventKind::EstimateCreated, &serde_json::json!({"a": 1}))
            .await
            .unwrap();
        notifier
            .notify(&PartyId::new("req-1"), EventKind::EstimateQuoted, &serde_json::Value::Null)
            .await
            .unwrap();

        assert_eq!(notifier.delivered().len(), 2);
        let to_shop = notifier.delivered_to(&shop);
        assert_eq!(to_shop.len(), 1);
        assert_eq!(to_shop[0].kind, EventKind::EstimateCreated);
    }

    #[tokio::test]
    async fn failing_mode_rejects() {
        let notifier = RecordingNotifier::new();
        notifier.set_failing(true);
        let result = notifier
            .notify(&PartyId::new("x"), EventKind::ExpirySet, &serde_json::Value::Null)
            .await;
        assert!(matches!(result, Err(NotifierError::Unavailable { .. })));
        assert!(notifier.delivered().is_empty());
    }
}
