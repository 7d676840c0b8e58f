//! # Tracing Notifier
//!
//! [`Notifier`] that writes each notification to the log. Used by the demo
//! server where no delivery channel is wired up.

use crate::domain::events::EventKind;
use crate::domain::value_objects::PartyId;
use crate::infrastructure::notifications::error::NotifierResult;
use crate::infrastructure::notifications::traits::Notifier;
use async_trait::async_trait;
use tracing::info;

/// Notifier that logs instead of delivering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(
        &self,
        party_id: &PartyId,
        kind: EventKind,
        payload: &serde_json::Value,
    ) -> NotifierResult<()> {
        info!(party_id = %party_id, kind = %kind, payload = %payload, "notification");
        Ok(())
    }
}
