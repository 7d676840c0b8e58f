//! # Notifier Trait
//!
//! Port definition for delivering domain events to parties.
//!
//! The engine decides who hears about what; implementations only deliver.

use crate::domain::events::EventKind;
use crate::domain::value_objects::PartyId;
use crate::infrastructure::notifications::error::NotifierResult;
use async_trait::async_trait;
use std::fmt;

/// Delivers notifications to marketplace parties.
#[async_trait]
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns a `NotifierError` if delivery failed.
    async fn notify(
        &self,
        party_id: &PartyId,
        kind: EventKind,
        payload: &serde_json::Value,
    ) -> NotifierResult<()>;
}
