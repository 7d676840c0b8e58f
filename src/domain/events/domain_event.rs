//! # Domain Event Trait
//!
//! Base trait for all domain events.
//!
//! This module provides the [`DomainEvent`] trait that all estimate events
//! implement, along with the shared [`EventMetadata`] and the [`EventKind`]
//! handed to the notifier.

use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EstimateId, EventId, PartyId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of domain event, as delivered to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A new estimate was opened.
    EstimateCreated,
    /// The shop started reviewing an estimate.
    ReviewStarted,
    /// The shop quoted an estimate.
    EstimateQuoted,
    /// The requester accepted a quote.
    EstimateAccepted,
    /// The requester rejected a quote.
    EstimateRejected,
    /// An expiry was set.
    ExpirySet,
    /// An AI damage assessment was attached.
    AssessmentAttached,
    /// A conflict resolution option was applied.
    ResolutionApplied,
}

impl EventKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EstimateCreated => "ESTIMATE_CREATED",
            Self::ReviewStarted => "REVIEW_STARTED",
            Self::EstimateQuoted => "ESTIMATE_QUOTED",
            Self::EstimateAccepted => "ESTIMATE_ACCEPTED",
            Self::EstimateRejected => "ESTIMATE_REJECTED",
            Self::ExpirySet => "EXPIRY_SET",
            Self::AssessmentAttached => "ASSESSMENT_ATTACHED",
            Self::ResolutionApplied => "RESOLUTION_APPLIED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for all domain events.
///
/// Domain events are immutable records of what happened to an estimate.
/// Each one names the counterparty that should hear about it; the engine
/// emits events and an external notifier delivers them.
pub trait DomainEvent: Send + Sync + fmt::Debug {
    /// Returns the unique identifier for this event.
    fn event_id(&self) -> EventId;

    /// Returns the estimate this event relates to.
    fn estimate_id(&self) -> EstimateId;

    /// Returns when this event occurred.
    fn timestamp(&self) -> Timestamp;

    /// Returns the kind of this event.
    fn event_kind(&self) -> EventKind;

    /// Returns the party to notify.
    fn notify(&self) -> &PartyId;

    /// Returns the human-readable name of this event.
    fn event_name(&self) -> &'static str;
}

/// Common metadata for all domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique identifier for this event.
    pub event_id: EventId,
    /// The estimate this event relates to.
    pub estimate_id: EstimateId,
    /// When this event occurred.
    pub timestamp: Timestamp,
}

impl EventMetadata {
    /// Creates metadata for an estimate event at the given instant.
    #[must_use]
    pub fn for_estimate(estimate_id: EstimateId, timestamp: Timestamp) -> Self {
        Self {
            event_id: EventId::new_v4(),
            estimate_id,
            timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_display_matches_serde() {
        let json = serde_json::to_string(&EventKind::EstimateQuoted).unwrap();
        assert_eq!(json, "\"ESTIMATE_QUOTED\"");
        assert_eq!(EventKind::EstimateQuoted.to_string(), "ESTIMATE_QUOTED");
    }

    #[test]
    fn metadata_generates_distinct_event_ids() {
        let id = EstimateId::new_v4();
        let now = Timestamp::now();
        let a = EventMetadata::for_estimate(id, now);
        let b = EventMetadata::for_estimate(id, now);
        assert_ne!(a.event_id, b.event_id);
        assert_eq!(a.estimate_id, id);
    }
}
