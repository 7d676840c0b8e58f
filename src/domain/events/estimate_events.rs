//! # Estimate Events
//!
//! Domain events for the estimate lifecycle.
//!
//! # Event Flow
//!
//! ```text
//! EstimateCreated -> ReviewStarted? -> EstimateQuoted -> EstimateAccepted | EstimateRejected
//!
//! While open: ExpirySet | AssessmentAttached
//! At any point: ResolutionApplied
//! ```
//!
//! Events raised by the shop notify the requester and vice versa.

use crate::domain::events::domain_event::{DomainEvent, EventKind, EventMetadata};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Cost, EstimateId, EventId, PartyId, ResolutionId, VehicleDescriptor,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

macro_rules! impl_domain_event {
    ($event:ty, $kind:expr, $name:literal) => {
        impl DomainEvent for $event {
            fn event_id(&self) -> EventId {
                self.metadata.event_id
            }

            fn estimate_id(&self) -> EstimateId {
                self.metadata.estimate_id
            }

            fn timestamp(&self) -> Timestamp {
                self.metadata.timestamp
            }

            fn event_kind(&self) -> EventKind {
                $kind
            }

            fn notify(&self) -> &PartyId {
                &self.notify
            }

            fn event_name(&self) -> &'static str {
                $name
            }
        }
    };
}

/// Event emitted when a new estimate is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateCreated {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The recipient shop.
    pub notify: PartyId,
    /// The requester who opened the estimate.
    pub requester_id: PartyId,
    /// Vehicle the estimate is about.
    pub vehicle: VehicleDescriptor,
}

impl EstimateCreated {
    /// Creates a new EstimateCreated event.
    #[must_use]
    pub fn new(
        estimate_id: EstimateId,
        shop_id: PartyId,
        requester_id: PartyId,
        vehicle: VehicleDescriptor,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: shop_id,
            requester_id,
            vehicle,
        }
    }
}

impl_domain_event!(EstimateCreated, EventKind::EstimateCreated, "EstimateCreated");

/// Event emitted when the shop starts reviewing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStarted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The requester.
    pub notify: PartyId,
    /// The reviewing shop.
    pub shop_id: PartyId,
}

impl ReviewStarted {
    /// Creates a new ReviewStarted event.
    #[must_use]
    pub fn new(estimate_id: EstimateId, requester_id: PartyId, shop_id: PartyId, at: Timestamp) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: requester_id,
            shop_id,
        }
    }
}

impl_domain_event!(ReviewStarted, EventKind::ReviewStarted, "ReviewStarted");

/// Event emitted when the shop submits a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateQuoted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The requester.
    pub notify: PartyId,
    /// The quoting shop.
    pub shop_id: PartyId,
    /// Quoted cost.
    pub quoted_cost: Cost,
    /// Promised turnaround, if any.
    pub timeline_days: Option<u32>,
}

impl EstimateQuoted {
    /// Creates a new EstimateQuoted event.
    #[must_use]
    pub fn new(
        estimate_id: EstimateId,
        requester_id: PartyId,
        shop_id: PartyId,
        quoted_cost: Cost,
        timeline_days: Option<u32>,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: requester_id,
            shop_id,
            quoted_cost,
            timeline_days,
        }
    }
}

impl_domain_event!(EstimateQuoted, EventKind::EstimateQuoted, "EstimateQuoted");

/// Event emitted when the requester accepts the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateAccepted {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The recipient shop.
    pub notify: PartyId,
    /// The accepted amount.
    pub quoted_cost: Cost,
}

impl EstimateAccepted {
    /// Creates a new EstimateAccepted event.
    #[must_use]
    pub fn new(estimate_id: EstimateId, shop_id: PartyId, quoted_cost: Cost, at: Timestamp) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: shop_id,
            quoted_cost,
        }
    }
}

impl_domain_event!(EstimateAccepted, EventKind::EstimateAccepted, "EstimateAccepted");

/// Event emitted when the requester rejects the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRejected {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The recipient shop.
    pub notify: PartyId,
    /// Reason given by the requester.
    pub reason: Option<String>,
}

impl EstimateRejected {
    /// Creates a new EstimateRejected event.
    #[must_use]
    pub fn new(
        estimate_id: EstimateId,
        shop_id: PartyId,
        reason: Option<String>,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: shop_id,
            reason,
        }
    }
}

impl_domain_event!(EstimateRejected, EventKind::EstimateRejected, "EstimateRejected");

/// Event emitted when an expiry is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirySet {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The other participant.
    pub notify: PartyId,
    /// New expiry.
    pub expires_at: Timestamp,
}

impl ExpirySet {
    /// Creates a new ExpirySet event.
    #[must_use]
    pub fn new(
        estimate_id: EstimateId,
        counterparty: PartyId,
        expires_at: Timestamp,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: counterparty,
            expires_at,
        }
    }
}

impl_domain_event!(ExpirySet, EventKind::ExpirySet, "ExpirySet");

/// Event emitted when an AI assessment is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentAttached {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The other participant.
    pub notify: PartyId,
    /// Cost estimated by the oracle.
    pub estimated_cost: Decimal,
    /// Oracle confidence in `[0, 1]`.
    pub confidence: Decimal,
}

impl AssessmentAttached {
    /// Creates a new AssessmentAttached event.
    #[must_use]
    pub fn new(
        estimate_id: EstimateId,
        counterparty: PartyId,
        estimated_cost: Decimal,
        confidence: Decimal,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: counterparty,
            estimated_cost,
            confidence,
        }
    }
}

impl_domain_event!(AssessmentAttached, EventKind::AssessmentAttached, "AssessmentAttached");

/// Event emitted when a conflict resolution option is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionApplied {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The other participant.
    pub notify: PartyId,
    /// The applied resolution.
    pub resolution_id: ResolutionId,
    /// Key of the chosen option.
    pub chosen_option: String,
}

impl ResolutionApplied {
    /// Creates a new ResolutionApplied event.
    #[must_use]
    pub fn new(
        estimate_id: EstimateId,
        counterparty: PartyId,
        resolution_id: ResolutionId,
        chosen_option: impl Into<String>,
        at: Timestamp,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_estimate(estimate_id, at),
            notify: counterparty,
            resolution_id,
            chosen_option: chosen_option.into(),
        }
    }
}

impl_domain_event!(ResolutionApplied, EventKind::ResolutionApplied, "ResolutionApplied");

/// Enum containing all estimate events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EstimateEvent {
    /// Estimate was opened.
    Created(EstimateCreated),
    /// Shop started reviewing.
    ReviewStarted(ReviewStarted),
    /// Shop quoted.
    Quoted(EstimateQuoted),
    /// Requester accepted.
    Accepted(EstimateAccepted),
    /// Requester rejected.
    Rejected(EstimateRejected),
    /// Expiry was set.
    ExpirySet(ExpirySet),
    /// AI assessment attached.
    AssessmentAttached(AssessmentAttached),
    /// Resolution applied.
    ResolutionApplied(ResolutionApplied),
}

impl EstimateEvent {
    fn inner(&self) -> &dyn DomainEvent {
        match self {
            Self::Created(e) => e,
            Self::ReviewStarted(e) => e,
            Self::Quoted(e) => e,
            Self::Accepted(e) => e,
            Self::Rejected(e) => e,
            Self::ExpirySet(e) => e,
            Self::AssessmentAttached(e) => e,
            Self::ResolutionApplied(e) => e,
        }
    }
}

impl DomainEvent for EstimateEvent {
    fn event_id(&self) -> EventId {
        self.inner().event_id()
    }

    fn estimate_id(&self) -> EstimateId {
        self.inner().estimate_id()
    }

    fn timestamp(&self) -> Timestamp {
        self.inner().timestamp()
    }

    fn event_kind(&self) -> EventKind {
        self.inner().event_kind()
    }

    fn notify(&self) -> &PartyId {
        self.inner().notify()
    }

    fn event_name(&self) -> &'static str {
        self.inner().event_name()
    }
}

impl From<ResolutionApplied> for EstimateEvent {
    fn from(event: ResolutionApplied) -> Self {
        Self::ResolutionApplied(event)
    }
}
