//! # Estimate Aggregate Root
//!
//! The estimate aggregate tracks one repair-cost request between a requester
//! and exactly one recipient shop.
//!
//! # State Machine
//!
//! ```text
//! Pending → Assessing → Quoted → Accepted
//!    │                    ↑   └→ Rejected
//!    └────────────────────┘
//! ```
//!
//! `Expired` is derived on read from the optional expiry; it is never stored.
//!
//! # Guards
//!
//! Every mutation checks, in order: the acting party's role, that the
//! estimate is neither expired nor closed, and finally the transition itself.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::domain::entities::estimate::{Estimate, EstimateDraft, QuoteTerms};
//! use estimate_workflow::domain::value_objects::{
//!     Cost, EstimateStatus, PartyId, Timestamp, VehicleDescriptor,
//! };
//! use rust_decimal::Decimal;
//!
//! let now = Timestamp::now();
//! let draft = EstimateDraft::new(
//!     PartyId::new("req-1"),
//!     VehicleDescriptor::new("Honda", "Civic"),
//!     "Rear bumper cracked",
//! );
//! let (mut estimate, _created) = Estimate::open(draft, PartyId::new("shop-1"), now);
//!
//! let terms = QuoteTerms::new(Cost::new(Decimal::from(450)).unwrap());
//! estimate.respond(&PartyId::new("shop-1"), terms, now).unwrap();
//! assert_eq!(estimate.status(), EstimateStatus::Quoted);
//! ```

use crate::domain::entities::assessment::AiAssessment;
use crate::domain::errors::{DomainError, DomainResult, PartyRole};
use crate::domain::events::{
    AssessmentAttached, EstimateAccepted, EstimateCreated, EstimateEvent, EstimateQuoted,
    EstimateRejected, ExpirySet, ReviewStarted,
};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Cost, EstimateId, EstimateStatus, InsuranceDetails, MediaRef, PartyId, VehicleDescriptor,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requester-supplied content of a new estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateDraft {
    /// Owning requester.
    pub requester_id: PartyId,
    /// Vehicle descriptor.
    pub vehicle: VehicleDescriptor,
    /// Free-text damage description.
    pub damage_description: String,
    /// Photo/video references.
    pub media: Vec<MediaRef>,
    /// Optional insurance metadata.
    pub insurance: Option<InsuranceDetails>,
}

impl EstimateDraft {
    /// Creates a draft without media or insurance.
    #[must_use]
    pub fn new(
        requester_id: PartyId,
        vehicle: VehicleDescriptor,
        damage_description: impl Into<String>,
    ) -> Self {
        Self {
            requester_id,
            vehicle,
            damage_description: damage_description.into(),
            media: Vec::new(),
            insurance: None,
        }
    }

    /// Sets the media references.
    #[must_use]
    pub fn with_media(mut self, media: Vec<MediaRef>) -> Self {
        self.media = media;
        self
    }

    /// Sets the insurance metadata.
    #[must_use]
    pub fn with_insurance(mut self, insurance: InsuranceDetails) -> Self {
        self.insurance = Some(insurance);
        self
    }
}

/// Terms a shop submits when responding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTerms {
    /// Quoted cost.
    pub quoted_cost: Cost,
    /// Promised turnaround in days.
    pub timeline_days: Option<u32>,
    /// Free-text details.
    pub details: Option<String>,
}

impl QuoteTerms {
    /// Creates terms with a cost only.
    #[must_use]
    pub fn new(quoted_cost: Cost) -> Self {
        Self {
            quoted_cost,
            timeline_days: None,
            details: None,
        }
    }

    /// Sets the timeline.
    #[must_use]
    pub fn with_timeline_days(mut self, days: u32) -> Self {
        self.timeline_days = Some(days);
        self
    }

    /// Sets the details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// The shop's response, present once the estimate is quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    quoted_cost: Cost,
    timeline_days: Option<u32>,
    details: Option<String>,
    responded_at: Timestamp,
}

impl QuoteResponse {
    /// Returns the quoted cost.
    #[inline]
    #[must_use]
    pub fn quoted_cost(&self) -> Cost {
        self.quoted_cost
    }

    /// Returns the timeline in days.
    #[inline]
    #[must_use]
    pub fn timeline_days(&self) -> Option<u32> {
        self.timeline_days
    }

    /// Returns the details.
    #[inline]
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns when the shop responded.
    #[inline]
    #[must_use]
    pub fn responded_at(&self) -> Timestamp {
        self.responded_at
    }
}

/// Estimate aggregate root.
///
/// # Invariants
///
/// - The response is present iff the stored status is Quoted, Accepted or Rejected
/// - An expiry, when set, was strictly in the future at set time
/// - `version` increases by one on every accepted mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    id: EstimateId,
    requester_id: PartyId,
    recipient_shop_id: PartyId,
    vehicle: VehicleDescriptor,
    damage_description: String,
    media: Vec<MediaRef>,
    insurance: Option<InsuranceDetails>,
    status: EstimateStatus,
    response: Option<QuoteResponse>,
    expires_at: Option<Timestamp>,
    ai_assessment: Option<AiAssessment>,
    /// Version for optimistic locking.
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
    decided_at: Option<Timestamp>,
}

impl Estimate {
    /// Opens a new `Pending` estimate addressed to one shop.
    ///
    /// Returns the estimate together with the creation event for the shop.
    #[must_use]
    pub fn open(draft: EstimateDraft, recipient_shop_id: PartyId, now: Timestamp) -> (Self, EstimateEvent) {
        let estimate = Self {
            id: EstimateId::new_v4(),
            requester_id: draft.requester_id,
            recipient_shop_id,
            vehicle: draft.vehicle,
            damage_description: draft.damage_description,
            media: draft.media,
            insurance: draft.insurance,
            status: EstimateStatus::Pending,
            response: None,
            expires_at: None,
            ai_assessment: None,
            version: 1,
            created_at: now,
            updated_at: now,
            decided_at: None,
        };
        let event = EstimateEvent::Created(EstimateCreated::new(
            estimate.id,
            estimate.recipient_shop_id.clone(),
            estimate.requester_id.clone(),
            estimate.vehicle.clone(),
            now,
        ));
        (estimate, event)
    }

    // ========== Accessors ==========

    /// Returns the estimate ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EstimateId {
        self.id
    }

    /// Returns the owning requester.
    #[inline]
    #[must_use]
    pub fn requester_id(&self) -> &PartyId {
        &self.requester_id
    }

    /// Returns the recipient shop.
    #[inline]
    #[must_use]
    pub fn recipient_shop_id(&self) -> &PartyId {
        &self.recipient_shop_id
    }

    /// Returns the vehicle descriptor.
    #[inline]
    #[must_use]
    pub fn vehicle(&self) -> &VehicleDescriptor {
        &self.vehicle
    }

    /// Returns the damage description.
    #[inline]
    #[must_use]
    pub fn damage_description(&self) -> &str {
        &self.damage_description
    }

    /// Returns the media references.
    #[inline]
    #[must_use]
    pub fn media(&self) -> &[MediaRef] {
        &self.media
    }

    /// Returns the insurance metadata.
    #[inline]
    #[must_use]
    pub fn insurance(&self) -> Option<&InsuranceDetails> {
        self.insurance.as_ref()
    }

    /// Returns the stored status.
    ///
    /// Use [`effective_status`](Self::effective_status) for anything shown
    /// to callers.
    #[inline]
    #[must_use]
    pub fn status(&self) -> EstimateStatus {
        self.status
    }

    /// Returns the shop's response.
    #[inline]
    #[must_use]
    pub fn response(&self) -> Option<&QuoteResponse> {
        self.response.as_ref()
    }

    /// Returns the quoted cost, if quoted.
    #[inline]
    #[must_use]
    pub fn quoted_cost(&self) -> Option<Cost> {
        self.response.as_ref().map(QuoteResponse::quoted_cost)
    }

    /// Returns the expiry.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Returns the AI assessment.
    #[inline]
    #[must_use]
    pub fn ai_assessment(&self) -> Option<&AiAssessment> {
        self.ai_assessment.as_ref()
    }

    /// Returns the version.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns when the estimate was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when the estimate was last updated.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns when the requester decided.
    #[inline]
    #[must_use]
    pub fn decided_at(&self) -> Option<Timestamp> {
        self.decided_at
    }

    // ========== Derived State ==========

    /// Returns true if the expiry passed while the estimate was still open.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.status.is_expirable() && self.expires_at.is_some_and(|at| at.has_passed(now))
    }

    /// Returns the status as observed at `now`.
    #[must_use]
    pub fn effective_status(&self, now: Timestamp) -> EstimateStatus {
        if self.is_expired_at(now) {
            EstimateStatus::Expired
        } else {
            self.status
        }
    }

    /// Returns true if the party is the requester or the recipient shop.
    #[must_use]
    pub fn is_participant(&self, party: &PartyId) -> bool {
        *party == self.requester_id || *party == self.recipient_shop_id
    }

    /// Returns the participant on the other side of `actor`.
    #[must_use]
    pub fn counterparty_of(&self, actor: &PartyId) -> &PartyId {
        if *actor == self.requester_id {
            &self.recipient_shop_id
        } else {
            &self.requester_id
        }
    }

    // ========== Guards ==========

    /// Checks that `party` holds `role` on this estimate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotPermitted` otherwise.
    pub fn ensure_role(&self, party: &PartyId, role: PartyRole) -> DomainResult<()> {
        let holds = match role {
            PartyRole::Requester => *party == self.requester_id,
            PartyRole::RecipientShop => *party == self.recipient_shop_id,
            PartyRole::Participant => self.is_participant(party),
        };
        if holds {
            Ok(())
        } else {
            Err(DomainError::NotPermitted {
                estimate_id: self.id,
                party_id: party.clone(),
                role,
            })
        }
    }

    /// Checks that the estimate still accepts writes at `now`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Expired` or `DomainError::Closed`.
    pub fn ensure_open(&self, now: Timestamp) -> DomainResult<()> {
        if self.is_expired_at(now) {
            return Err(DomainError::Expired {
                estimate_id: self.id,
            });
        }
        if self.status.is_terminal() {
            return Err(DomainError::Closed {
                estimate_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    fn transition_to(&mut self, target: EstimateStatus, now: Timestamp) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidStateTransition {
                estimate_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version = self.version.saturating_add(1);
    }

    // ========== Mutations ==========

    /// Moves the estimate from Pending to Assessing.
    ///
    /// # Errors
    ///
    /// - `DomainError::NotPermitted` if `shop` is not the recipient
    /// - `DomainError::Expired` / `DomainError::Closed` if no longer open
    /// - `DomainError::InvalidStateTransition` if not Pending
    pub fn begin_review(&mut self, shop: &PartyId, now: Timestamp) -> DomainResult<EstimateEvent> {
        self.ensure_role(shop, PartyRole::RecipientShop)?;
        self.ensure_open(now)?;
        self.transition_to(EstimateStatus::Assessing, now)?;
        Ok(EstimateEvent::ReviewStarted(ReviewStarted::new(
            self.id,
            self.requester_id.clone(),
            shop.clone(),
            now,
        )))
    }

    /// Records the shop's quote, moving to Quoted.
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidValue` if the timeline is zero
    /// - `DomainError::NotPermitted` if `shop` is not the recipient
    /// - `DomainError::Expired` / `DomainError::Closed` if no longer open
    /// - `DomainError::InvalidStateTransition` if already quoted
    pub fn respond(
        &mut self,
        shop: &PartyId,
        terms: QuoteTerms,
        now: Timestamp,
    ) -> DomainResult<EstimateEvent> {
        if terms.timeline_days == Some(0) {
            return Err(DomainError::invalid_value("timelineDays", "must be positive"));
        }
        self.ensure_role(shop, PartyRole::RecipientShop)?;
        self.ensure_open(now)?;
        self.transition_to(EstimateStatus::Quoted, now)?;
        let event = EstimateQuoted::new(
            self.id,
            self.requester_id.clone(),
            shop.clone(),
            terms.quoted_cost,
            terms.timeline_days,
            now,
        );
        self.response = Some(QuoteResponse {
            quoted_cost: terms.quoted_cost,
            timeline_days: terms.timeline_days,
            details: terms.details,
            responded_at: now,
        });
        Ok(EstimateEvent::Quoted(event))
    }

    /// Accepts the quote.
    ///
    /// # Errors
    ///
    /// - `DomainError::NotPermitted` if `requester` is not the owner
    /// - `DomainError::Expired` / `DomainError::Closed` if no longer open
    /// - `DomainError::InvalidStateTransition` if not Quoted
    pub fn accept(&mut self, requester: &PartyId, now: Timestamp) -> DomainResult<EstimateEvent> {
        self.ensure_role(requester, PartyRole::Requester)?;
        self.ensure_open(now)?;
        let cost = self
            .quoted_cost()
            .ok_or(DomainError::InvalidStateTransition {
                estimate_id: self.id,
                from: self.status,
                to: EstimateStatus::Accepted,
            })?;
        self.transition_to(EstimateStatus::Accepted, now)?;
        self.decided_at = Some(now);
        Ok(EstimateEvent::Accepted(EstimateAccepted::new(
            self.id,
            self.recipient_shop_id.clone(),
            cost,
            now,
        )))
    }

    /// Rejects the quote.
    ///
    /// # Errors
    ///
    /// - `DomainError::NotPermitted` if `requester` is not the owner
    /// - `DomainError::Expired` / `DomainError::Closed` if no longer open
    /// - `DomainError::InvalidStateTransition` if not Quoted
    pub fn reject(
        &mut self,
        requester: &PartyId,
        reason: Option<String>,
        now: Timestamp,
    ) -> DomainResult<EstimateEvent> {
        self.ensure_role(requester, PartyRole::Requester)?;
        self.ensure_open(now)?;
        self.transition_to(EstimateStatus::Rejected, now)?;
        self.decided_at = Some(now);
        Ok(EstimateEvent::Rejected(EstimateRejected::new(
            self.id,
            self.recipient_shop_id.clone(),
            reason,
            now,
        )))
    }

    /// Sets or replaces the expiry.
    ///
    /// # Errors
    ///
    /// - `DomainError::NotPermitted` if `actor` is not a participant
    /// - `DomainError::Expired` / `DomainError::Closed` if no longer open
    /// - `DomainError::InvalidValue` if `expires_at` is not after `now`
    pub fn set_expiry(
        &mut self,
        actor: &PartyId,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> DomainResult<EstimateEvent> {
        self.ensure_role(actor, PartyRole::Participant)?;
        self.ensure_open(now)?;
        if !expires_at.is_after(&now) {
            return Err(DomainError::invalid_value(
                "expiresAt",
                "must be strictly in the future",
            ));
        }
        self.expires_at = Some(expires_at);
        self.touch(now);
        Ok(EstimateEvent::ExpirySet(ExpirySet::new(
            self.id,
            self.counterparty_of(actor).clone(),
            expires_at,
            now,
        )))
    }

    /// Attaches an AI damage assessment.
    ///
    /// # Errors
    ///
    /// - `DomainError::NotPermitted` if `actor` is not a participant
    /// - `DomainError::Expired` / `DomainError::Closed` if no longer open
    pub fn attach_assessment(
        &mut self,
        actor: &PartyId,
        assessment: AiAssessment,
        now: Timestamp,
    ) -> DomainResult<EstimateEvent> {
        self.ensure_role(actor, PartyRole::Participant)?;
        self.ensure_open(now)?;
        let event = AssessmentAttached::new(
            self.id,
            self.counterparty_of(actor).clone(),
            assessment.estimated_cost(),
            assessment.confidence(),
            now,
        );
        self.ai_assessment = Some(assessment);
        self.touch(now);
        Ok(EstimateEvent::AssessmentAttached(event))
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimate({} {} -> {} {} [{}])",
            self.id, self.requester_id, self.recipient_shop_id, self.vehicle, self.status
        )
    }
}
