//! # Tier Projection
//!
//! Field visibility of estimates by caller tier.
//!
//! | Tier | Adds |
//! |---|---|
//! | Free | id, parties, effective status, created at, vehicle, quoted cost |
//! | Standard | damage description, media, timeline, details, responded at |
//! | Premium | insurance |
//! | WowPlus | expiry, AI assessment |
//!
//! [`project`] only ever removes fields, so projecting an already projected
//! view at the same tier yields the same view.

use crate::domain::entities::{AiAssessment, Estimate};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Cost, EstimateId, EstimateStatus, InsuranceDetails, MediaRef, PartyId, Tier,
    VehicleDescriptor,
};
use serde::{Deserialize, Serialize};

/// A field that is hidden below some tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedField {
    /// Damage description.
    DamageDescription,
    /// Media references.
    MediaRefs,
    /// Promised timeline.
    TimelineDays,
    /// Response details.
    Details,
    /// Response time.
    RespondedAt,
    /// Insurance metadata.
    Insurance,
    /// Expiry.
    ExpiresAt,
    /// AI assessment.
    AiAssessment,
}

impl GatedField {
    /// Minimum tier that sees the field.
    #[must_use]
    pub const fn minimum_tier(&self) -> Tier {
        match self {
            Self::DamageDescription
            | Self::MediaRefs
            | Self::TimelineDays
            | Self::Details
            | Self::RespondedAt => Tier::Standard,
            Self::Insurance => Tier::Premium,
            Self::ExpiresAt | Self::AiAssessment => Tier::WowPlus,
        }
    }

    fn visible_to(self, tier: Tier) -> bool {
        tier.at_least(self.minimum_tier())
    }
}

/// Caller-facing view of an estimate.
///
/// Ungated fields are always present; gated fields are `None` when hidden
/// or not yet set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateView {
    /// Estimate id.
    pub id: EstimateId,
    /// Owning requester.
    pub requester_id: PartyId,
    /// Recipient shop.
    pub recipient_shop_id: PartyId,
    /// Effective status at read time.
    pub status: EstimateStatus,
    /// Creation time.
    pub created_at: Timestamp,
    /// Vehicle descriptor.
    pub vehicle: VehicleDescriptor,
    /// Quoted cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_cost: Option<Cost>,
    /// Damage description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_description: Option<String>,
    /// Media references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_refs: Option<Vec<MediaRef>>,
    /// Promised timeline in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_days: Option<u32>,
    /// Response details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Response time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<Timestamp>,
    /// Insurance metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<InsuranceDetails>,
    /// Expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    /// AI assessment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_assessment: Option<AiAssessment>,
}

impl EstimateView {
    /// Builds the unprojected view of an estimate as observed at `now`.
    #[must_use]
    pub fn from_estimate(estimate: &Estimate, now: Timestamp) -> Self {
        let response = estimate.response();
        Self {
            id: estimate.id(),
            requester_id: estimate.requester_id().clone(),
            recipient_shop_id: estimate.recipient_shop_id().clone(),
            status: estimate.effective_status(now),
            created_at: estimate.created_at(),
            vehicle: estimate.vehicle().clone(),
            quoted_cost: estimate.quoted_cost(),
            damage_description: Some(estimate.damage_description().to_string()),
            media_refs: Some(estimate.media().to_vec()),
            timeline_days: response.and_then(|r| r.timeline_days()),
            details: response.and_then(|r| r.details()).map(str::to_string),
            responded_at: response.map(|r| r.responded_at()),
            insurance: estimate.insurance().cloned(),
            expires_at: estimate.expires_at(),
            ai_assessment: estimate.ai_assessment().cloned(),
        }
    }
}

/// Strips the fields `tier` may not see.
#[must_use]
pub fn project(tier: Tier, view: &EstimateView) -> EstimateView {
    let mut projected = view.clone();
    let hide = |field: GatedField| !field.visible_to(tier);

    if hide(GatedField::DamageDescription) {
        projected.damage_description = None;
    }
    if hide(GatedField::MediaRefs) {
        projected.media_refs = None;
    }
    if hide(GatedField::TimelineDays) {
        projected.timeline_days = None;
    }
    if hide(GatedField::Details) {
        projected.details = None;
    }
    if hide(GatedField::RespondedAt) {
        projected.responded_at = None;
    }
    if hide(GatedField::Insurance) {
        projected.insurance = None;
    }
    if hide(GatedField::ExpiresAt) {
        projected.expires_at = None;
    }
    if hide(GatedField::AiAssessment) {
        projected.ai_assessment = None;
    }
    projected
}

/// Builds the projected view of an estimate for `tier` at `now`.
#[must_use]
pub fn project_estimate(tier: Tier, estimate: &Estimate, now: Timestamp) -> EstimateView {
    project(tier, &EstimateView::from_estimate(estimate, now))
}
