//! # Data Transfer Objects
//!
//! Inbound requests, their validation into typed commands, and outbound
//! acknowledgements.
//!
//! Requests are deliberately loose (strings and wide integers) so that
//! malformed input reaches the validator and is reported field by field
//! instead of failing deserialization.

use crate::application::validation::{ValidationErrors, ValidationLimits, Validator};
use crate::domain::entities::{EstimateDraft, QuoteTerms, ReminderType};
use crate::domain::services::Operation;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Cost, EstimateId, EstimateStatus, InsuranceDetails, MediaRef, PartyId, ResolutionId, Tier,
    VehicleDescriptor, Vin,
};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Earliest accepted model year.
pub const FIRST_MODEL_YEAR: i32 = 1886;

/// Identity and tier of the caller, resolved upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Party id.
    pub id: PartyId,
    /// Subscription tier.
    pub tier: Tier,
}

impl Caller {
    /// Creates a caller.
    #[must_use]
    pub fn new(id: impl Into<PartyId>, tier: Tier) -> Self {
        Self { id: id.into(), tier }
    }
}

/// Vehicle section of a request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    /// Manufacturer.
    #[serde(default)]
    pub make: String,
    /// Model.
    #[serde(default)]
    pub model: String,
    /// Model year.
    #[serde(default)]
    pub year: Option<i32>,
    /// VIN.
    #[serde(default)]
    pub vin: Option<String>,
}

/// Insurance section of a request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInput {
    /// Insurer.
    #[serde(default)]
    pub provider: String,
    /// Policy number.
    #[serde(default)]
    pub policy_number: String,
    /// Claim number.
    #[serde(default)]
    pub claim_number: Option<String>,
}

/// Content shared by single and broadcast requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePayload {
    /// Vehicle.
    #[serde(default)]
    pub vehicle: VehicleInput,
    /// Damage description.
    #[serde(default)]
    pub damage_description: String,
    /// Media URIs.
    #[serde(default)]
    pub media_refs: Vec<String>,
    /// Insurance metadata.
    #[serde(default)]
    pub insurance: Option<InsuranceInput>,
}

impl EstimatePayload {
    fn validate_into(
        &self,
        v: &mut Validator,
        caller: &Caller,
        now: Timestamp,
        limits: &ValidationLimits,
    ) -> Option<EstimateDraft> {
        let vehicle = validate_vehicle(v, &self.vehicle, now, limits);
        let description =
            v.required_text("damageDescription", &self.damage_description, limits.max_description_len);
        let media = v.media("mediaRefs", &self.media_refs, caller.tier, limits);
        let insurance = match &self.insurance {
            Some(input) => validate_insurance(v, input, limits).map(Some),
            None => Some(None),
        };

        let mut draft = EstimateDraft::new(caller.id.clone(), vehicle?, description?).with_media(media?);
        draft.insurance = insurance?;
        Some(draft)
    }
}

fn validate_vehicle(
    v: &mut Validator,
    input: &VehicleInput,
    now: Timestamp,
    limits: &ValidationLimits,
) -> Option<VehicleDescriptor> {
    let make = v.required_text("vehicle.make", &input.make, limits.max_vehicle_text_len);
    let model = v.required_text("vehicle.model", &input.model, limits.max_vehicle_text_len);
    let latest_year = now.as_datetime().year().saturating_add(1);
    let year = match input.year {
        Some(year) if (FIRST_MODEL_YEAR..=latest_year).contains(&year) => {
            u16::try_from(year).ok().map(Some)
        }
        Some(_) => {
            v.violation(
                "vehicle.year",
                format!("must be between {FIRST_MODEL_YEAR} and {latest_year}"),
            );
            None
        }
        None => Some(None),
    };
    let vin = match input.vin.as_deref() {
        Some(raw) => v.capture("vehicle.vin", Vin::parse(raw)).map(Some),
        None => Some(None),
    };

    let mut vehicle = VehicleDescriptor::new(make?, model?);
    vehicle.year = year?;
    vehicle.vin = vin?;
    Some(vehicle)
}

fn validate_insurance(
    v: &mut Validator,
    input: &InsuranceInput,
    limits: &ValidationLimits,
) -> Option<InsuranceDetails> {
    let max = limits.max_vehicle_text_len;
    let provider = v.required_text("insurance.provider", &input.provider, max);
    let policy_number = v.required_text("insurance.policyNumber", &input.policy_number, max);
    let claim_number = v.optional_text("insurance.claimNumber", input.claim_number.as_deref(), max);
    Some(InsuranceDetails {
        provider: provider?,
        policy_number: policy_number?,
        claim_number: claim_number?,
    })
}

fn validate_party(v: &mut Validator, field: &str, raw: &str, limits: &ValidationLimits) -> Option<PartyId> {
    v.required_text(field, raw, limits.max_party_id_len).map(PartyId::new)
}

/// Parses an estimate id from a path or body.
///
/// # Errors
///
/// Returns a violation on `estimateId` if the id is not a UUID.
pub fn parse_estimate_id(raw: &str) -> Result<EstimateId, ValidationErrors> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationErrors::single("estimateId", "must be a UUID"))
}

/// Parses a party id from a path or query.
///
/// # Errors
///
/// Returns a violation on `field` if the id is blank or too long.
pub fn parse_party_id(field: &str, raw: &str, limits: &ValidationLimits) -> Result<PartyId, ValidationErrors> {
    let mut v = Validator::new();
    let party = validate_party(&mut v, field, raw, limits);
    v.finish(party)
}

// ========== Requests ==========

/// createEstimate request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEstimateRequest {
    /// Recipient shop.
    #[serde(default)]
    pub recipient_shop_id: String,
    /// Estimate content.
    #[serde(flatten)]
    pub payload: EstimatePayload,
}

/// Validated createEstimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEstimateCommand {
    /// Draft owned by the caller.
    pub draft: EstimateDraft,
    /// Recipient shop.
    pub recipient_shop_id: PartyId,
}

impl CreateEstimateRequest {
    /// Validates the request for `caller`.
    ///
    /// # Errors
    ///
    /// Returns every violated field.
    pub fn validate(
        &self,
        caller: &Caller,
        now: Timestamp,
        limits: &ValidationLimits,
    ) -> Result<CreateEstimateCommand, ValidationErrors> {
        let mut v = Validator::new();
        let recipient = validate_party(&mut v, "recipientShopId", &self.recipient_shop_id, limits);
        let draft = self.payload.validate_into(&mut v, caller, now, limits);
        let command = (|| {
            Some(CreateEstimateCommand {
                draft: draft?,
                recipient_shop_id: recipient?,
            })
        })();
        v.finish(command)
    }
}

/// broadcastEstimate request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastEstimateRequest {
    /// Recipient shops; duplicates each get their own estimate.
    #[serde(default)]
    pub recipient_shop_ids: Vec<String>,
    /// Estimate content.
    #[serde(flatten)]
    pub payload: EstimatePayload,
}

/// Validated broadcastEstimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastCommand {
    /// Draft shared by every recipient.
    pub draft: EstimateDraft,
    /// Recipients in request order.
    pub recipients: Vec<PartyId>,
}

impl BroadcastEstimateRequest {
    /// Validates the request for `caller`.
    ///
    /// # Errors
    ///
    /// Returns every violated field; an empty recipient list is a violation.
    pub fn validate(
        &self,
        caller: &Caller,
        now: Timestamp,
        limits: &ValidationLimits,
    ) -> Result<BroadcastCommand, ValidationErrors> {
        let mut v = Validator::new();
        v.check(
            !self.recipient_shop_ids.is_empty(),
            "recipientShopIds",
            "at least one recipient is required",
        );
        let mut recipients = Vec::with_capacity(self.recipient_shop_ids.len());
        let mut recipients_ok = true;
        for (i, raw) in self.recipient_shop_ids.iter().enumerate() {
            match validate_party(&mut v, &format!("recipientShopIds[{i}]"), raw, limits) {
                Some(id) => recipients.push(id),
                None => recipients_ok = false,
            }
        }
        let draft = self.payload.validate_into(&mut v, caller, now, limits);
        let command = draft
            .filter(|_| recipients_ok)
            .map(|draft| BroadcastCommand { draft, recipients });
        v.finish(command)
    }
}

/// respondToEstimate request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    /// Quoted cost.
    #[serde(default)]
    pub quoted_cost: Option<Decimal>,
    /// Promised turnaround.
    #[serde(default)]
    pub timeline_days: Option<i64>,
    /// Free-text details.
    #[serde(default)]
    pub details: Option<String>,
}

impl RespondRequest {
    /// Validates the request into quote terms.
    ///
    /// # Errors
    ///
    /// Returns every violated field.
    pub fn validate(&self, limits: &ValidationLimits) -> Result<QuoteTerms, ValidationErrors> {
        let mut v = Validator::new();
        let cost = match self.quoted_cost {
            Some(amount) => v.capture("quotedCost", Cost::new(amount)),
            None => {
                v.violation("quotedCost", "is required");
                None
            }
        };
        let max_days = limits.max_timeline_days;
        let timeline = match self.timeline_days {
            Some(days) => match u32::try_from(days) {
                Ok(days) if (1..=max_days).contains(&days) => Some(Some(days)),
                _ => {
                    v.violation("timelineDays", format!("must be between 1 and {max_days}"));
                    None
                }
            },
            None => Some(None),
        };
        let details = v.optional_text("details", self.details.as_deref(), limits.max_details_len);

        let terms = (|| {
            Some(QuoteTerms {
                quoted_cost: cost?,
                timeline_days: timeline?,
                details: details?,
            })
        })();
        v.finish(terms)
    }
}

/// rejectEstimate request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    /// Reason given to the shop.
    #[serde(default)]
    pub reason: Option<String>,
}

impl RejectRequest {
    /// Validates the request into an optional reason.
    ///
    /// # Errors
    ///
    /// Returns a violation on `reason` if it is too long.
    pub fn validate(&self, limits: &ValidationLimits) -> Result<Option<String>, ValidationErrors> {
        let mut v = Validator::new();
        let reason = v.optional_text("reason", self.reason.as_deref(), limits.max_reason_len);
        v.finish(reason)
    }
}

/// setExpiry request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetExpiryRequest {
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub expires_at: String,
}

impl SetExpiryRequest {
    /// Validates the request into a future timestamp.
    ///
    /// # Errors
    ///
    /// Returns a violation on `expiresAt` if it does not parse or is not
    /// strictly after `now`.
    pub fn validate(&self, now: Timestamp) -> Result<Timestamp, ValidationErrors> {
        let mut v = Validator::new();
        let at = match Timestamp::parse_rfc3339(self.expires_at.trim()) {
            Ok(at) if at.is_after(&now) => Some(at),
            Ok(_) => {
                v.violation("expiresAt", "must be strictly in the future");
                None
            }
            Err(_) => {
                v.violation("expiresAt", "must be an RFC 3339 timestamp");
                None
            }
        };
        v.finish(at)
    }
}

/// assessDamage request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessDamageRequest {
    /// Media to assess.
    #[serde(default)]
    pub media_refs: Vec<String>,
}

impl AssessDamageRequest {
    /// Validates the request into media references.
    ///
    /// # Errors
    ///
    /// Returns a violation if no media is given or an entry is malformed.
    pub fn validate(
        &self,
        tier: Tier,
        limits: &ValidationLimits,
    ) -> Result<Vec<MediaRef>, ValidationErrors> {
        let mut v = Validator::new();
        v.check(
            !self.media_refs.is_empty(),
            "mediaRefs",
            "at least one media reference is required",
        );
        let media = v.media("mediaRefs", &self.media_refs, tier, limits);
        v.finish(media)
    }
}

/// listPendingReminders filters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderFilter {
    /// Only estimates owned by this requester.
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Only estimates addressed to this shop.
    #[serde(default)]
    pub shop_id: Option<String>,
    /// Only estimates in this effective status.
    #[serde(default)]
    pub status: Option<String>,
    /// Only reminders of this type.
    #[serde(default, rename = "type")]
    pub reminder_type: Option<String>,
}

/// Validated reminder filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReminderQuery {
    /// Owner filter.
    pub owner_id: Option<PartyId>,
    /// Shop filter.
    pub shop_id: Option<PartyId>,
    /// Status filter.
    pub status: Option<EstimateStatus>,
    /// Type filter.
    pub reminder_type: Option<ReminderType>,
}

impl ReminderFilter {
    /// Validates the filters.
    ///
    /// # Errors
    ///
    /// Returns a violation for every filter that does not parse.
    pub fn validate(&self, limits: &ValidationLimits) -> Result<ReminderQuery, ValidationErrors> {
        let mut v = Validator::new();
        let owner_id = match self.owner_id.as_deref() {
            Some(raw) => validate_party(&mut v, "ownerId", raw, limits).map(Some),
            None => Some(None),
        };
        let shop_id = match self.shop_id.as_deref() {
            Some(raw) => validate_party(&mut v, "shopId", raw, limits).map(Some),
            None => Some(None),
        };
        let status = match self.status.as_deref() {
            Some(raw) => match raw.parse::<EstimateStatus>() {
                Ok(status) => Some(Some(status)),
                Err(err) => {
                    v.violation("status", err.to_string());
                    None
                }
            },
            None => Some(None),
        };
        let reminder_type = match self.reminder_type.as_deref() {
            Some(raw) => match raw.parse::<ReminderType>() {
                Ok(t) => Some(Some(t)),
                Err(err) => {
                    v.violation("type", err.to_string());
                    None
                }
            },
            None => Some(None),
        };
        let query = (|| {
            Some(ReminderQuery {
                owner_id: owner_id?,
                shop_id: shop_id?,
                status: status?,
                reminder_type: reminder_type?,
            })
        })();
        v.finish(query)
    }
}

/// resolveWithAI request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    /// Resolution to apply.
    #[serde(default)]
    pub resolution_id: String,
    /// Key of the chosen option.
    #[serde(default)]
    pub chosen_option: String,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated resolveWithAI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveCommand {
    /// Resolution to apply.
    pub resolution_id: ResolutionId,
    /// Chosen option key.
    pub chosen_option: String,
    /// Notes.
    pub notes: Option<String>,
}

impl ResolveRequest {
    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns every violated field.
    pub fn validate(&self, limits: &ValidationLimits) -> Result<ResolveCommand, ValidationErrors> {
        let mut v = Validator::new();
        let resolution_id = match self.resolution_id.trim().parse::<ResolutionId>() {
            Ok(id) => Some(id),
            Err(_) => {
                v.violation("resolutionId", "must be a UUID");
                None
            }
        };
        let chosen_option = v.required_text("chosenOption", &self.chosen_option, limits.max_option_len);
        let notes = v.optional_text("notes", self.notes.as_deref(), limits.max_notes_len);
        let command = (|| {
            Some(ResolveCommand {
                resolution_id: resolution_id?,
                chosen_option: chosen_option?,
                notes: notes?,
            })
        })();
        v.finish(command)
    }
}

// ========== Responses ==========

/// Confirmation of an operation that returns no entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    /// Estimate the operation applied to.
    pub estimate_id: EstimateId,
    /// The operation.
    pub operation: Operation,
    /// When it was applied.
    pub acknowledged_at: Timestamp,
}
