//! # REST Handlers
//!
//! Thin axum adapters over [`EstimateWorkflow`].
//!
//! Handlers only extract, delegate and map errors; every rule lives in the
//! workflow.

use crate::application::dto::{
    Acknowledgement, AssessDamageRequest, BroadcastEstimateRequest, Caller, CreateEstimateRequest,
    RejectRequest, ReminderFilter, ResolveRequest, RespondRequest, SetExpiryRequest,
    parse_estimate_id, parse_party_id,
};
use crate::application::error::{ApplicationError, ErrorKind};
use crate::application::services::BroadcastResult;
use crate::application::validation::FieldViolation;
use crate::application::workflow::EstimateWorkflow;
use crate::domain::entities::{AiAssessment, ConflictResolution, Reminder};
use crate::domain::services::EstimateView;
use crate::domain::value_objects::{EstimateId, PartyId, Tier};
use axum::Json;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Header carrying the resolved caller id.
pub const CALLER_ID_HEADER: &str = "x-caller-id";

/// Header carrying the caller's subscription tier.
pub const CALLER_TIER_HEADER: &str = "x-caller-tier";

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The workflow facade.
    pub workflow: Arc<EstimateWorkflow>,
}

impl AppState {
    /// Wraps a workflow.
    #[must_use]
    pub fn new(workflow: EstimateWorkflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
        }
    }
}

// ========== Errors ==========

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable error code, e.g. `VALIDATION_ERROR`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Violated fields, for validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<FieldViolation>>,
    /// Estimate in conflict, for conflict errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_id: Option<EstimateId>,
}

/// HTTP face of [`ApplicationError`].
#[derive(Debug)]
pub struct ApiError(pub ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        Self(err)
    }
}

impl From<crate::application::validation::ValidationErrors> for ApiError {
    fn from(err: crate::application::validation::ValidationErrors) -> Self {
        Self(ApplicationError::Validation(err))
    }
}

/// Maps an error kind to its HTTP status.
#[must_use]
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DependencyTimeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let body = ErrorResponse {
            code: kind.code().to_string(),
            message: self.0.to_string(),
            violations: self.0.validation_errors().map(|v| v.violations().to_vec()),
            estimate_id: self.0.estimate_id(),
        };
        debug!(code = %kind, message = %body.message, "request failed");
        (status_for(kind), Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// ========== Caller extraction ==========

/// Caller identity resolved upstream and passed in headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller(pub Caller);

impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let id = header(CALLER_ID_HEADER)
            .ok_or_else(|| ApplicationError::unauthorized(format!("missing {CALLER_ID_HEADER} header")))?;
        let tier: Tier = header(CALLER_TIER_HEADER)
            .ok_or_else(|| ApplicationError::unauthorized(format!("missing {CALLER_TIER_HEADER} header")))?
            .parse()
            .map_err(|e: crate::domain::value_objects::UnknownTierError| {
                ApplicationError::unauthorized(e.to_string())
            })?;
        Ok(Self(Caller::new(PartyId::new(id), tier)))
    }
}

fn estimate_id(raw: &str) -> ApiResult<EstimateId> {
    Ok(parse_estimate_id(raw)?)
}

fn shop_id(state: &AppState, raw: &str) -> ApiResult<PartyId> {
    Ok(parse_party_id("shopId", raw, state.workflow.limits())?)
}

// ========== Health ==========

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ========== Estimates ==========

/// `POST /api/v1/estimates`
///
/// # Errors
///
/// Any [`ApplicationError`] of `createEstimate`.
pub async fn create_estimate(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<CreateEstimateRequest>,
) -> ApiResult<(StatusCode, Json<EstimateView>)> {
    let view = state.workflow.create_estimate(&caller, &request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/v1/estimates`
///
/// # Errors
///
/// Any [`ApplicationError`] of `listOwnEstimates`.
pub async fn list_own_estimates(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> ApiResult<Json<Vec<EstimateView>>> {
    Ok(Json(state.workflow.list_own_estimates(&caller).await?))
}

/// `POST /api/v1/estimates/broadcast`
///
/// # Errors
///
/// Any [`ApplicationError`] of `broadcastEstimate`.
pub async fn broadcast_estimate(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<BroadcastEstimateRequest>,
) -> ApiResult<Json<Vec<BroadcastResult>>> {
    Ok(Json(state.workflow.broadcast_estimate(&caller, &request).await?))
}

/// `POST /api/v1/estimates/{id}/review`
///
/// # Errors
///
/// Any [`ApplicationError`] of `startReview`.
pub async fn start_review(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<EstimateView>> {
    let id = estimate_id(&id)?;
    Ok(Json(state.workflow.start_review(&caller, id).await?))
}

/// `POST /api/v1/estimates/{id}/response`
///
/// # Errors
///
/// Any [`ApplicationError`] of `respondToEstimate`.
pub async fn respond_to_estimate(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    Json(request): Json<RespondRequest>,
) -> ApiResult<Json<EstimateView>> {
    let id = estimate_id(&id)?;
    Ok(Json(state.workflow.respond_to_estimate(&caller, id, &request).await?))
}

/// `POST /api/v1/estimates/{id}/accept`
///
/// # Errors
///
/// Any [`ApplicationError`] of `acceptEstimate`.
pub async fn accept_estimate(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<EstimateView>> {
    let id = estimate_id(&id)?;
    Ok(Json(state.workflow.accept_estimate(&caller, id).await?))
}

/// `POST /api/v1/estimates/{id}/reject`
///
/// # Errors
///
/// Any [`ApplicationError`] of `rejectEstimate`.
pub async fn reject_estimate(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> ApiResult<Json<EstimateView>> {
    let id = estimate_id(&id)?;
    Ok(Json(state.workflow.reject_estimate(&caller, id, &request).await?))
}

/// `POST /api/v1/estimates/{id}/expiry`
///
/// # Errors
///
/// Any [`ApplicationError`] of `setExpiry`.
pub async fn set_expiry(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    Json(request): Json<SetExpiryRequest>,
) -> ApiResult<Json<Acknowledgement>> {
    let id = estimate_id(&id)?;
    Ok(Json(state.workflow.set_expiry(&caller, id, &request).await?))
}

/// `POST /api/v1/estimates/{id}/assessment`
///
/// # Errors
///
/// Any [`ApplicationError`] of `assessDamage`.
pub async fn assess_damage(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    Json(request): Json<AssessDamageRequest>,
) -> ApiResult<Json<AiAssessment>> {
    let id = estimate_id(&id)?;
    Ok(Json(state.workflow.assess_damage(&caller, id, &request).await?))
}

/// `POST /api/v1/estimates/{id}/resolutions`
///
/// # Errors
///
/// Any [`ApplicationError`] of `requestResolutions`.
pub async fn request_resolutions(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<ConflictResolution>)> {
    let id = estimate_id(&id)?;
    let resolution = state.workflow.request_resolutions(&caller, id).await?;
    Ok((StatusCode::CREATED, Json(resolution)))
}

/// `POST /api/v1/estimates/{id}/resolve`
///
/// # Errors
///
/// Any [`ApplicationError`] of `resolveWithAI`.
pub async fn resolve_with_ai(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<Acknowledgement>> {
    let id = estimate_id(&id)?;
    Ok(Json(state.workflow.resolve_with_ai(&caller, id, &request).await?))
}

// ========== Shops ==========

/// `GET /api/v1/shops/{shop_id}/estimates`
///
/// # Errors
///
/// Any [`ApplicationError`] of `listShopEstimates`.
pub async fn list_shop_estimates(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(raw): Path<String>,
) -> ApiResult<Json<Vec<EstimateView>>> {
    let shop = shop_id(&state, &raw)?;
    Ok(Json(state.workflow.list_shop_estimates(&caller, &shop).await?))
}

/// `GET /api/v1/shops/{shop_id}/leads`
///
/// # Errors
///
/// Any [`ApplicationError`] of `listLeads`.
pub async fn list_leads(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(raw): Path<String>,
) -> ApiResult<Json<Vec<EstimateView>>> {
    let shop = shop_id(&state, &raw)?;
    Ok(Json(state.workflow.list_leads(&caller, &shop).await?))
}

// ========== Reminders ==========

/// `GET /api/v1/reminders`
///
/// # Errors
///
/// Any [`ApplicationError`] of `listPendingReminders`.
pub async fn list_pending_reminders(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Query(filter): Query<ReminderFilter>,
) -> ApiResult<Json<Vec<Reminder>>> {
    Ok(Json(state.workflow.list_pending_reminders(&caller, &filter).await?))
}
