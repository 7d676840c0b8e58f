//! # REST Routes
//!
//! Router configuration for the REST API.

use crate::api::rest::handlers::{
    AppState, accept_estimate, assess_damage, broadcast_estimate, create_estimate, health,
    list_leads, list_own_estimates, list_pending_reminders, list_shop_estimates, reject_estimate,
    request_resolutions, resolve_with_ai, respond_to_estimate, set_expiry, start_review,
};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the API router.
///
/// # Routes
///
/// - `GET  /api/v1/health`
/// - `GET  /api/v1/estimates`, `POST /api/v1/estimates`
/// - `POST /api/v1/estimates/broadcast`
/// - `POST /api/v1/estimates/{id}/{review,response,accept,reject,expiry,assessment,resolutions,resolve}`
/// - `GET  /api/v1/shops/{shop_id}/estimates`, `GET /api/v1/shops/{shop_id}/leads`
/// - `GET  /api/v1/reminders`
pub fn create_router(state: AppState) -> Router {
    let estimates = Router::new()
        .route("/", get(list_own_estimates).post(create_estimate))
        .route("/broadcast", post(broadcast_estimate))
        .route("/{id}/review", post(start_review))
        .route("/{id}/response", post(respond_to_estimate))
        .route("/{id}/accept", post(accept_estimate))
        .route("/{id}/reject", post(reject_estimate))
        .route("/{id}/expiry", post(set_expiry))
        .route("/{id}/assessment", post(assess_damage))
        .route("/{id}/resolutions", post(request_resolutions))
        .route("/{id}/resolve", post(resolve_with_ai));

    let shops = Router::new()
        .route("/{shop_id}/estimates", get(list_shop_estimates))
        .route("/{shop_id}/leads", get(list_leads));

    let api = Router::new()
        .route("/health", get(health))
        .route("/reminders", get(list_pending_reminders))
        .nest("/estimates", estimates)
        .nest("/shops", shops);

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
