//! # REST API
//!
//! axum endpoints over the estimate workflow.
//!
//! Callers identify themselves with the `x-caller-id` and `x-caller-tier`
//! headers; identity and tier are resolved upstream.
//!
//! # Endpoints
//!
//! ## Estimates
//! - `POST /api/v1/estimates` - Create an estimate request
//! - `GET /api/v1/estimates` - List the caller's own requests
//! - `POST /api/v1/estimates/broadcast` - Send one request to many shops
//! - `POST /api/v1/estimates/{id}/review` - Shop starts reviewing
//! - `POST /api/v1/estimates/{id}/response` - Shop submits a quote
//! - `POST /api/v1/estimates/{id}/accept` - Requester accepts
//! - `POST /api/v1/estimates/{id}/reject` - Requester rejects
//! - `POST /api/v1/estimates/{id}/expiry` - Set an expiry
//! - `POST /api/v1/estimates/{id}/assessment` - AI damage assessment
//! - `POST /api/v1/estimates/{id}/resolutions` - AI resolution options
//! - `POST /api/v1/estimates/{id}/resolve` - Apply a resolution option
//!
//! ## Shops
//! - `GET /api/v1/shops/{shop_id}/estimates` - Shop inbox
//! - `GET /api/v1/shops/{shop_id}/leads` - Open leads
//!
//! ## Reminders
//! - `GET /api/v1/reminders` - Pending reminders, filterable by
//!   `ownerId`, `shopId`, `status` and `type`
//!
//! ## Health
//! - `GET /api/v1/health`
//!
//! # Usage
//!
//! ```ignore
//! use estimate_workflow::api::rest::{AppState, create_router};
//!
//! let router = create_router(AppState::new(workflow));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    ApiError, ApiResult, AppState, AuthenticatedCaller, CALLER_ID_HEADER, CALLER_TIER_HEADER,
    ErrorResponse, HealthResponse,
};
pub use routes::create_router;
