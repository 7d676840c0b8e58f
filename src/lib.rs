//! # Estimate Workflow
//!
//! Tiered repair-estimate workflow engine.
//!
//! Vehicle owners send damage estimate requests to repair shops. Shops
//! review and quote; requesters accept or reject. Every operation is gated
//! by the caller's subscription tier, and tier-gated fields are projected
//! out of every read.
//!
//! ## Layers
//!
//! - [`domain`]: Value objects, the estimate state machine, reminders,
//!   conflict resolutions, events and the tier policy
//! - [`application`]: The [`EstimateWorkflow`] facade, request validation,
//!   per-estimate serialization, broadcast fan-out and latency tracking
//! - [`infrastructure`]: Repository, notifier, oracle and clock ports with
//!   in-memory adapters
//! - [`api`]: REST endpoints
//! - [`config`] and [`telemetry`]: Layered configuration and tracing setup
//!
//! ## Lifecycle
//!
//! ```text
//! PENDING ──► ASSESSING ──► QUOTED ──► ACCEPTED
//!    │                        ▲   └──► REJECTED
//!    └────────────────────────┘
//! ```
//!
//! An estimate past its expiry reads as `EXPIRED` and refuses mutation.
//!
//! ## Tiers
//!
//! | Tier     | Operations added                               | Fields added                         |
//! |----------|------------------------------------------------|--------------------------------------|
//! | FREE     | create, list own, accept, reject               | identity, status, vehicle, cost      |
//! | STANDARD | review, respond, shop inbox                    | description, media, timeline, details |
//! | PREMIUM  | broadcast, leads                               | insurance                            |
//! | WOW_PLUS | assessment, expiry, reminders, AI resolutions  | expiry, AI assessment                |

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

pub use application::{
    ApplicationError, ApplicationResult, Collaborators, EstimateWorkflow, WorkflowSettings,
};
