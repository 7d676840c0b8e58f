//! # Application Layer
//!
//! Use-case orchestration on top of the domain.
//!
//! - [`workflow`]: The public operation surface
//! - [`dto`]: Requests, validated commands and acknowledgements
//! - [`validation`]: Field-level request validation
//! - [`services`]: Broadcast, per-estimate serialization, timeouts, latency
//! - [`error`]: The error taxonomy callers see

pub mod dto;
pub mod error;
pub mod services;
pub mod validation;
pub mod workflow;

pub use error::{ApplicationError, ApplicationResult, ErrorKind};
pub use workflow::{Collaborators, EstimateWorkflow, WorkflowSettings};
