//! # Domain Services
//!
//! Pure policy logic that doesn't naturally belong to a single entity.
//!
//! ## Services
//!
//! - [`tier_policy::TierPolicy`]: Operation grants by subscription tier
//! - [`projection::project`]: Field visibility by subscription tier

pub mod projection;
pub mod tier_policy;

pub use projection::{EstimateView, GatedField, project, project_estimate};
pub use tier_policy::{Operation, TierDenied, TierPolicy, UnknownOperationError};
