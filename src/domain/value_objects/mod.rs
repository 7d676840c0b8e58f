//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`EstimateId`], [`ResolutionId`], [`EventId`]: UUID-based identifiers
//! - [`PartyId`]: String-based identifier for requesters and shops
//!
//! ## Domain Types
//!
//! - [`Tier`]: Ordered subscription tiers
//! - [`EstimateStatus`]: Estimate lifecycle states
//! - [`Cost`]: Strictly positive quoted amount
//! - [`VehicleDescriptor`], [`Vin`], [`InsuranceDetails`]: Request metadata
//! - [`MediaRef`]: Photo/video reference
//! - [`Timestamp`]: UTC instant

pub mod cost;
pub mod estimate_status;
pub mod ids;
pub mod media;
pub mod tier;
pub mod timestamp;
pub mod vehicle;

pub use cost::Cost;
pub use estimate_status::{EstimateStatus, InvalidEstimateStatusError};
pub use ids::{EstimateId, EventId, PartyId, ResolutionId};
pub use media::MediaRef;
pub use tier::{Tier, UnknownTierError};
pub use timestamp::Timestamp;
pub use vehicle::{InsuranceDetails, VehicleDescriptor, Vin};
