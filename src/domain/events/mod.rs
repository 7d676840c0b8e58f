//! # Domain Events
//!
//! Events emitted by the estimate aggregate and handed to the notifier.
//!
//! - [`EstimateCreated`]: New estimate opened for a shop
//! - [`ReviewStarted`]: Shop began reviewing
//! - [`EstimateQuoted`]: Shop submitted a quote
//! - [`EstimateAccepted`]: Requester accepted the quote
//! - [`EstimateRejected`]: Requester rejected the quote
//! - [`ExpirySet`]: Expiry set on an open estimate
//! - [`AssessmentAttached`]: AI damage assessment attached
//! - [`ResolutionApplied`]: Conflict resolution option applied

pub mod domain_event;
pub mod estimate_events;

pub use domain_event::{DomainEvent, EventKind, EventMetadata};
pub use estimate_events::{
    AssessmentAttached, EstimateAccepted, EstimateCreated, EstimateEvent, EstimateQuoted,
    EstimateRejected, ExpirySet, ResolutionApplied, ReviewStarted,
};
