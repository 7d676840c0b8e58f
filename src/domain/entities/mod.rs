//! # Domain Entities
//!
//! Aggregate roots and entities representing core business concepts.
//!
//! ## Aggregates
//!
//! - [`Estimate`]: Repair estimate with its lifecycle state machine
//! - [`ConflictResolution`]: AI-suggested dispute resolution
//!
//! ## Derived
//!
//! - [`AiAssessment`]: Oracle damage assessment attached to an estimate
//! - [`Reminder`]: Follow-up computed from an estimate at read time

pub mod assessment;
pub mod estimate;
pub mod reminder;
pub mod resolution;

pub use assessment::AiAssessment;
pub use estimate::{Estimate, EstimateDraft, QuoteResponse, QuoteTerms};
pub use reminder::{InvalidReminderTypeError, Reminder, ReminderThresholds, ReminderType};
pub use resolution::{ConflictResolution, ResolutionOption, ResolutionStatus};
