//! # AI Oracle Trait
//!
//! Port definition for the AI damage-assessment and matching service.
//!
//! The oracle is opaque: the engine sends inputs, validates what comes back
//! and never inspects how it was produced.

use crate::domain::entities::{Estimate, ResolutionOption};
use crate::domain::value_objects::MediaRef;
use crate::infrastructure::oracle::error::OracleResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw assessment returned by the oracle, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    /// Free-text summary of the damage.
    pub summary: String,
    /// Estimated repair cost.
    pub estimated_cost: Decimal,
    /// Confidence, expected in `[0, 1]`.
    pub confidence: Decimal,
}

/// AI oracle collaborator.
#[async_trait]
pub trait AiOracle: Send + Sync + fmt::Debug {
    /// Assesses damage from photo/video references.
    ///
    /// # Errors
    ///
    /// Returns an `OracleError` if the oracle fails or refuses the input.
    async fn assess(&self, media: &[MediaRef]) -> OracleResult<AssessmentReport>;

    /// Suggests ways to resolve a dispute on an estimate.
    ///
    /// # Errors
    ///
    /// Returns an `OracleError` if the oracle fails.
    async fn suggest_resolutions(&self, estimate: &Estimate) -> OracleResult<Vec<ResolutionOption>>;
}
