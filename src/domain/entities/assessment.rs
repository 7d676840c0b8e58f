//! # AI Assessment
//!
//! Damage assessment produced by the AI oracle.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of an AI damage assessment.
///
/// # Invariants
///
/// - `summary` is non-empty
/// - `estimated_cost` is not negative
/// - `confidence` lies in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAssessment {
    summary: String,
    estimated_cost: Decimal,
    confidence: Decimal,
    assessed_at: Timestamp,
}

impl AiAssessment {
    /// Creates a validated assessment.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` if any invariant is violated.
    pub fn new(
        summary: impl Into<String>,
        estimated_cost: Decimal,
        confidence: Decimal,
        assessed_at: Timestamp,
    ) -> DomainResult<Self> {
        let summary = summary.into();
        if summary.trim().is_empty() {
            return Err(DomainError::invalid_value(
                "assessment.summary",
                "must not be empty",
            ));
        }
        if estimated_cost < Decimal::ZERO {
            return Err(DomainError::invalid_value(
                "assessment.estimatedCost",
                "must not be negative",
            ));
        }
        if confidence < Decimal::ZERO || confidence > Decimal::ONE {
            return Err(DomainError::invalid_value(
                "assessment.confidence",
                "must be between 0 and 1",
            ));
        }
        Ok(Self {
            summary,
            estimated_cost,
            confidence,
            assessed_at,
        })
    }

    /// Returns the summary.
    #[inline]
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the estimated repair cost.
    #[inline]
    #[must_use]
    pub fn estimated_cost(&self) -> Decimal {
        self.estimated_cost
    }

    /// Returns the oracle confidence.
    #[inline]
    #[must_use]
    pub fn confidence(&self) -> Decimal {
        self.confidence
    }

    /// Returns when the assessment was produced.
    #[inline]
    #[must_use]
    pub fn assessed_at(&self) -> Timestamp {
        self.assessed_at
    }
}
