//! # Cost Value Object
//!
//! Strictly positive monetary amount used for shop quotes.

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quoted repair cost.
///
/// # Invariants
///
/// - Strictly greater than zero
///
/// # Examples
///
/// ```
/// use estimate_workflow::domain::value_objects::cost::Cost;
/// use rust_decimal::Decimal;
///
/// let cost = Cost::new(Decimal::new(45050, 2)).unwrap();
/// assert_eq!(cost.to_string(), "450.50");
///
/// assert!(Cost::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Cost(Decimal);

impl Cost {
    /// Creates a cost, rejecting zero and negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` for `quotedCost` when the amount
    /// is not strictly positive.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::invalid_value(
                "quotedCost",
                "must be strictly positive",
            ));
        }
        Ok(Self(amount))
    }

    /// Returns the amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Cost {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cost> for Decimal {
    fn from(cost: Cost) -> Self {
        cost.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
