//! # Vehicle Value Objects
//!
//! Vehicle descriptor, VIN and insurance metadata attached to a request.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a vehicle identification number.
pub const VIN_LENGTH: usize = 17;

/// A 17-character vehicle identification number.
///
/// # Invariants
///
/// - Exactly 17 characters
/// - Uppercase letters and digits, excluding `I`, `O` and `Q`
///
/// # Examples
///
/// ```
/// use estimate_workflow::domain::value_objects::vehicle::Vin;
///
/// assert!(Vin::parse("1HGCM82633A004352").is_ok());
/// assert!(Vin::parse("1HGCM82633A00435O").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    /// Parses a VIN, normalising to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` for `vehicle.vin` when the length
    /// or alphabet is wrong.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let normalised = value.trim().to_ascii_uppercase();
        if normalised.chars().count() != VIN_LENGTH {
            return Err(DomainError::invalid_value(
                "vehicle.vin",
                format!("must be exactly {VIN_LENGTH} characters"),
            ));
        }
        if let Some(bad) = normalised.chars().find(|c| !is_vin_char(*c)) {
            return Err(DomainError::invalid_value(
                "vehicle.vin",
                format!("character '{bad}' is not allowed"),
            ));
        }
        Ok(Self(normalised))
    }

    /// Returns the VIN as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_vin_char(c: char) -> bool {
    c.is_ascii_digit() || (c.is_ascii_uppercase() && !matches!(c, 'I' | 'O' | 'Q'))
}

impl TryFrom<String> for Vin {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle the repair request is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDescriptor {
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Vehicle identification number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<Vin>,
}

impl VehicleDescriptor {
    /// Creates a descriptor with make and model only.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year: None,
            vin: None,
        }
    }

    /// Sets the model year.
    #[must_use]
    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the VIN.
    #[must_use]
    pub fn with_vin(mut self, vin: Vin) -> Self {
        self.vin = Some(vin);
        self
    }
}

impl fmt::Display for VehicleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{year} {} {}", self.make, self.model),
            None => write!(f, "{} {}", self.make, self.model),
        }
    }
}

/// Insurance metadata supplied with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceDetails {
    /// Insurer name.
    pub provider: String,
    /// Policy number.
    pub policy_number: String,
    /// Open claim number, if a claim was filed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_number: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod vin {
        use super::*;

        #[test]
        fn accepts_valid_and_uppercases() {
            let vin = Vin::parse("1hgcm82633a004352").unwrap();
            assert_eq!(vin.as_str(), "1HGCM82633A004352");
        }

        #[test]
        fn rejects_wrong_length() {
            assert!(Vin::parse("1HGCM82633A00435").is_err());
            assert!(Vin::parse("1HGCM82633A0043521").is_err());
        }

        #[test]
        fn rejects_excluded_letters() {
            for bad in ["1HGCM82633A00435I", "1HGCM82633A00435O", "1HGCM82633A00435Q"] {
                assert!(Vin::parse(bad).is_err(), "{bad} should be rejected");
            }
        }

        #[test]
        fn rejects_punctuation() {
            assert!(Vin::parse("1HGCM8263-A004352").is_err());
        }

        #[test]
        fn deserialization_validates() {
            assert!(serde_json::from_str::<Vin>("\"short\"").is_err());
        }
    }

    #[test]
    fn descriptor_display() {
        let vehicle = VehicleDescriptor::new("Honda", "Accord").with_year(2003);
        assert_eq!(vehicle.to_string(), "2003 Honda Accord");
    }
}
