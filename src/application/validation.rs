//! # Request Validation
//!
//! Structural and semantic checks on inbound requests.
//!
//! Validation runs before tier and ownership checks and collects every
//! violation in one pass. Each violation names the offending field by its
//! camelCase wire path, e.g. `quotedCost`, `vehicle.vin` or `mediaRefs[2]`.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::application::validation::Validator;
//!
//! let mut v = Validator::new();
//! let make = v.required_text("vehicle.make", "", 64);
//! let model = v.required_text("vehicle.model", "Civic", 64);
//!
//! assert!(make.is_none());
//! assert!(model.is_some());
//! let errors = v.finish(None::<()>).unwrap_err();
//! assert_eq!(errors.fields(), vec!["vehicle.make"]);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{MediaRef, Tier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Wire path of the field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in one request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    /// Creates an error with a single violation.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Returns the violations.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns the violated field paths in discovery order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }

    /// Returns true if `field` was violated.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Length and count limits applied by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Maximum length of make and model.
    pub max_vehicle_text_len: usize,
    /// Maximum length of the damage description.
    pub max_description_len: usize,
    /// Maximum length of response details.
    pub max_details_len: usize,
    /// Maximum promised timeline in days.
    pub max_timeline_days: u32,
    /// Maximum length of a rejection reason.
    pub max_reason_len: usize,
    /// Maximum length of resolution notes.
    pub max_notes_len: usize,
    /// Maximum length of a chosen option key.
    pub max_option_len: usize,
    /// Maximum length of a party id.
    pub max_party_id_len: usize,
    /// Media items allowed at Free tier.
    pub media_free: usize,
    /// Media items allowed at Standard tier.
    pub media_standard: usize,
    /// Media items allowed at Premium tier.
    pub media_premium: usize,
    /// Media items allowed at WowPlus tier; `None` is unbounded.
    pub media_wow_plus: Option<usize>,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_vehicle_text_len: 64,
            max_description_len: 2000,
            max_details_len: 2000,
            max_timeline_days: 365,
            max_reason_len: 500,
            max_notes_len: 1000,
            max_option_len: 120,
            max_party_id_len: 128,
            media_free: 3,
            media_standard: 5,
            media_premium: 10,
            media_wow_plus: None,
        }
    }
}

impl ValidationLimits {
    /// Returns how many media items `tier` may attach; `None` is unbounded.
    #[must_use]
    pub fn media_limit(&self, tier: Tier) -> Option<usize> {
        match tier {
            Tier::Free => Some(self.media_free),
            Tier::Standard => Some(self.media_standard),
            Tier::Premium => Some(self.media_premium),
            Tier::WowPlus => self.media_wow_plus,
        }
    }
}

/// Collects violations while a request is being checked.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn violation(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Records `field` as violated when `ok` is false.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.violation(field, message);
        }
    }

    /// Validates a required free-text field.
    pub fn required_text(&mut self, field: &str, value: &str, max_len: usize) -> Option<String> {
        if value.trim().is_empty() {
            self.violation(field, "is required");
            return None;
        }
        if value.chars().count() > max_len {
            self.violation(field, format!("must be at most {max_len} characters"));
            return None;
        }
        Some(value.trim().to_string())
    }

    /// Validates an optional free-text field. Blank values count as absent.
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        max_len: usize,
    ) -> Option<Option<String>> {
        match value {
            Some(text) if !text.trim().is_empty() => {
                self.required_text(field, text, max_len).map(Some)
            }
            _ => Some(None),
        }
    }

    /// Keeps the value of a domain constructor, recording its error under
    /// `field`.
    pub fn capture<T>(&mut self, field: impl Into<String>, result: DomainResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(DomainError::InvalidValue { message, .. }) => {
                self.violation(field, message);
                None
            }
            Err(other) => {
                self.violation(field, other.to_string());
                None
            }
        }
    }

    /// Validates a list of media URIs against the tier's count limit.
    pub fn media(
        &mut self,
        field: &str,
        uris: &[String],
        tier: Tier,
        limits: &ValidationLimits,
    ) -> Option<Vec<MediaRef>> {
        let mut ok = true;
        if let Some(limit) = limits.media_limit(tier) {
            if uris.len() > limit {
                self.violation(
                    field,
                    format!("at most {limit} media references are allowed at tier {tier}"),
                );
                ok = false;
            }
        }
        let mut media = Vec::with_capacity(uris.len());
        for (i, uri) in uris.iter().enumerate() {
            match self.capture(format!("{field}[{i}]"), MediaRef::parse(uri)) {
                Some(m) => media.push(m),
                None => ok = false,
            }
        }
        ok.then_some(media)
    }

    /// Returns true if nothing has been violated so far.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Finishes validation.
    ///
    /// `value` is the fully assembled command, `None` if any part failed.
    ///
    /// # Errors
    ///
    /// Returns every recorded violation.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        if !self.violations.is_empty() {
            return Err(ValidationErrors {
                violations: self.violations,
            });
        }
        value.ok_or_else(|| ValidationErrors::single("request", "is invalid"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod validator {
        use super::*;

        #[test]
        fn collects_all_violations_in_order() {
            let mut v = Validator::new();
            v.required_text("vehicle.make", " ", 64);
            v.required_text("damageDescription", &"x".repeat(11), 10);
            v.check(false, "recipientShopIds", "must not be empty");

            let errors = v.finish(Some(())).unwrap_err();
            assert_eq!(
                errors.fields(),
                vec!["vehicle.make", "damageDescription", "recipientShopIds"]
            );
        }

        #[test]
        fn optional_blank_is_absent() {
            let mut v = Validator::new();
            assert_eq!(v.optional_text("details", Some("  "), 10), Some(None));
            assert_eq!(v.optional_text("details", None, 10), Some(None));
            assert_eq!(
                v.optional_text("details", Some("ok"), 10),
                Some(Some("ok".to_string()))
            );
            assert!(v.is_clean());
        }

        #[test]
        fn capture_uses_caller_path() {
            let mut v = Validator::new();
            let media = v.capture("mediaRefs[2]", MediaRef::parse("nope"));
            assert!(media.is_none());
            assert!(v.finish(Some(())).unwrap_err().contains("mediaRefs[2]"));
        }

        #[test]
        fn finish_without_value_or_violation_is_still_an_error() {
            let v = Validator::new();
            assert!(v.finish(None::<u8>).is_err());
        }
    }

    mod media {
        use super::*;

        fn uris(n: usize) -> Vec<String> {
            (0..n).map(|i| format!("https://cdn.example.com/{i}.jpg")).collect()
        }

        #[test]
        fn free_tier_limit() {
            let limits = ValidationLimits::default();
            let mut v = Validator::new();
            assert!(v.media("mediaRefs", &uris(3), Tier::Free, &limits).is_some());
            assert!(v.media("mediaRefs", &uris(4), Tier::Free, &limits).is_none());
            assert_eq!(v.finish(Some(())).unwrap_err().fields(), vec!["mediaRefs"]);
        }

        #[test]
        fn wow_plus_is_unbounded() {
            let limits = ValidationLimits::default();
            let mut v = Validator::new();
            assert_eq!(
                v.media("mediaRefs", &uris(50), Tier::WowPlus, &limits).unwrap().len(),
                50
            );
        }

        #[test]
        fn bad_entries_are_indexed() {
            let limits = ValidationLimits::default();
            let mut v = Validator::new();
            let mut list = uris(2);
            list.push("not a uri".into());
            assert!(v.media("mediaRefs", &list, Tier::Premium, &limits).is_none());
            assert_eq!(v.finish(Some(())).unwrap_err().fields(), vec!["mediaRefs[2]"]);
        }
    }

    #[test]
    fn display_joins_violations() {
        let mut v = Validator::new();
        v.violation("a", "bad");
        v.violation("b", "worse");
        assert_eq!(v.finish(Some(())).unwrap_err().to_string(), "a: bad; b: worse");
    }
}
