//! # Timestamp Value Object
//!
//! DateTime wrapper with domain-specific methods.
//!
//! Expiry in this crate is always evaluated against an explicit "now"
//! supplied by the caller, so the comparison helpers take the reference
//! instant as an argument instead of reading the wall clock.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::domain::value_objects::timestamp::Timestamp;
//!
//! let now = Timestamp::now();
//! let later = now.add_secs(60);
//!
//! assert!(later.is_after(&now));
//! assert!(!later.has_passed(now));
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// A UTC timestamp.
///
/// Wraps `chrono::DateTime<Utc>` and serializes as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` if the value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use estimate_workflow::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_millis(1704067200000).unwrap();
    /// assert_eq!(ts.timestamp_millis(), 1704067200000);
    /// ```
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Creates a timestamp from Unix seconds.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Parses an RFC 3339 string, normalising any offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error when the input is not RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns the Unix timestamp in milliseconds.
    #[inline]
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Adds seconds to the timestamp (can be negative).
    #[must_use]
    pub fn add_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Adds milliseconds to the timestamp (can be negative).
    #[must_use]
    pub fn add_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Adds whole hours to the timestamp.
    #[must_use]
    pub fn add_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    /// Subtracts seconds from the timestamp.
    #[must_use]
    pub fn sub_secs(&self, secs: i64) -> Self {
        Self(self.0 - Duration::seconds(secs))
    }

    /// Returns true if this instant is at or before `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use estimate_workflow::domain::value_objects::timestamp::Timestamp;
    ///
    /// let now = Timestamp::now();
    /// assert!(now.sub_secs(1).has_passed(now));
    /// assert!(now.has_passed(now));
    /// assert!(!now.add_secs(1).has_passed(now));
    /// ```
    #[inline]
    #[must_use]
    pub fn has_passed(&self, now: Timestamp) -> bool {
        self.0 <= now.0
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Formats the timestamp as RFC 3339.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Returns the underlying DateTime.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = std::time::Duration;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        (self.0 - rhs.0)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod construction {
        use super::*;

        #[test]
        fn from_millis_works() {
            let ts = Timestamp::from_millis(1704067200000).unwrap();
            assert_eq!(ts.timestamp_millis(), 1704067200000);
        }

        #[test]
        fn parse_rfc3339_normalises_offset() {
            let ts = Timestamp::parse_rfc3339("2024-01-01T02:00:00+02:00").unwrap();
            assert_eq!(ts.timestamp_secs(), 1704067200);
        }

        #[test]
        fn parse_rfc3339_rejects_garbage() {
            assert!(Timestamp::parse_rfc3339("tomorrow").is_err());
            assert!(Timestamp::parse_rfc3339("2024-01-01").is_err());
        }
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn add_and_sub_secs() {
            let ts = Timestamp::from_secs(1000).unwrap();
            assert_eq!(ts.add_secs(60).timestamp_secs(), 1060);
            assert_eq!(ts.sub_secs(60).timestamp_secs(), 940);
        }

        #[test]
        fn add_hours() {
            let ts = Timestamp::from_secs(0).unwrap();
            assert_eq!(ts.add_hours(2).timestamp_secs(), 7200);
        }

        #[test]
        fn difference_saturates_at_zero() {
            let earlier = Timestamp::from_secs(1000).unwrap();
            let later = Timestamp::from_secs(1060).unwrap();
            assert_eq!((later - earlier).as_secs(), 60);
            assert_eq!((earlier - later).as_secs(), 0);
        }
    }

    mod comparison {
        use super::*;

        #[test]
        fn has_passed_is_inclusive() {
            let now = Timestamp::from_secs(1000).unwrap();
            assert!(now.has_passed(now));
            assert!(now.sub_secs(1).has_passed(now));
            assert!(!now.add_secs(1).has_passed(now));
        }
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::from_millis(1704067200123).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-01"));
        let deserialized: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, deserialized);
    }
}
