//! # Identifiers
//!
//! Strongly typed identifiers for estimates, parties, resolutions and events.
//!
//! UUID-backed identifiers are generated by the engine; [`PartyId`] is an
//! opaque string handed over by the identity layer and is used for both
//! requesters and shops.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::domain::value_objects::ids::{EstimateId, PartyId};
//!
//! let estimate_id = EstimateId::new_v4();
//! let shop = PartyId::new("shop-42");
//!
//! assert_ne!(estimate_id, EstimateId::new_v4());
//! assert_eq!(shop.as_str(), "shop-42");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new random identifier.
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[inline]
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier of an [`Estimate`](crate::domain::entities::Estimate).
    EstimateId
);

uuid_identifier!(
    /// Unique identifier of a [`ConflictResolution`](crate::domain::entities::ConflictResolution).
    ResolutionId
);

uuid_identifier!(
    /// Unique identifier of a domain event.
    EventId
);

/// Identifier of a marketplace party (requester or repair shop).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    /// Creates a party identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PartyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn estimate_ids_are_unique() {
        assert_ne!(EstimateId::new_v4(), EstimateId::new_v4());
    }

    #[test]
    fn estimate_id_parses_its_display_form() {
        let id = EstimateId::new_v4();
        let parsed: EstimateId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn estimate_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<EstimateId>().is_err());
    }

    #[test]
    fn party_id_serializes_transparently() {
        let json = serde_json::to_string(&PartyId::new("shop-1")).unwrap();
        assert_eq!(json, "\"shop-1\"");
    }
}
