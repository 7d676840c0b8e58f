//! # Subscription Tier
//!
//! The ordered set of subscription levels a caller can hold.
//!
//! The declaration order defines the capability order used by the
//! [`TierPolicy`](crate::domain::services::TierPolicy):
//! `Free < Standard < Premium < WowPlus`.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::domain::value_objects::tier::Tier;
//!
//! assert!(Tier::WowPlus > Tier::Premium);
//! assert_eq!("wow_plus".parse::<Tier>().unwrap(), Tier::WowPlus);
//! assert!("platinum".parse::<Tier>().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Subscription tier of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Tier {
    /// Entry level: single-recipient requests and own history.
    Free = 0,
    /// Shops responding to requests.
    Standard = 1,
    /// Broadcast and lead discovery.
    Premium = 2,
    /// AI assessment, expiry control, reminders and AI-assisted resolution.
    WowPlus = 3,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Standard, Tier::Premium, Tier::WowPlus];

    /// Returns true if this tier is at least `required`.
    #[inline]
    #[must_use]
    pub fn at_least(self, required: Tier) -> bool {
        self >= required
    }

    /// Returns the numeric rank of this tier.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Free => "FREE",
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
            Self::WowPlus => "WOW_PLUS",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a tier name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised tier: {0}")]
pub struct UnknownTierError(pub String);

impl FromStr for Tier {
    type Err = UnknownTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "FREE" => Ok(Self::Free),
            "STANDARD" => Ok(Self::Standard),
            "PREMIUM" => Ok(Self::Premium),
            "WOW_PLUS" | "WOWPLUS" => Ok(Self::WowPlus),
            _ => Err(UnknownTierError(s.to_string())),
        }
    }
}
