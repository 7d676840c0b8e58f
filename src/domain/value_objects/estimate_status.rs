//! # Estimate Status
//!
//! Estimate lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Pending → Assessing → Quoted → Accepted
//!    │                    ↑   └→ Rejected
//!    └────────────────────┘
//!
//! Pending / Assessing / Quoted ┄┄(expiry passed, read time)┄┄→ Expired
//! ```
//!
//! `Expired` is never the target of a stored transition; it is derived from
//! the expiry timestamp whenever an estimate is read.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::domain::value_objects::estimate_status::EstimateStatus;
//!
//! let status = EstimateStatus::Pending;
//! assert!(status.can_transition_to(EstimateStatus::Quoted));
//! assert!(!status.can_transition_to(EstimateStatus::Accepted));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Estimate lifecycle status.
///
/// # Terminal States
///
/// - [`Accepted`](EstimateStatus::Accepted): the requester took the quote
/// - [`Rejected`](EstimateStatus::Rejected): the requester declined the quote
/// - [`Expired`](EstimateStatus::Expired): derived, the expiry passed first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum EstimateStatus {
    /// Created, waiting for the shop.
    #[default]
    Pending = 0,

    /// The shop has started reviewing the request.
    Assessing = 1,

    /// The shop submitted a quote.
    Quoted = 2,

    /// The requester accepted the quote (terminal).
    Accepted = 3,

    /// The requester rejected the quote (terminal).
    Rejected = 4,

    /// The expiry passed before a decision (terminal, derived).
    Expired = 5,
}

impl EstimateStatus {
    /// Returns true if this is a terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Expired)
    }

    /// Returns true if a stored estimate in this state can still expire.
    #[inline]
    #[must_use]
    pub const fn is_expirable(&self) -> bool {
        matches!(self, Self::Pending | Self::Assessing | Self::Quoted)
    }

    /// Returns true if the estimate carries a quote in this state.
    ///
    /// The response payload is present exactly in these states.
    #[inline]
    #[must_use]
    pub const fn is_quoted_or_later(&self) -> bool {
        matches!(self, Self::Quoted | Self::Accepted | Self::Rejected)
    }

    /// Returns true if the shop has not yet answered.
    #[inline]
    #[must_use]
    pub const fn awaits_response(&self) -> bool {
        matches!(self, Self::Pending | Self::Assessing)
    }

    /// Returns true if this state can transition to the target state.
    ///
    /// - Pending → Assessing, Quoted
    /// - Assessing → Quoted
    /// - Quoted → Accepted, Rejected
    /// - Terminal states → (none)
    ///
    /// `Expired` is never a valid stored target.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Assessing)
                | (Self::Pending, Self::Quoted)
                | (Self::Assessing, Self::Quoted)
                | (Self::Quoted, Self::Accepted)
                | (Self::Quoted, Self::Rejected)
        )
    }

    /// Returns the valid next stored states from this state.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Pending => vec![Self::Assessing, Self::Quoted],
            Self::Assessing => vec![Self::Quoted],
            Self::Quoted => vec![Self::Accepted, Self::Rejected],
            Self::Accepted | Self::Rejected | Self::Expired => vec![],
        }
    }

    /// Returns the numeric value of this state.
    #[inline]
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Assessing => "ASSESSING",
            Self::Quoted => "QUOTED",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        };
        write!(f, "{s}")
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid estimate status: {0}")]
pub struct InvalidEstimateStatusError(pub String);

impl FromStr for EstimateStatus {
    type Err = InvalidEstimateStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "ASSESSING" => Ok(Self::Assessing),
            "QUOTED" => Ok(Self::Quoted),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(InvalidEstimateStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL: [EstimateStatus; 6] = [
        EstimateStatus::Pending,
        EstimateStatus::Assessing,
        EstimateStatus::Quoted,
        EstimateStatus::Accepted,
        EstimateStatus::Rejected,
        EstimateStatus::Expired,
    ];

    mod terminal {
        use super::*;

        #[test]
        fn terminal_states() {
            assert!(!EstimateStatus::Pending.is_terminal());
            assert!(!EstimateStatus::Assessing.is_terminal());
            assert!(!EstimateStatus::Quoted.is_terminal());
            assert!(EstimateStatus::Accepted.is_terminal());
            assert!(EstimateStatus::Rejected.is_terminal());
            assert!(EstimateStatus::Expired.is_terminal());
        }

        #[test]
        fn terminal_states_have_no_transitions() {
            for state in ALL.iter().filter(|s| s.is_terminal()) {
                assert!(state.valid_transitions().is_empty());
                for target in ALL {
                    assert!(!state.can_transition_to(target));
                }
            }
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn forward_path() {
            assert!(EstimateStatus::Pending.can_transition_to(EstimateStatus::Assessing));
            assert!(EstimateStatus::Assessing.can_transition_to(EstimateStatus::Quoted));
            assert!(EstimateStatus::Quoted.can_transition_to(EstimateStatus::Accepted));
            assert!(EstimateStatus::Quoted.can_transition_to(EstimateStatus::Rejected));
        }

        #[test]
        fn pending_may_skip_assessing() {
            assert!(EstimateStatus::Pending.can_transition_to(EstimateStatus::Quoted));
        }

        #[test]
        fn quoted_cannot_be_requoted() {
            assert!(!EstimateStatus::Quoted.can_transition_to(EstimateStatus::Quoted));
        }

        #[test]
        fn decisions_require_a_quote() {
            assert!(!EstimateStatus::Pending.can_transition_to(EstimateStatus::Accepted));
            assert!(!EstimateStatus::Assessing.can_transition_to(EstimateStatus::Rejected));
        }

        #[test]
        fn expired_is_never_a_stored_target() {
            for state in ALL {
                assert!(!state.can_transition_to(EstimateStatus::Expired));
            }
        }

        #[test]
        fn valid_transitions_agree_with_predicate() {
            for from in ALL {
                for to in ALL {
                    assert_eq!(
                        from.can_transition_to(to),
                        from.valid_transitions().contains(&to)
                    );
                }
            }
        }
    }

    mod helpers {
        use super::*;

        #[test]
        fn quoted_or_later() {
            let quoted: Vec<_> = ALL.iter().filter(|s| s.is_quoted_or_later()).collect();
            assert_eq!(
                quoted,
                vec![
                    &EstimateStatus::Quoted,
                    &EstimateStatus::Accepted,
                    &EstimateStatus::Rejected
                ]
            );
        }

        #[test]
        fn default_is_pending() {
            assert_eq!(EstimateStatus::default(), EstimateStatus::Pending);
        }
    }

    #[test]
    fn display_parses_back() {
        for state in ALL {
            assert_eq!(state.to_string().parse::<EstimateStatus>().unwrap(), state);
        }
    }

    #[test]
    fn serde_roundtrip() {
        for state in ALL {
            let json = serde_json::to_string(&state).unwrap();
            let deserialized: EstimateStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(state, deserialized);
        }
    }
}
