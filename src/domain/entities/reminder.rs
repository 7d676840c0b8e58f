//! # Reminders
//!
//! Derived follow-up prompts for estimates that are waiting on someone.
//!
//! Reminders are computed from an estimate and the current time; they are
//! never stored.

use crate::domain::entities::estimate::Estimate;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EstimateId, EstimateStatus, PartyId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Why a reminder is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    /// The shop has not answered within the response threshold.
    AwaitingResponse,
    /// The requester has not decided on a quote within the decision threshold.
    AwaitingDecision,
    /// The expiry falls within the expiring-soon window.
    ExpiringSoon,
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingResponse => "AWAITING_RESPONSE",
            Self::AwaitingDecision => "AWAITING_DECISION",
            Self::ExpiringSoon => "EXPIRING_SOON",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing an unknown reminder type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid reminder type: {0}")]
pub struct InvalidReminderTypeError(pub String);

impl FromStr for ReminderType {
    type Err = InvalidReminderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "AWAITING_RESPONSE" => Ok(Self::AwaitingResponse),
            "AWAITING_DECISION" => Ok(Self::AwaitingDecision),
            "EXPIRING_SOON" => Ok(Self::ExpiringSoon),
            _ => Err(InvalidReminderTypeError(s.to_string())),
        }
    }
}

/// Age thresholds after which reminders become due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderThresholds {
    /// Time a shop has to answer before `AwaitingResponse`.
    pub awaiting_response: Duration,
    /// Time a requester has to decide before `AwaitingDecision`.
    pub awaiting_decision: Duration,
    /// Window before expiry in which `ExpiringSoon` fires.
    pub expiring_soon: Duration,
}

impl Default for ReminderThresholds {
    fn default() -> Self {
        let day = Duration::from_secs(24 * 60 * 60);
        Self {
            awaiting_response: day,
            awaiting_decision: day,
            expiring_soon: day,
        }
    }
}

/// A due reminder for one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Estimate the reminder is about.
    pub estimate_id: EstimateId,
    /// Owning requester.
    pub owner_id: PartyId,
    /// Recipient shop.
    pub shop_id: PartyId,
    /// Effective status at evaluation time.
    pub status: EstimateStatus,
    /// Reminder type.
    pub reminder_type: ReminderType,
    /// When the reminder became (or becomes) due.
    pub due_at: Timestamp,
}

fn offset(from: Timestamp, by: Duration) -> Timestamp {
    from.add_millis(i64::try_from(by.as_millis()).unwrap_or(i64::MAX))
}

impl Reminder {
    /// Returns the reminders due for `estimate` at `now`.
    ///
    /// Expired and decided estimates never produce reminders.
    #[must_use]
    pub fn for_estimate(
        estimate: &Estimate,
        now: Timestamp,
        thresholds: &ReminderThresholds,
    ) -> Vec<Self> {
        let status = estimate.effective_status(now);
        if status.is_terminal() {
            return Vec::new();
        }

        let make = |reminder_type, due_at| Self {
            estimate_id: estimate.id(),
            owner_id: estimate.requester_id().clone(),
            shop_id: estimate.recipient_shop_id().clone(),
            status,
            reminder_type,
            due_at,
        };

        let mut reminders = Vec::new();
        if status.awaits_response() {
            let due = offset(estimate.created_at(), thresholds.awaiting_response);
            if due.has_passed(now) {
                reminders.push(make(ReminderType::AwaitingResponse, due));
            }
        }
        if status == EstimateStatus::Quoted {
            if let Some(response) = estimate.response() {
                let due = offset(response.responded_at(), thresholds.awaiting_decision);
                if due.has_passed(now) {
                    reminders.push(make(ReminderType::AwaitingDecision, due));
                }
            }
        }
        if let Some(expires_at) = estimate.expires_at() {
            if offset(now, thresholds.expiring_soon) >= expires_at {
                reminders.push(make(ReminderType::ExpiringSoon, expires_at));
            }
        }
        reminders
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::estimate::{EstimateDraft, QuoteTerms};
    use crate::domain::value_objects::{Cost, VehicleDescriptor};
    use rust_decimal::Decimal;

    const HOUR: i64 = 60 * 60;

    fn estimate_at(now: Timestamp) -> Estimate {
        let draft = EstimateDraft::new(
            PartyId::new("req-1"),
            VehicleDescriptor::new("Ford", "Focus"),
            "Broken mirror",
        );
        Estimate::open(draft, PartyId::new("shop-1"), now).0
    }

    #[test]
    fn fresh_estimate_has_no_reminders() {
        let now = Timestamp::now();
        let estimate = estimate_at(now);
        assert!(Reminder::for_estimate(&estimate, now.add_secs(HOUR), &ReminderThresholds::default()).is_empty());
    }

    #[test]
    fn unanswered_estimate_awaits_response() {
        let created = Timestamp::now();
        let estimate = estimate_at(created);
        let reminders =
            Reminder::for_estimate(&estimate, created.add_secs(25 * HOUR), &ReminderThresholds::default());

        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].reminder_type, ReminderType::AwaitingResponse);
        assert_eq!(reminders[0].due_at, created.add_secs(24 * HOUR));
    }

    #[test]
    fn quoted_estimate_awaits_decision() {
        let created = Timestamp::now();
        let mut estimate = estimate_at(created);
        estimate
            .respond(
                &PartyId::new("shop-1"),
                QuoteTerms::new(Cost::new(Decimal::from(90)).unwrap()),
                created,
            )
            .unwrap();

        let reminders =
            Reminder::for_estimate(&estimate, created.add_secs(30 * HOUR), &ReminderThresholds::default());
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].reminder_type, ReminderType::AwaitingDecision);
        assert_eq!(reminders[0].status, EstimateStatus::Quoted);
    }

    #[test]
    fn expiring_soon_within_window() {
        let created = Timestamp::now();
        let mut estimate = estimate_at(created);
        estimate
            .set_expiry(&PartyId::new("req-1"), created.add_secs(10 * HOUR), created)
            .unwrap();

        let reminders =
            Reminder::for_estimate(&estimate, created.add_secs(HOUR), &ReminderThresholds::default());
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].reminder_type, ReminderType::ExpiringSoon);
        assert_eq!(reminders[0].due_at, created.add_secs(10 * HOUR));
    }

    #[test]
    fn expired_estimate_has_no_reminders() {
        let created = Timestamp::now();
        let mut estimate = estimate_at(created);
        estimate
            .set_expiry(&PartyId::new("req-1"), created.add_secs(HOUR), created)
            .unwrap();

        assert!(
            Reminder::for_estimate(&estimate, created.add_secs(48 * HOUR), &ReminderThresholds::default())
                .is_empty()
        );
    }

    #[test]
    fn reminder_type_parses_loosely() {
        assert_eq!("expiring-soon".parse::<ReminderType>().unwrap(), ReminderType::ExpiringSoon);
        assert!("soon".parse::<ReminderType>().is_err());
    }
}
