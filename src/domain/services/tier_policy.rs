//! # Tier Policy
//!
//! Capability gating by subscription tier.
//!
//! [`TierPolicy`] holds an explicit grant table mapping each operation to
//! the minimum tier allowed to invoke it. Grants are additive up the tier
//! order, and an operation missing from the table is denied at every tier.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::domain::services::tier_policy::{Operation, TierPolicy};
//! use estimate_workflow::domain::value_objects::Tier;
//!
//! let policy = TierPolicy::standard();
//! assert!(policy.allows(Tier::Premium, Operation::RespondToEstimate));
//! assert!(!policy.allows(Tier::Free, Operation::BroadcastEstimate));
//! ```

use crate::domain::value_objects::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A public workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Open a single-recipient estimate.
    #[serde(rename = "createEstimate")]
    CreateEstimate,
    /// List the caller's own estimates.
    #[serde(rename = "listOwnEstimates")]
    ListOwnEstimates,
    /// Accept a quote.
    #[serde(rename = "acceptEstimate")]
    AcceptEstimate,
    /// Reject a quote.
    #[serde(rename = "rejectEstimate")]
    RejectEstimate,
    /// Start reviewing a request.
    #[serde(rename = "startReview")]
    StartReview,
    /// Quote a request.
    #[serde(rename = "respondToEstimate")]
    RespondToEstimate,
    /// List estimates addressed to a shop.
    #[serde(rename = "listShopEstimates")]
    ListShopEstimates,
    /// Fan a request out to several shops.
    #[serde(rename = "broadcastEstimate")]
    BroadcastEstimate,
    /// List unanswered estimates addressed to a shop.
    #[serde(rename = "listLeads")]
    ListLeads,
    /// Run the AI damage assessment.
    #[serde(rename = "assessDamage")]
    AssessDamage,
    /// Set an expiry.
    #[serde(rename = "setExpiry")]
    SetExpiry,
    /// List due reminders.
    #[serde(rename = "listPendingReminders")]
    ListPendingReminders,
    /// Ask the AI for resolution options.
    #[serde(rename = "requestResolutions")]
    RequestResolutions,
    /// Apply an AI resolution option.
    #[serde(rename = "resolveWithAI")]
    ResolveWithAi,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Operation; 14] = [
        Operation::CreateEstimate,
        Operation::ListOwnEstimates,
        Operation::AcceptEstimate,
        Operation::RejectEstimate,
        Operation::StartReview,
        Operation::RespondToEstimate,
        Operation::ListShopEstimates,
        Operation::BroadcastEstimate,
        Operation::ListLeads,
        Operation::AssessDamage,
        Operation::SetExpiry,
        Operation::ListPendingReminders,
        Operation::RequestResolutions,
        Operation::ResolveWithAi,
    ];

    /// Returns the wire name of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateEstimate => "createEstimate",
            Self::ListOwnEstimates => "listOwnEstimates",
            Self::AcceptEstimate => "acceptEstimate",
            Self::RejectEstimate => "rejectEstimate",
            Self::StartReview => "startReview",
            Self::RespondToEstimate => "respondToEstimate",
            Self::ListShopEstimates => "listShopEstimates",
            Self::BroadcastEstimate => "broadcastEstimate",
            Self::ListLeads => "listLeads",
            Self::AssessDamage => "assessDamage",
            Self::SetExpiry => "setExpiry",
            Self::ListPendingReminders => "listPendingReminders",
            Self::RequestResolutions => "requestResolutions",
            Self::ResolveWithAi => "resolveWithAI",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operation name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation: {0}")]
pub struct UnknownOperationError(pub String);

impl FromStr for Operation {
    type Err = UnknownOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperationError(s.to_string()))
    }
}

/// A caller's tier does not grant an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} is not available at tier {tier}")]
pub struct TierDenied {
    /// Caller tier.
    pub tier: Tier,
    /// Requested operation.
    pub operation: Operation,
    /// Minimum tier that would be allowed, if the operation is granted at all.
    pub required: Option<Tier>,
}

/// Explicit operation grant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    grants: BTreeMap<Operation, Tier>,
}

impl TierPolicy {
    /// Creates the marketplace's standard grant table.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_grants([
            (Operation::CreateEstimate, Tier::Free),
            (Operation::ListOwnEstimates, Tier::Free),
            (Operation::AcceptEstimate, Tier::Free),
            (Operation::RejectEstimate, Tier::Free),
            (Operation::StartReview, Tier::Standard),
            (Operation::RespondToEstimate, Tier::Standard),
            (Operation::ListShopEstimates, Tier::Standard),
            (Operation::BroadcastEstimate, Tier::Premium),
            (Operation::ListLeads, Tier::Premium),
            (Operation::AssessDamage, Tier::WowPlus),
            (Operation::SetExpiry, Tier::WowPlus),
            (Operation::ListPendingReminders, Tier::WowPlus),
            (Operation::RequestResolutions, Tier::WowPlus),
            (Operation::ResolveWithAi, Tier::WowPlus),
        ])
    }

    /// Creates a policy from explicit `(operation, minimum tier)` grants.
    ///
    /// Operations not listed are denied.
    #[must_use]
    pub fn from_grants(grants: impl IntoIterator<Item = (Operation, Tier)>) -> Self {
        Self {
            grants: grants.into_iter().collect(),
        }
    }

    /// Returns the minimum tier granted an operation.
    #[must_use]
    pub fn minimum_tier(&self, operation: Operation) -> Option<Tier> {
        self.grants.get(&operation).copied()
    }

    /// Returns true if `tier` may invoke `operation`.
    #[must_use]
    pub fn allows(&self, tier: Tier, operation: Operation) -> bool {
        self.minimum_tier(operation)
            .is_some_and(|required| tier.at_least(required))
    }

    /// Checks that `tier` may invoke `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`TierDenied`] when the grant table does not allow it.
    pub fn authorize(&self, tier: Tier, operation: Operation) -> Result<(), TierDenied> {
        if self.allows(tier, operation) {
            Ok(())
        } else {
            Err(TierDenied {
                tier,
                operation,
                required: self.minimum_tier(operation),
            })
        }
    }

    /// Returns every operation available at `tier`.
    #[must_use]
    pub fn operations_for(&self, tier: Tier) -> Vec<Operation> {
        self.grants
            .iter()
            .filter(|(_, required)| tier.at_least(**required))
            .map(|(op, _)| *op)
            .collect()
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod grants {
        use super::*;

        #[test]
        fn free_tier_gets_only_requester_basics() {
            let ops = TierPolicy::standard().operations_for(Tier::Free);
            assert_eq!(
                ops,
                vec![
                    Operation::CreateEstimate,
                    Operation::ListOwnEstimates,
                    Operation::AcceptEstimate,
                    Operation::RejectEstimate,
                ]
            );
        }

        #[test]
        fn grants_are_additive() {
            let policy = TierPolicy::standard();
            for op in Operation::ALL {
                for (lower, higher) in Tier::ALL.iter().zip(Tier::ALL.iter().skip(1)) {
                    if policy.allows(*lower, op) {
                        assert!(policy.allows(*higher, op), "{op} lost at {higher}");
                    }
                }
            }
        }

        #[test]
        fn wow_plus_gets_everything() {
            let policy = TierPolicy::standard();
            assert!(Operation::ALL.iter().all(|op| policy.allows(Tier::WowPlus, *op)));
        }

        #[test]
        fn missing_grant_is_denied_everywhere() {
            let policy = TierPolicy::from_grants([(Operation::CreateEstimate, Tier::Free)]);
            for tier in Tier::ALL {
                assert!(!policy.allows(tier, Operation::SetExpiry));
            }
            let denied = policy.authorize(Tier::WowPlus, Operation::SetExpiry).unwrap_err();
            assert_eq!(denied.required, None);
        }

        #[test]
        fn authorize_reports_required_tier() {
            let denied = TierPolicy::standard()
                .authorize(Tier::Free, Operation::BroadcastEstimate)
                .unwrap_err();
            assert_eq!(denied.required, Some(Tier::Premium));
            assert!(denied.to_string().contains("broadcastEstimate"));
        }
    }

    mod operation_names {
        use super::*;

        #[test]
        fn parse_display_agree() {
            for op in Operation::ALL {
                assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
            }
        }

        #[test]
        fn serde_uses_wire_names() {
            let json = serde_json::to_string(&Operation::ResolveWithAi).unwrap();
            assert_eq!(json, "\"resolveWithAI\"");
        }

        #[test]
        fn unknown_operation() {
            assert!("deleteEverything".parse::<Operation>().is_err());
        }
    }
}
