//! # Conflict Resolution
//!
//! AI-suggested ways to settle a dispute on an estimate.
//!
//! A resolution is opened with the options the oracle suggested and is
//! applied exactly once by choosing one of them.
//!
//! ```text
//! Open ──apply(option)──→ Applied
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EstimateId, PartyId, ResolutionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One option offered by a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOption {
    /// Stable key the caller chooses by.
    pub key: String,
    /// Human-readable description.
    pub description: String,
}

impl ResolutionOption {
    /// Creates an option.
    #[must_use]
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Resolution lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    /// Waiting for a choice.
    Open,
    /// An option was applied (terminal).
    Applied,
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Applied => write!(f, "APPLIED"),
        }
    }
}

/// A set of suggested resolutions for one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    id: ResolutionId,
    estimate_id: EstimateId,
    requested_by: PartyId,
    options: Vec<ResolutionOption>,
    status: ResolutionStatus,
    chosen_option: Option<String>,
    notes: Option<String>,
    applied_by: Option<PartyId>,
    created_at: Timestamp,
    updated_at: Timestamp,
    version: u64,
}

impl ConflictResolution {
    /// Opens a resolution with the suggested options.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValue` if there are no options, an option
    /// key is blank, or two options share a key.
    pub fn open(
        estimate_id: EstimateId,
        requested_by: PartyId,
        options: Vec<ResolutionOption>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        if options.is_empty() {
            return Err(DomainError::invalid_value(
                "resolution.options",
                "at least one option is required",
            ));
        }
        let mut seen = HashSet::new();
        for option in &options {
            if option.key.trim().is_empty() {
                return Err(DomainError::invalid_value(
                    "resolution.options",
                    "option keys must not be empty",
                ));
            }
            if !seen.insert(option.key.as_str()) {
                return Err(DomainError::invalid_value(
                    "resolution.options",
                    format!("duplicate option key {}", option.key),
                ));
            }
        }
        Ok(Self {
            id: ResolutionId::new_v4(),
            estimate_id,
            requested_by,
            options,
            status: ResolutionStatus::Open,
            chosen_option: None,
            notes: None,
            applied_by: None,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Returns the resolution ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ResolutionId {
        self.id
    }

    /// Returns the estimate this resolution belongs to.
    #[inline]
    #[must_use]
    pub fn estimate_id(&self) -> EstimateId {
        self.estimate_id
    }

    /// Returns the party that requested the resolution.
    #[inline]
    #[must_use]
    pub fn requested_by(&self) -> &PartyId {
        &self.requested_by
    }

    /// Returns the offered options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[ResolutionOption] {
        &self.options
    }

    /// Returns the status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ResolutionStatus {
        self.status
    }

    /// Returns the chosen option key, once applied.
    #[inline]
    #[must_use]
    pub fn chosen_option(&self) -> Option<&str> {
        self.chosen_option.as_deref()
    }

    /// Returns the notes recorded with the choice.
    #[inline]
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns who applied the resolution.
    #[inline]
    #[must_use]
    pub fn applied_by(&self) -> Option<&PartyId> {
        self.applied_by.as_ref()
    }

    /// Returns the creation time.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the last update time.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns the version.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Applies one of the offered options.
    ///
    /// # Errors
    ///
    /// - `DomainError::ResolutionClosed` if already applied
    /// - `DomainError::UnknownResolutionOption` if `option` was not offered
    pub fn apply(
        &mut self,
        actor: &PartyId,
        option: &str,
        notes: Option<String>,
        now: Timestamp,
    ) -> DomainResult<()> {
        if self.status == ResolutionStatus::Applied {
            return Err(DomainError::ResolutionClosed {
                estimate_id: self.estimate_id,
                resolution_id: self.id,
            });
        }
        if !self.options.iter().any(|o| o.key == option) {
            return Err(DomainError::UnknownResolutionOption {
                resolution_id: self.id,
                option: option.to_string(),
            });
        }
        self.status = ResolutionStatus::Applied;
        self.chosen_option = Some(option.to_string());
        self.notes = notes;
        self.applied_by = Some(actor.clone());
        self.updated_at = now;
        self.version = self.version.saturating_add(1);
        Ok(())
    }
}
