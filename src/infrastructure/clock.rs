//! # Clock
//!
//! Source of "now" for the workflow. Expiry and reminders are evaluated
//! against this clock so tests can move time explicitly.

use crate::domain::value_objects::timestamp::Timestamp;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Provides the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Moves the clock forward.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.write();
        *now = now.add_secs(secs);
    }

    /// Sets the clock.
    pub fn set(&self, at: Timestamp) {
        *self.now.write() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }
}
