//! # Latency Observer
//!
//! Times every workflow operation against a budget.
//!
//! The observer never fails a call. Operations within the budget are logged
//! at debug; slower ones emit a structured `slow operation` warning carrying
//! `operation`, `elapsed_ms` and `budget_ms`, and are counted.

use crate::domain::services::Operation;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default latency budget in milliseconds.
pub const DEFAULT_LATENCY_BUDGET_MS: u64 = 500;

/// Record of the most recent over-budget operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlowOperation {
    /// The operation.
    pub operation: Operation,
    /// How long it took.
    pub elapsed: Duration,
}

/// Wraps operations with timing.
#[derive(Debug)]
pub struct LatencyObserver {
    budget: Duration,
    slow_count: AtomicU64,
    last_slow: Mutex<Option<SlowOperation>>,
}

impl Default for LatencyObserver {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_LATENCY_BUDGET_MS))
    }
}

impl LatencyObserver {
    /// Creates an observer with the given budget.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            slow_count: AtomicU64::new(0),
            last_slow: Mutex::new(None),
        }
    }

    /// Returns the budget.
    #[inline]
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Returns how many operations exceeded the budget.
    #[must_use]
    pub fn slow_count(&self) -> u64 {
        self.slow_count.load(Ordering::Relaxed)
    }

    /// Returns the most recent over-budget operation.
    #[must_use]
    pub fn last_slow(&self) -> Option<SlowOperation> {
        *self.last_slow.lock()
    }

    /// Runs `fut`, timing it under `operation`.
    pub async fn observe<F, T>(&self, operation: Operation, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let started = Instant::now();
        let output = fut.await;
        self.record(operation, started.elapsed());
        output
    }

    fn record(&self, operation: Operation, elapsed: Duration) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if elapsed > self.budget {
            let budget_ms = u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX);
            warn!(
                operation = %operation,
                elapsed_ms,
                budget_ms,
                "slow operation"
            );
            self.slow_count.fetch_add(1, Ordering::Relaxed);
            *self.last_slow.lock() = Some(SlowOperation { operation, elapsed });
        } else {
            debug!(operation = %operation, elapsed_ms, "operation completed");
        }
    }
}
