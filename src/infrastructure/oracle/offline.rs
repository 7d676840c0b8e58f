//! # Offline Oracle
//!
//! Deterministic [`AiOracle`] used by tests and the demo server.
//!
//! Assessments scale with the number of media items; resolution options
//! depend on whether the estimate has been quoted.

use crate::domain::entities::{Estimate, ResolutionOption};
use crate::domain::value_objects::{EstimateStatus, MediaRef};
use crate::infrastructure::oracle::error::{OracleError, OracleResult};
use crate::infrastructure::oracle::traits::{AiOracle, AssessmentReport};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;

const BASE_COST: i64 = 150;
const COST_PER_ITEM: i64 = 75;

/// Deterministic offline oracle.
#[derive(Debug, Clone, Default)]
pub struct OfflineOracle {
    latency: Option<Duration>,
}

impl OfflineOracle {
    /// Creates an oracle that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every answer by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl AiOracle for OfflineOracle {
    async fn assess(&self, media: &[MediaRef]) -> OracleResult<AssessmentReport> {
        self.simulate_latency().await;
        if media.is_empty() {
            return Err(OracleError::invalid_request("no media to assess"));
        }
        let items = i64::try_from(media.len()).unwrap_or(i64::MAX);
        let estimated_cost = Decimal::from(BASE_COST)
            .saturating_add(Decimal::from(COST_PER_ITEM).saturating_mul(Decimal::from(items)));
        let confidence = (Decimal::new(5, 1) + Decimal::new(items.min(9), 1) / Decimal::TWO)
            .min(Decimal::new(95, 2));
        Ok(AssessmentReport {
            summary: format!("Visible damage assessed from {} media item(s)", media.len()),
            estimated_cost,
            confidence,
        })
    }

    async fn suggest_resolutions(&self, estimate: &Estimate) -> OracleResult<Vec<ResolutionOption>> {
        self.simulate_latency().await;
        let options = if estimate.status() == EstimateStatus::Quoted {
            vec![
                ResolutionOption::new("accept-as-quoted", "Proceed with the quoted cost"),
                ResolutionOption::new("request-requote", "Shop re-quotes after an in-person inspection"),
                ResolutionOption::new("split-difference", "Settle halfway between quote and AI estimate"),
            ]
        } else {
            vec![
                ResolutionOption::new("await-quote", "Give the shop more time to quote"),
                ResolutionOption::new("redirect", "Send the request to a different shop"),
            ]
        };
        Ok(options)
    }
}
