//! # Estimate Workflow
//!
//! The public operation surface of the engine.
//!
//! Every operation runs the same pipeline inside the latency observer:
//!
//! ```text
//! request ─▶ validation ─▶ tier policy ─▶ mutation under the resolver ─▶ notify ─▶ response
//!                                       └▶ broadcast coordinator ──────┘
//! ```
//!
//! Validation runs before authorization, and both run before anything is
//! loaded or written. Notifications are sent after the mutation committed;
//! a failed delivery is logged and never fails the operation.
//!
//! # Examples
//!
//! ```
//! use estimate_workflow::application::dto::{Caller, CreateEstimateRequest, EstimatePayload, VehicleInput};
//! use estimate_workflow::application::workflow::{Collaborators, EstimateWorkflow, WorkflowSettings};
//! use estimate_workflow::domain::value_objects::{EstimateStatus, Tier};
//!
//! # tokio_test::block_on(async {
//! let workflow = EstimateWorkflow::new(Collaborators::in_memory(), WorkflowSettings::default());
//! let caller = Caller::new("req-1", Tier::Free);
//! let request = CreateEstimateRequest {
//!     recipient_shop_id: "shop-1".into(),
//!     payload: EstimatePayload {
//!         vehicle: VehicleInput { make: "Honda".into(), model: "Civic".into(), ..Default::default() },
//!         damage_description: "Cracked bumper".into(),
//!         ..Default::default()
//!     },
//! };
//!
//! let view = workflow.create_estimate(&caller, &request).await.unwrap();
//! assert_eq!(view.status, EstimateStatus::Pending);
//! # });
//! ```

use crate::application::dto::{
    Acknowledgement, AssessDamageRequest, BroadcastEstimateRequest, Caller, CreateEstimateRequest,
    RejectRequest, ReminderFilter, ReminderQuery, ResolveRequest, RespondRequest, SetExpiryRequest,
};
use crate::application::error::{ApplicationError, ApplicationResult, Collaborator};
use crate::application::services::{
    BroadcastConfig, BroadcastCoordinator, BroadcastResult, ConflictResolver, DependencyGuard,
    LatencyObserver,
};
use crate::application::validation::ValidationLimits;
use crate::domain::entities::{
    AiAssessment, ConflictResolution, Estimate, Reminder, ReminderThresholds,
};
use crate::domain::errors::PartyRole;
use crate::domain::events::{DomainEvent, EstimateEvent, ResolutionApplied};
use crate::domain::services::{EstimateView, Operation, TierPolicy, project_estimate};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EstimateId, PartyId};
use crate::infrastructure::clock::{Clock, SystemClock};
use crate::infrastructure::notifications::{Notifier, TracingNotifier};
use crate::infrastructure::oracle::{AiOracle, OfflineOracle, OracleError};
use crate::infrastructure::persistence::in_memory::{
    InMemoryEstimateRepository, InMemoryResolutionRepository,
};
use crate::infrastructure::persistence::{EstimateRepository, ResolutionRepository};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// External collaborators of the workflow.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Estimate storage.
    pub estimates: Arc<dyn EstimateRepository>,
    /// Resolution storage.
    pub resolutions: Arc<dyn ResolutionRepository>,
    /// Notification delivery.
    pub notifier: Arc<dyn Notifier>,
    /// AI oracle.
    pub oracle: Arc<dyn AiOracle>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// In-memory storage, a logging notifier, the offline oracle and the
    /// system clock.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            estimates: Arc::new(InMemoryEstimateRepository::new()),
            resolutions: Arc::new(InMemoryResolutionRepository::new()),
            notifier: Arc::new(TracingNotifier),
            oracle: Arc::new(OfflineOracle::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the oracle.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn AiOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the estimate repository.
    #[must_use]
    pub fn with_estimates(mut self, estimates: Arc<dyn EstimateRepository>) -> Self {
        self.estimates = estimates;
        self
    }
}

/// Tunables of the workflow.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Operation grants.
    pub policy: TierPolicy,
    /// Budget above which an operation is logged as slow.
    pub latency_budget: Duration,
    /// Budget for every collaborator call.
    pub dependency_timeout: Duration,
    /// Broadcast dispatch settings.
    pub broadcast: BroadcastConfig,
    /// Request validation limits.
    pub limits: ValidationLimits,
    /// Reminder thresholds.
    pub reminders: ReminderThresholds,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            policy: TierPolicy::standard(),
            latency_budget: Duration::from_millis(500),
            dependency_timeout: Duration::from_millis(2_000),
            broadcast: BroadcastConfig::default(),
            limits: ValidationLimits::default(),
            reminders: ReminderThresholds::default(),
        }
    }
}

/// The estimate workflow facade.
#[derive(Debug)]
pub struct EstimateWorkflow {
    policy: TierPolicy,
    estimates: Arc<dyn EstimateRepository>,
    resolutions: Arc<dyn ResolutionRepository>,
    notifier: Arc<dyn Notifier>,
    oracle: Arc<dyn AiOracle>,
    clock: Arc<dyn Clock>,
    resolver: ConflictResolver,
    broadcaster: BroadcastCoordinator,
    latency: LatencyObserver,
    guard: DependencyGuard,
    limits: ValidationLimits,
    thresholds: ReminderThresholds,
}

impl EstimateWorkflow {
    /// Creates a workflow.
    #[must_use]
    pub fn new(collaborators: Collaborators, settings: WorkflowSettings) -> Self {
        let guard = DependencyGuard::new(settings.dependency_timeout);
        Self {
            policy: settings.policy,
            resolver: ConflictResolver::new(Arc::clone(&collaborators.estimates), guard),
            broadcaster: BroadcastCoordinator::new(
                Arc::clone(&collaborators.estimates),
                settings.broadcast,
            ),
            estimates: collaborators.estimates,
            resolutions: collaborators.resolutions,
            notifier: collaborators.notifier,
            oracle: collaborators.oracle,
            clock: collaborators.clock,
            latency: LatencyObserver::new(settings.latency_budget),
            guard,
            limits: settings.limits,
            thresholds: settings.reminders,
        }
    }

    /// Returns the tier policy.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// Returns the latency observer.
    #[inline]
    #[must_use]
    pub fn latency(&self) -> &LatencyObserver {
        &self.latency
    }

    /// Returns the validation limits.
    #[inline]
    #[must_use]
    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    // ========== Requester operations ==========

    /// Opens an estimate addressed to one shop.
    ///
    /// # Errors
    ///
    /// `Validation`, `Unauthorized` or a dependency error.
    pub async fn create_estimate(
        &self,
        caller: &Caller,
        request: &CreateEstimateRequest,
    ) -> ApplicationResult<EstimateView> {
        self.observed(Operation::CreateEstimate, async {
            let now = self.clock.now();
            let command = request.validate(caller, now, &self.limits)?;
            self.authorize(caller, Operation::CreateEstimate)?;

            let (estimate, event) = Estimate::open(command.draft, command.recipient_shop_id, now);
            self.resolver.store(&estimate).await?;
            info!(
                estimate_id = %estimate.id(),
                operation = %Operation::CreateEstimate,
                shop_id = %estimate.recipient_shop_id(),
                "estimate created"
            );
            self.emit(&event).await;
            Ok(project_estimate(caller.tier, &estimate, now))
        })
        .await
    }

    /// Lists the caller's own estimates, newest first.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or a dependency error.
    pub async fn list_own_estimates(&self, caller: &Caller) -> ApplicationResult<Vec<EstimateView>> {
        self.observed(Operation::ListOwnEstimates, async {
            self.authorize(caller, Operation::ListOwnEstimates)?;
            let estimates = self
                .guard
                .call(Collaborator::Repository, self.estimates.find_by_owner(&caller.id))
                .await?;
            Ok(self.project_all(caller, &estimates, |_| true))
        })
        .await
    }

    /// Accepts a quote.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `Conflict` or a dependency error.
    pub async fn accept_estimate(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
    ) -> ApplicationResult<EstimateView> {
        self.observed(Operation::AcceptEstimate, async {
            self.authorize(caller, Operation::AcceptEstimate)?;
            let now = self.clock.now();
            let (estimate, event) = self
                .resolver
                .mutate(estimate_id, |e| e.accept(&caller.id, now))
                .await?;
            self.committed(Operation::AcceptEstimate, &event).await;
            Ok(project_estimate(caller.tier, &estimate, now))
        })
        .await
    }

    /// Rejects a quote.
    ///
    /// # Errors
    ///
    /// `Validation`, `Unauthorized`, `NotFound`, `Conflict` or a dependency
    /// error.
    pub async fn reject_estimate(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
        request: &RejectRequest,
    ) -> ApplicationResult<EstimateView> {
        self.observed(Operation::RejectEstimate, async {
            let reason = request.validate(&self.limits)?;
            self.authorize(caller, Operation::RejectEstimate)?;
            let now = self.clock.now();
            let (estimate, event) = self
                .resolver
                .mutate(estimate_id, |e| e.reject(&caller.id, reason, now))
                .await?;
            self.committed(Operation::RejectEstimate, &event).await;
            Ok(project_estimate(caller.tier, &estimate, now))
        })
        .await
    }

    /// Fans an estimate out to several shops.
    ///
    /// Per-recipient failures are reported in the result list, never raised.
    ///
    /// # Errors
    ///
    /// `Validation` (including an empty recipient list) or `Unauthorized`.
    pub async fn broadcast_estimate(
        &self,
        caller: &Caller,
        request: &BroadcastEstimateRequest,
    ) -> ApplicationResult<Vec<BroadcastResult>> {
        self.broadcast_estimate_with_cancel(caller, request, &CancellationToken::new())
            .await
    }

    /// Same as [`broadcast_estimate`](Self::broadcast_estimate), stopping new
    /// dispatches once `cancel` fires.
    ///
    /// # Errors
    ///
    /// `Validation` (including an empty recipient list) or `Unauthorized`.
    pub async fn broadcast_estimate_with_cancel(
        &self,
        caller: &Caller,
        request: &BroadcastEstimateRequest,
        cancel: &CancellationToken,
    ) -> ApplicationResult<Vec<BroadcastResult>> {
        self.observed(Operation::BroadcastEstimate, async {
            let now = self.clock.now();
            let command = request.validate(caller, now, &self.limits)?;
            self.authorize(caller, Operation::BroadcastEstimate)?;

            let report = self
                .broadcaster
                .broadcast(&command.draft, &command.recipients, now, cancel)
                .await;
            info!(
                operation = %Operation::BroadcastEstimate,
                requester_id = %caller.id,
                recipients = command.recipients.len(),
                sent = report.sent_count(),
                "estimate broadcast"
            );
            for event in &report.events {
                self.emit(event).await;
            }
            Ok(report.results)
        })
        .await
    }

    // ========== Shop operations ==========

    /// Marks an estimate as under review.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `Conflict` or a dependency error.
    pub async fn start_review(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
    ) -> ApplicationResult<EstimateView> {
        self.observed(Operation::StartReview, async {
            self.authorize(caller, Operation::StartReview)?;
            let now = self.clock.now();
            let (estimate, event) = self
                .resolver
                .mutate(estimate_id, |e| e.begin_review(&caller.id, now))
                .await?;
            self.committed(Operation::StartReview, &event).await;
            Ok(project_estimate(caller.tier, &estimate, now))
        })
        .await
    }

    /// Quotes an estimate.
    ///
    /// # Errors
    ///
    /// `Validation`, `Unauthorized`, `NotFound`, `Conflict` or a dependency
    /// error.
    pub async fn respond_to_estimate(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
        request: &RespondRequest,
    ) -> ApplicationResult<EstimateView> {
        self.observed(Operation::RespondToEstimate, async {
            let terms = request.validate(&self.limits)?;
            self.authorize(caller, Operation::RespondToEstimate)?;
            let now = self.clock.now();
            let (estimate, event) = self
                .resolver
                .mutate(estimate_id, |e| e.respond(&caller.id, terms, now))
                .await?;
            self.committed(Operation::RespondToEstimate, &event).await;
            Ok(project_estimate(caller.tier, &estimate, now))
        })
        .await
    }

    /// Lists estimates addressed to `shop_id`, newest first.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the caller is not that shop, or a dependency error.
    pub async fn list_shop_estimates(
        &self,
        caller: &Caller,
        shop_id: &PartyId,
    ) -> ApplicationResult<Vec<EstimateView>> {
        self.observed(Operation::ListShopEstimates, async {
            self.authorize(caller, Operation::ListShopEstimates)?;
            let estimates = self.shop_estimates(caller, shop_id).await?;
            Ok(self.project_all(caller, &estimates, |_| true))
        })
        .await
    }

    /// Lists estimates addressed to `shop_id` that still await an answer.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the caller is not that shop, or a dependency error.
    pub async fn list_leads(
        &self,
        caller: &Caller,
        shop_id: &PartyId,
    ) -> ApplicationResult<Vec<EstimateView>> {
        self.observed(Operation::ListLeads, async {
            self.authorize(caller, Operation::ListLeads)?;
            let estimates = self.shop_estimates(caller, shop_id).await?;
            let now = self.clock.now();
            Ok(self.project_all(caller, &estimates, |e| {
                e.effective_status(now).awaits_response()
            }))
        })
        .await
    }

    // ========== WowPlus operations ==========

    /// Runs the AI damage assessment and attaches it to the estimate.
    ///
    /// # Errors
    ///
    /// `Validation`, `Unauthorized`, `NotFound`, `Conflict`, or a dependency
    /// error if the oracle times out, fails or returns an unusable report.
    pub async fn assess_damage(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
        request: &AssessDamageRequest,
    ) -> ApplicationResult<AiAssessment> {
        self.observed(Operation::AssessDamage, async {
            let media = request.validate(caller.tier, &self.limits)?;
            self.authorize(caller, Operation::AssessDamage)?;

            let current = self.resolver.load(estimate_id).await?;
            current.ensure_role(&caller.id, PartyRole::Participant)?;
            current.ensure_open(self.clock.now())?;

            let report = self
                .guard
                .call(Collaborator::Oracle, self.oracle.assess(&media))
                .await?;
            let now = self.clock.now();
            let assessment = AiAssessment::new(
                report.summary,
                report.estimated_cost,
                report.confidence,
                now,
            )
            .map_err(|e| ApplicationError::dependency_failed(OracleError::invalid_response(e.to_string())))?;

            let (_, event) = self
                .resolver
                .mutate(estimate_id, |e| e.attach_assessment(&caller.id, assessment.clone(), now))
                .await?;
            self.committed(Operation::AssessDamage, &event).await;
            Ok(assessment)
        })
        .await
    }

    /// Sets the estimate's expiry.
    ///
    /// # Errors
    ///
    /// `Validation`, `Unauthorized`, `NotFound`, `Conflict` or a dependency
    /// error.
    pub async fn set_expiry(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
        request: &SetExpiryRequest,
    ) -> ApplicationResult<Acknowledgement> {
        self.observed(Operation::SetExpiry, async {
            let now = self.clock.now();
            let expires_at = request.validate(now)?;
            self.authorize(caller, Operation::SetExpiry)?;
            let (_, event) = self
                .resolver
                .mutate(estimate_id, |e| e.set_expiry(&caller.id, expires_at, now))
                .await?;
            self.committed(Operation::SetExpiry, &event).await;
            Ok(acknowledge(estimate_id, Operation::SetExpiry, now))
        })
        .await
    }

    /// Lists reminders due on estimates the caller owns or receives.
    ///
    /// Sorted by due time, earliest first.
    ///
    /// # Errors
    ///
    /// `Validation`, `Unauthorized` or a dependency error.
    pub async fn list_pending_reminders(
        &self,
        caller: &Caller,
        filter: &ReminderFilter,
    ) -> ApplicationResult<Vec<Reminder>> {
        self.observed(Operation::ListPendingReminders, async {
            let query = filter.validate(&self.limits)?;
            self.authorize(caller, Operation::ListPendingReminders)?;

            let owned = self
                .guard
                .call(Collaborator::Repository, self.estimates.find_by_owner(&caller.id))
                .await?;
            let received = self
                .guard
                .call(Collaborator::Repository, self.estimates.find_by_recipient(&caller.id))
                .await?;

            let now = self.clock.now();
            let mut seen = HashSet::new();
            let mut reminders: Vec<Reminder> = owned
                .iter()
                .chain(received.iter())
                .filter(|e| seen.insert(e.id()))
                .flat_map(|e| Reminder::for_estimate(e, now, &self.thresholds))
                .filter(|r| matches_query(r, &query))
                .collect();
            reminders.sort_by(|a, b| a.due_at.cmp(&b.due_at));
            Ok(reminders)
        })
        .await
    }

    /// Asks the AI oracle for ways to settle a dispute on an estimate.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, or a dependency error if the oracle times
    /// out, fails or offers nothing usable.
    pub async fn request_resolutions(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
    ) -> ApplicationResult<ConflictResolution> {
        self.observed(Operation::RequestResolutions, async {
            self.authorize(caller, Operation::RequestResolutions)?;
            let estimate = self.resolver.load(estimate_id).await?;
            estimate.ensure_role(&caller.id, PartyRole::Participant)?;

            let options = self
                .guard
                .call(Collaborator::Oracle, self.oracle.suggest_resolutions(&estimate))
                .await?;
            let resolution =
                ConflictResolution::open(estimate_id, caller.id.clone(), options, self.clock.now())
                    .map_err(|e| {
                        ApplicationError::dependency_failed(OracleError::invalid_response(e.to_string()))
                    })?;
            self.guard
                .call(Collaborator::Repository, self.resolutions.save(&resolution))
                .await?;
            info!(
                estimate_id = %estimate_id,
                resolution_id = %resolution.id(),
                options = resolution.options().len(),
                "resolutions requested"
            );
            Ok(resolution)
        })
        .await
    }

    /// Applies one of the options of an open resolution.
    ///
    /// # Errors
    ///
    /// `Validation` (including an option that was not offered),
    /// `Unauthorized`, `NotFound` if the resolution does not belong to the
    /// estimate, `Conflict` if it was already applied or the estimate is
    /// closed or expired, or a dependency error.
    pub async fn resolve_with_ai(
        &self,
        caller: &Caller,
        estimate_id: EstimateId,
        request: &ResolveRequest,
    ) -> ApplicationResult<Acknowledgement> {
        self.observed(Operation::ResolveWithAi, async {
            let command = request.validate(&self.limits)?;
            self.authorize(caller, Operation::ResolveWithAi)?;

            let now = self.clock.now();
            let event = self
                .resolver
                .exclusive(estimate_id, async {
                    let estimate = self.resolver.load(estimate_id).await?;
                    estimate.ensure_role(&caller.id, PartyRole::Participant)?;
                    estimate.ensure_open(now)?;

                    let mut resolution = self
                        .guard
                        .call(
                            Collaborator::Repository,
                            self.resolutions.find_by_id(&command.resolution_id),
                        )
                        .await?
                        .filter(|r| r.estimate_id() == estimate_id)
                        .ok_or_else(|| {
                            ApplicationError::not_found("ConflictResolution", command.resolution_id)
                        })?;
                    resolution.apply(&caller.id, &command.chosen_option, command.notes.clone(), now)?;
                    self.save_resolution(estimate_id, &resolution).await?;

                    Ok::<_, ApplicationError>(EstimateEvent::from(ResolutionApplied::new(
                        estimate_id,
                        estimate.counterparty_of(&caller.id).clone(),
                        resolution.id(),
                        command.chosen_option.clone(),
                        now,
                    )))
                })
                .await?;
            self.committed(Operation::ResolveWithAi, &event).await;
            Ok(acknowledge(estimate_id, Operation::ResolveWithAi, now))
        })
        .await
    }

    // ========== Internals ==========

    async fn observed<T>(
        &self,
        operation: Operation,
        work: impl Future<Output = ApplicationResult<T>>,
    ) -> ApplicationResult<T> {
        self.latency.observe(operation, work).await
    }

    fn authorize(&self, caller: &Caller, operation: Operation) -> ApplicationResult<()> {
        self.policy.authorize(caller.tier, operation)?;
        Ok(())
    }

    async fn shop_estimates(&self, caller: &Caller, shop_id: &PartyId) -> ApplicationResult<Vec<Estimate>> {
        if &caller.id != shop_id {
            return Err(ApplicationError::unauthorized(format!(
                "{} may not list estimates of shop {shop_id}",
                caller.id
            )));
        }
        self.guard
            .call(Collaborator::Repository, self.estimates.find_by_recipient(shop_id))
            .await
    }

    fn project_all(
        &self,
        caller: &Caller,
        estimates: &[Estimate],
        keep: impl Fn(&Estimate) -> bool,
    ) -> Vec<EstimateView> {
        let now = self.clock.now();
        let mut views: Vec<EstimateView> = estimates
            .iter()
            .filter(|e| keep(*e))
            .map(|e| project_estimate(caller.tier, e, now))
            .collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        views
    }

    async fn save_resolution(
        &self,
        estimate_id: EstimateId,
        resolution: &ConflictResolution,
    ) -> ApplicationResult<()> {
        match self
            .guard
            .bounded(Collaborator::Repository, self.resolutions.save(resolution))
            .await?
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_version_conflict() => {
                Err(ApplicationError::conflict(estimate_id, err.to_string()))
            }
            Err(err) => Err(ApplicationError::dependency_failed(err)),
        }
    }

    async fn committed(&self, operation: Operation, event: &EstimateEvent) {
        info!(
            estimate_id = %event.estimate_id(),
            operation = %operation,
            event = event.event_name(),
            "estimate updated"
        );
        self.emit(event).await;
    }

    async fn emit(&self, event: &EstimateEvent) {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(estimate_id = %event.estimate_id(), error = %e, "event payload not serializable");
                return;
            }
        };
        let delivery = self
            .guard
            .call(
                Collaborator::Notifier,
                self.notifier.notify(event.notify(), event.event_kind(), &payload),
            )
            .await;
        if let Err(e) = delivery {
            warn!(
                estimate_id = %event.estimate_id(),
                party_id = %event.notify(),
                kind = %event.event_kind(),
                error = %e,
                "notification failed"
            );
        }
    }
}

fn matches_query(reminder: &Reminder, query: &ReminderQuery) -> bool {
    query.owner_id.as_ref().is_none_or(|id| id == &reminder.owner_id)
        && query.shop_id.as_ref().is_none_or(|id| id == &reminder.shop_id)
        && query.status.is_none_or(|s| s == reminder.status)
        && query.reminder_type.is_none_or(|t| t == reminder.reminder_type)
}

fn acknowledge(estimate_id: EstimateId, operation: Operation, at: Timestamp) -> Acknowledgement {
    Acknowledgement {
        estimate_id,
        operation,
        acknowledged_at: at,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::dto::{EstimatePayload, VehicleInput};
    use crate::application::error::ErrorKind;
    use crate::domain::events::EventKind;
    use crate::domain::value_objects::{EstimateStatus, Tier};
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::notifications::RecordingNotifier;
    use rust_decimal::Decimal;

    struct Harness {
        workflow: EstimateWorkflow,
        notifier: RecordingNotifier,
        clock: ManualClock,
    }

    fn harness() -> Harness {
        let notifier = RecordingNotifier::new();
        let clock = ManualClock::default();
        let collaborators = Collaborators::in_memory()
            .with_notifier(Arc::new(notifier.clone()))
            .with_clock(Arc::new(clock.clone()));
        Harness {
            workflow: EstimateWorkflow::new(collaborators, WorkflowSettings::default()),
            notifier,
            clock,
        }
    }

    fn requester(tier: Tier) -> Caller {
        Caller::new("req-1", tier)
    }

    fn shop(tier: Tier) -> Caller {
        Caller::new("shop-1", tier)
    }

    fn create_request() -> CreateEstimateRequest {
        CreateEstimateRequest {
            recipient_shop_id: "shop-1".into(),
            payload: EstimatePayload {
                vehicle: VehicleInput {
                    make: "Honda".into(),
                    model: "Accord".into(),
                    year: Some(2018),
                    vin: None,
                },
                damage_description: "Front bumper cracked".into(),
                media_refs: vec!["https://cdn.example.com/a.jpg".into()],
                insurance: None,
            },
        }
    }

    fn quote(amount: i64) -> RespondRequest {
        RespondRequest {
            quoted_cost: Some(Decimal::new(amount, 0)),
            timeline_days: Some(3),
            details: None,
        }
    }

    async fn created(h: &Harness) -> EstimateId {
        h.workflow
            .create_estimate(&requester(Tier::Free), &create_request())
            .await
            .unwrap()
            .id
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn create_respond_accept() {
            let h = harness();
            let id = created(&h).await;

            let quoted = h
                .workflow
                .respond_to_estimate(&shop(Tier::Standard), id, &quote(450))
                .await
                .unwrap();
            assert_eq!(quoted.status, EstimateStatus::Quoted);
            assert_eq!(quoted.timeline_days, Some(3));

            let accepted = h.workflow.accept_estimate(&requester(Tier::Free), id).await.unwrap();
            assert_eq!(accepted.status, EstimateStatus::Accepted);
            assert_eq!(accepted.quoted_cost.unwrap().amount(), Decimal::new(450, 0));

            let kinds: Vec<EventKind> = h.notifier.delivered().iter().map(|n| n.kind).collect();
            assert_eq!(
                kinds,
                vec![EventKind::EstimateCreated, EventKind::EstimateQuoted, EventKind::EstimateAccepted]
            );
            assert_eq!(h.notifier.delivered_to(&PartyId::new("req-1")).len(), 1);
        }

        #[tokio::test]
        async fn review_then_reject() {
            let h = harness();
            let id = created(&h).await;
            let shop = shop(Tier::Standard);

            let reviewing = h.workflow.start_review(&shop, id).await.unwrap();
            assert_eq!(reviewing.status, EstimateStatus::Assessing);
            h.workflow.respond_to_estimate(&shop, id, &quote(300)).await.unwrap();

            let request = RejectRequest {
                reason: Some("Too expensive".into()),
            };
            let rejected = h
                .workflow
                .reject_estimate(&requester(Tier::Free), id, &request)
                .await
                .unwrap();
            assert_eq!(rejected.status, EstimateStatus::Rejected);
        }

        #[tokio::test]
        async fn accept_before_quote_is_conflict() {
            let h = harness();
            let id = created(&h).await;
            let err = h.workflow.accept_estimate(&requester(Tier::Free), id).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
            assert_eq!(err.estimate_id(), Some(id));
        }

        #[tokio::test]
        async fn notification_failure_does_not_fail_the_call() {
            let h = harness();
            h.notifier.set_failing(true);
            let id = created(&h).await;
            assert!(h.notifier.delivered().is_empty());
            h.workflow
                .respond_to_estimate(&shop(Tier::Standard), id, &quote(100))
                .await
                .unwrap();
        }
    }

    mod ordering {
        use super::*;

        #[tokio::test]
        async fn validation_precedes_tier_check() {
            let h = harness();
            let id = created(&h).await;
            let bad = RespondRequest {
                quoted_cost: Some(Decimal::new(-50, 0)),
                ..Default::default()
            };
            let err = h
                .workflow
                .respond_to_estimate(&shop(Tier::Free), id, &bad)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.validation_errors().unwrap().contains("quotedCost"));
        }

        #[tokio::test]
        async fn tier_check_precedes_mutation() {
            let h = harness();
            let id = created(&h).await;
            let err = h
                .workflow
                .respond_to_estimate(&shop(Tier::Free), id, &quote(100))
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());

            let views = h.workflow.list_own_estimates(&requester(Tier::Free)).await.unwrap();
            assert_eq!(views[0].status, EstimateStatus::Pending);
        }

        #[tokio::test]
        async fn wrong_shop_is_unauthorized() {
            let h = harness();
            let id = created(&h).await;
            let err = h
                .workflow
                .respond_to_estimate(&Caller::new("shop-2", Tier::Premium), id, &quote(100))
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());
        }

        #[tokio::test]
        async fn missing_estimate_is_not_found() {
            let h = harness();
            let err = h
                .workflow
                .start_review(&shop(Tier::Standard), EstimateId::new_v4())
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }
    }

    mod listings {
        use super::*;

        #[tokio::test]
        async fn shop_listing_requires_own_id() {
            let h = harness();
            created(&h).await;
            let err = h
                .workflow
                .list_shop_estimates(&shop(Tier::Standard), &PartyId::new("shop-2"))
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());

            let views = h
                .workflow
                .list_shop_estimates(&shop(Tier::Standard), &PartyId::new("shop-1"))
                .await
                .unwrap();
            assert_eq!(views.len(), 1);
            assert!(views[0].insurance.is_none());
            assert!(views[0].damage_description.is_some());
        }

        #[tokio::test]
        async fn leads_exclude_quoted() {
            let h = harness();
            let first = created(&h).await;
            created(&h).await;
            h.workflow
                .respond_to_estimate(&shop(Tier::Standard), first, &quote(100))
                .await
                .unwrap();

            let leads = h
                .workflow
                .list_leads(&shop(Tier::Premium), &PartyId::new("shop-1"))
                .await
                .unwrap();
            assert_eq!(leads.len(), 1);
            assert_ne!(leads[0].id, first);
        }

        #[tokio::test]
        async fn free_projection_hides_description() {
            let h = harness();
            created(&h).await;
            let views = h.workflow.list_own_estimates(&requester(Tier::Free)).await.unwrap();
            assert!(views[0].damage_description.is_none());
            assert!(views[0].media_refs.is_none());
        }
    }

    mod expiry {
        use super::*;

        #[tokio::test]
        async fn expired_estimate_rejects_writes() {
            let h = harness();
            let id = created(&h).await;
            let expires_at = h.clock.now().add_secs(60);
            let ack = h
                .workflow
                .set_expiry(
                    &requester(Tier::WowPlus),
                    id,
                    &SetExpiryRequest {
                        expires_at: expires_at.to_rfc3339(),
                    },
                )
                .await
                .unwrap();
            assert_eq!(ack.operation, Operation::SetExpiry);

            h.clock.advance_secs(61);
            let err = h
                .workflow
                .respond_to_estimate(&shop(Tier::Standard), id, &quote(100))
                .await
                .unwrap_err();
            assert!(err.is_conflict());

            let views = h.workflow.list_own_estimates(&requester(Tier::Free)).await.unwrap();
            assert_eq!(views[0].status, EstimateStatus::Expired);
        }

        #[tokio::test]
        async fn past_expiry_is_validation_error() {
            let h = harness();
            let id = created(&h).await;
            let err = h
                .workflow
                .set_expiry(
                    &requester(Tier::WowPlus),
                    id,
                    &SetExpiryRequest {
                        expires_at: h.clock.now().sub_secs(1).to_rfc3339(),
                    },
                )
                .await
                .unwrap_err();
            assert!(err.validation_errors().unwrap().contains("expiresAt"));
        }
    }

    mod reminders {
        use super::*;

        #[tokio::test]
        async fn awaiting_response_after_threshold() {
            let h = harness();
            let id = created(&h).await;
            let caller = requester(Tier::WowPlus);

            let none = h
                .workflow
                .list_pending_reminders(&caller, &ReminderFilter::default())
                .await
                .unwrap();
            assert!(none.is_empty());

            h.clock.advance_secs(25 * 3600);
            let due = h
                .workflow
                .list_pending_reminders(&caller, &ReminderFilter::default())
                .await
                .unwrap();
            assert_eq!(due.len(), 1);
            assert_eq!(due[0].estimate_id, id);

            let filtered = h
                .workflow
                .list_pending_reminders(
                    &caller,
                    &ReminderFilter {
                        reminder_type: Some("AWAITING_DECISION".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            assert!(filtered.is_empty());
        }

        #[tokio::test]
        async fn requires_wow_plus() {
            let h = harness();
            let err = h
                .workflow
                .list_pending_reminders(&requester(Tier::Premium), &ReminderFilter::default())
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());
        }
    }

    mod ai {
        use super::*;

        #[tokio::test]
        async fn assessment_is_attached() {
            let h = harness();
            let id = created(&h).await;
            let request = AssessDamageRequest {
                media_refs: vec!["https://cdn.example.com/a.jpg".into()],
            };
            let assessment = h
                .workflow
                .assess_damage(&requester(Tier::WowPlus), id, &request)
                .await
                .unwrap();
            assert!(assessment.confidence() <= Decimal::ONE);

            let views = h.workflow.list_own_estimates(&requester(Tier::WowPlus)).await.unwrap();
            assert_eq!(views[0].ai_assessment.as_ref(), Some(&assessment));
        }

        #[tokio::test]
        async fn resolution_round_trip() {
            let h = harness();
            let id = created(&h).await;
            let caller = requester(Tier::WowPlus);

            let resolution = h.workflow.request_resolutions(&caller, id).await.unwrap();
            let option = resolution.options()[0].key.clone();
            let request = ResolveRequest {
                resolution_id: resolution.id().to_string(),
                chosen_option: option,
                notes: None,
            };
            let ack = h.workflow.resolve_with_ai(&caller, id, &request).await.unwrap();
            assert_eq!(ack.operation, Operation::ResolveWithAi);

            let again = h.workflow.resolve_with_ai(&caller, id, &request).await.unwrap_err();
            assert!(again.is_conflict());
        }

        async fn resolve_first_option(
            h: &Harness,
            id: EstimateId,
        ) -> ApplicationResult<Acknowledgement> {
            let caller = requester(Tier::WowPlus);
            let resolution = h.workflow.request_resolutions(&caller, id).await.unwrap();
            let request = ResolveRequest {
                resolution_id: resolution.id().to_string(),
                chosen_option: resolution.options()[0].key.clone(),
                notes: None,
            };
            h.workflow.resolve_with_ai(&caller, id, &request).await
        }

        #[tokio::test]
        async fn accepted_estimate_refuses_resolution() {
            let h = harness();
            let id = created(&h).await;
            h.workflow
                .respond_to_estimate(&shop(Tier::Standard), id, &quote(900))
                .await
                .unwrap();
            h.workflow
                .accept_estimate(&requester(Tier::WowPlus), id)
                .await
                .unwrap();

            let err = resolve_first_option(&h, id).await.unwrap_err();
            assert!(err.is_conflict());
            assert_eq!(err.estimate_id(), Some(id));
        }

        #[tokio::test]
        async fn expired_estimate_refuses_resolution() {
            let h = harness();
            let id = created(&h).await;
            let expiry = SetExpiryRequest {
                expires_at: h.clock.now().add_secs(60).to_rfc3339(),
            };
            h.workflow
                .set_expiry(&requester(Tier::WowPlus), id, &expiry)
                .await
                .unwrap();
            h.clock.advance_secs(120);

            let err = resolve_first_option(&h, id).await.unwrap_err();
            assert!(err.is_conflict());
        }

        #[tokio::test]
        async fn unknown_option_is_validation_error() {
            let h = harness();
            let id = created(&h).await;
            let caller = requester(Tier::WowPlus);
            let resolution = h.workflow.request_resolutions(&caller, id).await.unwrap();

            let err = h
                .workflow
                .resolve_with_ai(
                    &caller,
                    id,
                    &ResolveRequest {
                        resolution_id: resolution.id().to_string(),
                        chosen_option: "teleport".into(),
                        notes: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(err.validation_errors().unwrap().contains("chosenOption"));
        }

        #[tokio::test]
        async fn resolution_of_other_estimate_is_not_found() {
            let h = harness();
            let first = created(&h).await;
            let second = created(&h).await;
            let caller = requester(Tier::WowPlus);
            let resolution = h.workflow.request_resolutions(&caller, first).await.unwrap();

            let err = h
                .workflow
                .resolve_with_ai(
                    &caller,
                    second,
                    &ResolveRequest {
                        resolution_id: resolution.id().to_string(),
                        chosen_option: resolution.options()[0].key.clone(),
                        notes: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }
    }
}
