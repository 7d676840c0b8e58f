//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`BroadcastCoordinator`]: Concurrent multi-shop estimate creation
//! - [`ConflictResolver`]: Per-estimate mutation serialization
//! - [`DependencyGuard`]: Timeout budget for collaborator calls
//! - [`LatencyObserver`]: Per-operation latency budget

pub mod broadcast;
pub mod conflict_resolver;
pub mod dependency;
pub mod latency;

pub use broadcast::{
    BroadcastConfig, BroadcastCoordinator, BroadcastReport, BroadcastResult, DispatchStatus,
};
pub use conflict_resolver::ConflictResolver;
pub use dependency::DependencyGuard;
pub use latency::{LatencyObserver, SlowOperation};
