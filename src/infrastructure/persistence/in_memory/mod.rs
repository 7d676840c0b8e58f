//! # In-Memory Repositories
//!
//! In-memory implementations for tests and the demo server.
//!
//! ## Available Repositories
//!
//! - [`InMemoryEstimateRepository`]: Estimate persistence
//! - [`InMemoryResolutionRepository`]: Conflict resolution persistence
//!
//! ## Thread Safety
//!
//! All implementations use `Arc<RwLock<HashMap>>` for thread-safe access.

pub mod estimate_repository;
pub mod resolution_repository;

pub use estimate_repository::InMemoryEstimateRepository;
pub use resolution_repository::InMemoryResolutionRepository;
