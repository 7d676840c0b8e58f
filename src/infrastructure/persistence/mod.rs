//! # Persistence Layer
//!
//! Repository ports and in-memory adapters.
//!
//! ## Repository Traits (Ports)
//!
//! - [`EstimateRepository`]: Persistence for estimates
//! - [`ResolutionRepository`]: Persistence for conflict resolutions
//!
//! ## Implementations
//!
//! - `in_memory`: In-memory implementations

pub mod in_memory;
pub mod traits;

pub use traits::{
    EstimateRepository, RepositoryError, RepositoryResult, ResolutionRepository, check_version,
};
