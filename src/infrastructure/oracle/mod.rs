//! # AI Oracle
//!
//! Port and adapters for the AI damage-assessment service.
//!
//! - [`AiOracle`]: Oracle port
//! - [`OfflineOracle`]: Deterministic implementation

pub mod error;
pub mod offline;
pub mod traits;

pub use error::{OracleError, OracleResult};
pub use offline::OfflineOracle;
pub use traits::{AiOracle, AssessmentReport};
