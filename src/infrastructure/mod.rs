//! # Infrastructure Layer
//!
//! Ports for the collaborators the engine consumes, plus in-process
//! adapters.
//!
//! - `persistence`: estimate and resolution repositories
//! - `notifications`: notifier port
//! - `oracle`: AI assessment port
//! - `clock`: time source

pub mod clock;
pub mod notifications;
pub mod oracle;
pub mod persistence;
