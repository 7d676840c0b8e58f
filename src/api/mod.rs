//! # API Layer
//!
//! External interfaces of the engine.
//!
//! - [`rest`]: HTTP/JSON endpoints using axum

pub mod rest;
