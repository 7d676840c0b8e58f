//! # Domain Layer
//!
//! Value objects, the estimate aggregate, domain events and the pure tier
//! policy. Nothing in this layer performs I/O; the current time is always
//! passed in.

pub mod entities;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;
