//! # Notifications
//!
//! Notifier port and adapters.
//!
//! - [`Notifier`]: Delivery port
//! - [`RecordingNotifier`]: In-memory recorder for tests
//! - [`TracingNotifier`]: Log-only notifier for the demo server

pub mod error;
pub mod recording;
pub mod tracing_notifier;
pub mod traits;

pub use error::{NotifierError, NotifierResult};
pub use recording::{RecordedNotification, RecordingNotifier};
pub use tracing_notifier::TracingNotifier;
pub use traits::Notifier;
