//! # Dispatcher
//!
//! Analytics dispatch module.
//!
//! Responsibilities:
//! - Hold the registered backends in registration order
//! - Fan each call out to every backend supporting the needed capability
//! - Isolate a faulting backend so it never blocks delivery to the rest

pub mod backends;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod registration;

pub use backends::{EmittedCall, LogBackend, MemoryBackend, MemoryBackendConfig};
pub use contracts::{AnalyticsBackend, TrackDataPoint, TrackableEvent};
pub use error::DispatcherError;
pub use manager::{create_backend, create_manager, AnalyticsManager};
pub use metrics::{BackendMetrics, MetricsSnapshot};
pub use registration::{BackendRegistration, DispatchOutcome};
