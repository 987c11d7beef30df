//! AnalyticsManager - registry and capability broadcast

use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

use contracts::{
    AnalyticsBackend, BackendConfig, BackendType, ContractError, DispatchBlueprint,
    DispatchSettings, Operation, TrackDataPoint, TrackableEvent,
};

use crate::backends::{LogBackend, MemoryBackend};
use crate::error::DispatcherError;
use crate::metrics::MetricsSnapshot;
use crate::registration::{BackendRegistration, DispatchOutcome};

type Registry = Arc<[Arc<BackendRegistration>]>;

/// Fans every call out to the registered backends that support it
///
/// Construct one at startup and share it by reference (or `Arc`). Backends
/// receive calls in registration order, each at most once per broadcast.
pub struct AnalyticsManager {
    registry: RwLock<Registry>,
    settings: DispatchSettings,
}

impl AnalyticsManager {
    /// Create an empty manager with default settings
    pub fn new() -> Self {
        Self::with_settings(DispatchSettings::default())
    }

    pub fn with_settings(settings: DispatchSettings) -> Self {
        Self {
            registry: RwLock::new(Arc::from(Vec::new())),
            settings,
        }
    }

    pub fn settings(&self) -> DispatchSettings {
        self.settings
    }

    /// Append a backend to the registry
    ///
    /// No duplicate detection: registering the same backend twice delivers
    /// every call to it twice.
    #[instrument(name = "manager_register", skip(self, backend), fields(backend = backend.name()))]
    pub fn register(&self, backend: Arc<dyn AnalyticsBackend>) {
        let registration = Arc::new(BackendRegistration::new(backend));
        let policy = registration.policy();
        let bypassing = policy.bypass_levels_in_use();

        info!(
            backend = registration.name(),
            handles = %policy.handles,
            bypasses = %policy.bypasses,
            capabilities = ?registration.capabilities(),
            "Backend registered"
        );
        if !bypassing.is_empty() {
            warn!(
                backend = registration.name(),
                levels = %bypassing,
                "Backend bypasses the PII level check for these levels"
            );
        }
        observability::record_backend_registered(registration.name(), bypassing.len());

        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<Arc<BackendRegistration>> = registry.iter().cloned().collect();
        entries.push(registration);
        *registry = Arc::from(entries);
    }

    /// Current registry contents, in registration order
    pub fn registrations(&self) -> Vec<Arc<BackendRegistration>> {
        self.snapshot().iter().cloned().collect()
    }

    pub fn backend_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Get metrics for all backends
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.snapshot()
            .iter()
            .map(|r| (r.name().to_string(), r.metrics().snapshot()))
            .collect()
    }

    pub fn track_point(&self, point: &TrackDataPoint) {
        self.broadcast(Operation::TrackPoint, |b| {
            b.as_action_trackable().map(|t| t.track_point(point))
        });
    }

    pub fn track_event(&self, event: &TrackableEvent) {
        self.broadcast(Operation::TrackEvent, |b| {
            b.as_action_trackable().map(|t| t.track_event(event))
        });
    }

    pub fn track_state(&self, state: &TrackableEvent) {
        self.broadcast(Operation::TrackState, |b| {
            b.as_action_trackable().map(|t| t.track_state(state))
        });
    }

    pub fn set_user(&self, user: &TrackDataPoint) {
        self.broadcast(Operation::SetUser, |b| {
            b.as_user_trackable().map(|u| u.set_user(user))
        });
    }

    pub fn set_current_screen(&self, screen: &TrackDataPoint) {
        self.broadcast(Operation::SetCurrentScreen, |b| {
            b.as_recordable().map(|r| r.set_current_screen(screen))
        });
    }

    pub fn start_recording(&self, resuming: bool) {
        self.broadcast(Operation::StartRecording, |b| {
            b.as_recordable().map(|r| r.start_recording(resuming))
        });
    }

    pub fn pause_recording(&self) {
        self.broadcast(Operation::PauseRecording, |b| {
            b.as_recordable().map(|r| r.pause_recording())
        });
    }

    pub fn mark_view(&self, as_sensitive: bool, view: &dyn Any) {
        self.broadcast(Operation::MarkView, |b| {
            b.as_recordable().map(|r| r.mark_view(as_sensitive, view))
        });
    }

    fn snapshot(&self) -> Registry {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invoke `call` on every capable backend, in registration order.
    ///
    /// Iterates a snapshot so registration from another thread never
    /// interleaves with a running broadcast.
    fn broadcast<F>(&self, operation: Operation, call: F)
    where
        F: Fn(&dyn AnalyticsBackend) -> Option<Result<(), ContractError>>,
    {
        let registry = self.snapshot();
        let mut delivered = 0usize;

        for registration in registry.iter() {
            let outcome = registration.invoke(operation, self.settings.isolate_faults, &call);
            if outcome == DispatchOutcome::Delivered {
                delivered += 1;
            }
        }

        debug!(
            operation = %operation,
            backends = registry.len(),
            delivered,
            "Broadcast complete"
        );
    }
}

impl Default for AnalyticsManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a backend from configuration
#[instrument(
    name = "manager_create_backend",
    skip(config),
    fields(backend = %config.name, backend_type = ?config.backend_type)
)]
pub fn create_backend(
    config: &BackendConfig,
) -> Result<Arc<dyn AnalyticsBackend>, DispatcherError> {
    let policy = config.policy();
    match config.backend_type {
        BackendType::Log => {
            let backend = LogBackend::from_params(&config.name, policy, &config.params)
                .map_err(|e| DispatcherError::backend_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(backend))
        }
        BackendType::Memory => {
            let backend = MemoryBackend::from_params(&config.name, policy, &config.params)
                .map_err(|e| DispatcherError::backend_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(backend))
        }
    }
}

/// Convenience function to create a manager from a blueprint
///
/// Backends are registered in blueprint order.
#[instrument(
    name = "manager_create",
    skip(blueprint),
    fields(backend_count = blueprint.backends.len())
)]
pub fn create_manager(blueprint: &DispatchBlueprint) -> Result<AnalyticsManager, DispatcherError> {
    let manager = AnalyticsManager::with_settings(blueprint.dispatch);
    for config in &blueprint.backends {
        manager.register(create_backend(config)?);
    }
    Ok(manager)
}
