//! LogBackend - logs emitted calls via tracing
//!
//! Only keys, names and levels are logged. Values never reach the log.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use contracts::{
    ActionTrackable, AnalyticsBackend, Capabilities, ContractError, HandlesSensitive, LevelPolicy,
    Recordable, RecordingSession, RecordingState, TrackDataPoint, TrackableEvent, UserTrackable,
};
use tracing::{info, instrument};

use super::{capabilities_from_params, gate_event, gate_point};

/// Backend that logs call summaries for debugging
pub struct LogBackend {
    name: String,
    policy: LevelPolicy,
    capabilities: Capabilities,
    session: Mutex<RecordingSession>,
}

impl LogBackend {
    /// Create a new LogBackend with every capability
    pub fn new(name: impl Into<String>, policy: LevelPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            capabilities: Capabilities {
                recording: true,
                user_identification: true,
                action_tracking: true,
            },
            session: Mutex::new(RecordingSession::new()),
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        policy: LevelPolicy,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        Ok(Self::new(name, policy).with_capabilities(capabilities_from_params(params)?))
    }

    /// Restrict the capabilities this backend advertises
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn recording_state(&self) -> RecordingState {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }
}

impl HandlesSensitive for LogBackend {
    fn policy(&self) -> &LevelPolicy {
        &self.policy
    }
}

impl Recordable for LogBackend {
    #[instrument(name = "log_backend_start_recording", skip(self), fields(backend = %self.name))]
    fn start_recording(&self, resuming: bool) -> Result<(), ContractError> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = session.start(resuming);
        info!(
            backend = %self.name,
            ?outcome,
            session_id = session.session_id(),
            "Recording started"
        );
        Ok(())
    }

    fn pause_recording(&self) -> Result<(), ContractError> {
        let paused = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pause();
        info!(backend = %self.name, paused, "Recording paused");
        Ok(())
    }

    fn mark_view(&self, as_sensitive: bool, view: &dyn Any) -> Result<(), ContractError> {
        let view_id = view
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| view.downcast_ref::<&str>().copied());
        info!(backend = %self.name, as_sensitive, view = ?view_id, "View marked");
        Ok(())
    }

    fn set_current_screen(&self, screen: &TrackDataPoint) -> Result<(), ContractError> {
        if gate_point(&self.name, &self.policy, screen) {
            info!(backend = %self.name, screen = screen.key(), "Current screen set");
        }
        Ok(())
    }
}

impl UserTrackable for LogBackend {
    fn set_user(&self, user: &TrackDataPoint) -> Result<(), ContractError> {
        if gate_point(&self.name, &self.policy, user) {
            info!(backend = %self.name, key = user.key(), level = %user.level(), "User set");
        }
        Ok(())
    }
}

impl ActionTrackable for LogBackend {
    fn track_point(&self, point: &TrackDataPoint) -> Result<(), ContractError> {
        if gate_point(&self.name, &self.policy, point) {
            info!(
                backend = %self.name,
                key = point.key(),
                level = %point.level(),
                has_value = point.value().is_some(),
                "Point tracked"
            );
        }
        Ok(())
    }

    #[instrument(
        name = "log_backend_track_event",
        skip(self, event),
        fields(backend = %self.name, event = event.event_name())
    )]
    fn track_event(&self, event: &TrackableEvent) -> Result<(), ContractError> {
        if let Some(payload) = gate_event(&self.name, &self.policy, event) {
            let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
            info!(
                backend = %self.name,
                event = event.event_name(),
                level = %event.level(),
                keys = ?keys,
                "Event tracked"
            );
        }
        Ok(())
    }

    // track_state: not supported, default no-op
}

impl AnalyticsBackend for LogBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_recordable(&self) -> Option<&dyn Recordable> {
        self.capabilities.recording.then_some(self as &dyn Recordable)
    }

    fn as_user_trackable(&self) -> Option<&dyn UserTrackable> {
        self.capabilities
            .user_identification
            .then_some(self as &dyn UserTrackable)
    }

    fn as_action_trackable(&self) -> Option<&dyn ActionTrackable> {
        self.capabilities
            .action_tracking
            .then_some(self as &dyn ActionTrackable)
    }
}
