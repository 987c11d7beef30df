//! MemoryBackend - keeps emitted calls in memory
//!
//! Stands in for a vendor SDK: every call that survives filtering is stored
//! as an [`EmittedCall`] and can be inspected afterwards.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{
    ActionTrackable, AnalyticsBackend, Capabilities, ContractError, HandlesSensitive, LevelPolicy,
    Payload, Recordable, RecordingSession, RecordingState, StartOutcome, TrackDataPoint,
    TrackableEvent, UserTrackable,
};
use tracing::debug;

use super::{capabilities_from_params, gate_event, gate_point};

/// A call the backend forwarded to its (in-memory) vendor
#[derive(Debug, Clone, PartialEq)]
pub enum EmittedCall {
    Point(TrackDataPoint),
    Event { name: String, payload: Payload },
    State { name: String, payload: Payload },
    User(TrackDataPoint),
    Screen(TrackDataPoint),
    ViewMarked { as_sensitive: bool, view: Option<String> },
    RecordingStarted { outcome: StartOutcome, session_id: u64 },
    RecordingPaused,
}

impl EmittedCall {
    /// Call kind, e.g. `"event"`
    pub fn kind(&self) -> &'static str {
        match self {
            EmittedCall::Point(_) => "point",
            EmittedCall::Event { .. } => "event",
            EmittedCall::State { .. } => "state",
            EmittedCall::User(_) => "user",
            EmittedCall::Screen(_) => "screen",
            EmittedCall::ViewMarked { .. } => "view_marked",
            EmittedCall::RecordingStarted { .. } => "recording_started",
            EmittedCall::RecordingPaused => "recording_paused",
        }
    }

    /// Keys carried by the call. Values are left out so the result is safe
    /// to log.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            EmittedCall::Point(p) | EmittedCall::User(p) | EmittedCall::Screen(p) => {
                vec![p.key()]
            }
            EmittedCall::Event { payload, .. } | EmittedCall::State { payload, .. } => {
                payload.keys().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Configuration for MemoryBackend
#[derive(Debug, Clone, Default)]
pub struct MemoryBackendConfig {
    /// Maximum retained calls; oldest are evicted first. `None` = unbounded
    pub capacity: Option<usize>,
    pub capabilities: Option<Capabilities>,
}

impl MemoryBackendConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let capacity = params
            .get("capacity")
            .map(|raw| {
                raw.parse::<usize>().map_err(|e| {
                    ContractError::invalid_argument("capacity", format!("'{raw}': {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            capacity,
            capabilities: Some(capabilities_from_params(params)?),
        })
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    calls: VecDeque<EmittedCall>,
    session: RecordingSession,
    evicted: u64,
}

/// Backend that stores emitted calls
pub struct MemoryBackend {
    name: String,
    policy: LevelPolicy,
    capabilities: Capabilities,
    capacity: Option<usize>,
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    /// Create an unbounded MemoryBackend with every capability
    pub fn new(name: impl Into<String>, policy: LevelPolicy) -> Self {
        Self::with_config(name, policy, MemoryBackendConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        policy: LevelPolicy,
        config: MemoryBackendConfig,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            capabilities: config.capabilities.unwrap_or(Capabilities {
                recording: true,
                user_identification: true,
                action_tracking: true,
            }),
            capacity: config.capacity,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        policy: LevelPolicy,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        Ok(Self::with_config(
            name,
            policy,
            MemoryBackendConfig::from_params(params)?,
        ))
    }

    /// Restrict the capabilities this backend advertises
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Calls emitted so far, oldest first
    pub fn calls(&self) -> Vec<EmittedCall> {
        self.lock().calls.iter().cloned().collect()
    }

    /// Payloads of tracked events, oldest first
    pub fn event_payloads(&self) -> Vec<(String, Payload)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                EmittedCall::Event { name, payload } => Some((name.clone(), payload.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of calls dropped because of the capacity limit
    pub fn evicted_count(&self) -> u64 {
        self.lock().evicted
    }

    pub fn recording_state(&self) -> RecordingState {
        self.lock().session.state()
    }

    pub fn clear(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, call: EmittedCall) {
        let mut state = self.lock();
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                state.evicted += 1;
                return;
            }
            while state.calls.len() >= capacity {
                state.calls.pop_front();
                state.evicted += 1;
            }
        }
        debug!(
            backend = %self.name,
            kind = call.kind(),
            keys = ?call.keys(),
            "Call emitted"
        );
        state.calls.push_back(call);
    }
}

impl HandlesSensitive for MemoryBackend {
    fn policy(&self) -> &LevelPolicy {
        &self.policy
    }
}

impl Recordable for MemoryBackend {
    fn start_recording(&self, resuming: bool) -> Result<(), ContractError> {
        let (outcome, session_id) = {
            let mut state = self.lock();
            let outcome = state.session.start(resuming);
            (outcome, state.session.session_id())
        };
        self.emit(EmittedCall::RecordingStarted {
            outcome,
            session_id,
        });
        Ok(())
    }

    fn pause_recording(&self) -> Result<(), ContractError> {
        let paused = self.lock().session.pause();
        if paused {
            self.emit(EmittedCall::RecordingPaused);
        }
        Ok(())
    }

    fn mark_view(&self, as_sensitive: bool, view: &dyn Any) -> Result<(), ContractError> {
        let view = view
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| view.downcast_ref::<&str>().map(|s| (*s).to_string()));
        self.emit(EmittedCall::ViewMarked { as_sensitive, view });
        Ok(())
    }

    fn set_current_screen(&self, screen: &TrackDataPoint) -> Result<(), ContractError> {
        if gate_point(&self.name, &self.policy, screen) {
            self.emit(EmittedCall::Screen(screen.clone()));
        }
        Ok(())
    }
}

impl UserTrackable for MemoryBackend {
    fn set_user(&self, user: &TrackDataPoint) -> Result<(), ContractError> {
        if gate_point(&self.name, &self.policy, user) {
            self.emit(EmittedCall::User(user.clone()));
        }
        Ok(())
    }
}

impl ActionTrackable for MemoryBackend {
    fn track_point(&self, point: &TrackDataPoint) -> Result<(), ContractError> {
        if gate_point(&self.name, &self.policy, point) {
            self.emit(EmittedCall::Point(point.clone()));
        }
        Ok(())
    }

    fn track_event(&self, event: &TrackableEvent) -> Result<(), ContractError> {
        if let Some(payload) = gate_event(&self.name, &self.policy, event) {
            self.emit(EmittedCall::Event {
                name: event.event_name().to_string(),
                payload,
            });
        }
        Ok(())
    }

    fn track_state(&self, state: &TrackableEvent) -> Result<(), ContractError> {
        if let Some(payload) = gate_event(&self.name, &self.policy, state) {
            self.emit(EmittedCall::State {
                name: state.event_name().to_string(),
                payload,
            });
        }
        Ok(())
    }
}

impl AnalyticsBackend for MemoryBackend {
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
