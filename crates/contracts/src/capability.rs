//! Backend capability contract
//!
//! A backend implements any subset of [`Recordable`], [`UserTrackable`] and
//! [`ActionTrackable`], and advertises which ones through the `as_*` hooks of
//! [`AnalyticsBackend`]. The dispatcher turns those hooks into an explicit
//! [`Capabilities`] table once, at registration.

use serde::Serialize;
use std::any::Any;
use std::fmt;

use crate::{ContractError, HandlesSensitive, TrackDataPoint, TrackableEvent};

/// Recording control.
pub trait Recordable: Send + Sync {
    /// Start or resume recording. `resuming = true` hints the caller wants to
    /// continue the current session rather than start a new one.
    fn start_recording(&self, resuming: bool) -> Result<(), ContractError>;

    fn pause_recording(&self) -> Result<(), ContractError>;

    /// Mark a UI element as sensitive (or clear the mark). `view` is opaque to
    /// the dispatcher; backends downcast it to their toolkit's view type.
    fn mark_view(&self, as_sensitive: bool, view: &dyn Any) -> Result<(), ContractError>;

    /// Set the currently viewed screen.
    fn set_current_screen(&self, screen: &TrackDataPoint) -> Result<(), ContractError>;
}

/// User identification.
pub trait UserTrackable: Send + Sync {
    fn set_user(&self, user: &TrackDataPoint) -> Result<(), ContractError>;
}

/// Action tracking.
pub trait ActionTrackable: Send + Sync {
    /// Track a single named point
    fn track_point(&self, point: &TrackDataPoint) -> Result<(), ContractError>;

    /// Track an event with its filtered payload
    fn track_event(&self, event: &TrackableEvent) -> Result<(), ContractError>;

    /// Specialty state tracking. Most vendors have no such concept, so the
    /// default does nothing.
    fn track_state(&self, _state: &TrackableEvent) -> Result<(), ContractError> {
        Ok(())
    }
}

/// An analytics backend adapter.
///
/// Backends must apply their own [`HandlesSensitive`] filter before emitting
/// anything to a vendor; the dispatcher only fans calls out.
pub trait AnalyticsBackend: HandlesSensitive + Send + Sync {
    /// Backend name (used for logging/metrics)
    fn name(&self) -> &str;

    fn as_recordable(&self) -> Option<&dyn Recordable> {
        None
    }

    fn as_user_trackable(&self) -> Option<&dyn UserTrackable> {
        None
    }

    fn as_action_trackable(&self) -> Option<&dyn ActionTrackable> {
        None
    }

    /// Capability table derived from the `as_*` hooks.
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            recording: self.as_recordable().is_some(),
            user_identification: self.as_user_trackable().is_some(),
            action_tracking: self.as_action_trackable().is_some(),
        }
    }
}

/// One of the optional backend capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Recording,
    UserIdentification,
    ActionTracking,
}

impl Capability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::Recording => "recording",
            Capability::UserIdentification => "user_identification",
            Capability::ActionTracking => "action_tracking",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit table of what a registered backend supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub recording: bool,
    pub user_identification: bool,
    pub action_tracking: bool,
}

impl Capabilities {
    pub const fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Recording => self.recording,
            Capability::UserIdentification => self.user_identification,
            Capability::ActionTracking => self.action_tracking,
        }
    }

    /// Supported capabilities, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        [
            Capability::Recording,
            Capability::UserIdentification,
            Capability::ActionTracking,
        ]
        .into_iter()
        .filter(move |c| self.supports(*c))
    }
}

/// Broadcast operations exposed by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    TrackPoint,
    TrackEvent,
    TrackState,
    SetUser,
    SetCurrentScreen,
    StartRecording,
    PauseRecording,
    MarkView,
}

impl Operation {
    /// Capability a backend needs to receive this operation.
    pub const fn capability(self) -> Capability {
        match self {
            Operation::TrackPoint | Operation::TrackEvent | Operation::TrackState => {
                Capability::ActionTracking
            }
            Operation::SetUser => Capability::UserIdentification,
            Operation::SetCurrentScreen
            | Operation::StartRecording
            | Operation::PauseRecording
            | Operation::MarkView => Capability::Recording,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::TrackPoint => "track_point",
            Operation::TrackEvent => "track_event",
            Operation::TrackState => "track_state",
            Operation::SetUser => "set_user",
            Operation::SetCurrentScreen => "set_current_screen",
            Operation::StartRecording => "start_recording",
            Operation::PauseRecording => "pause_recording",
            Operation::MarkView => "mark_view",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LevelPolicy, PiiLevel};

    struct UserOnly {
        policy: LevelPolicy,
    }

    impl HandlesSensitive for UserOnly {
        fn policy(&self) -> &LevelPolicy {
            &self.policy
        }
    }

    impl UserTrackable for UserOnly {
        fn set_user(&self, _user: &TrackDataPoint) -> Result<(), ContractError> {
            Ok(())
        }
    }

    impl AnalyticsBackend for UserOnly {
        fn name(&self) -> &str {
            "user_only"
        }

        fn as_user_trackable(&self) -> Option<&dyn UserTrackable> {
            Some(self)
        }
    }

    #[test]
    fn test_capabilities_from_hooks() {
        let backend = UserOnly {
            policy: LevelPolicy::handling([PiiLevel::None]),
        };
        let caps = backend.capabilities();
        assert!(caps.user_identification);
        assert!(!caps.recording);
        assert!(!caps.action_tracking);
        assert_eq!(caps.iter().collect::<Vec<_>>(), vec![Capability::UserIdentification]);
    }

    #[test]
    fn test_operation_capability_mapping() {
        assert_eq!(Operation::TrackState.capability(), Capability::ActionTracking);
        assert_eq!(Operation::SetUser.capability(), Capability::UserIdentification);
        assert_eq!(Operation::SetCurrentScreen.capability(), Capability::Recording);
        assert_eq!(Operation::MarkView.capability(), Capability::Recording);
    }
}
