//! Recording session state machine
//!
//! ```text
//! Stopped --start(false)--> Recording   (fresh)
//! Stopped --start(true)---> Recording   (fresh, no session to resume)
//! Recording --pause()-----> Paused
//! Paused --start(true)----> Recording   (resumed)
//! Paused --start(false)---> Recording   (restarted, new session)
//! ```

use serde::Serialize;

/// Recording state of a single backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    #[default]
    Stopped,
    Recording,
    Paused,
}

/// What a `start` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// New session started from `Stopped`
    Fresh,
    /// Paused session continued
    Resumed,
    /// Existing session discarded and a new one started
    Restarted,
    /// `start(true)` while already recording; nothing changed
    AlreadyRecording,
}

impl StartOutcome {
    /// Whether session-scoped state must be reset.
    pub const fn is_new_session(self) -> bool {
        matches!(self, StartOutcome::Fresh | StartOutcome::Restarted)
    }
}

/// Tracks recording state and the current session number.
///
/// Session ids start at 1 with the first started session; 0 means no session
/// has ever started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordingSession {
    state: RecordingState,
    session_id: u64,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Apply `start_recording(resuming)`.
    ///
    /// Resuming while `Stopped` has no session to resume and starts a fresh
    /// one.
    pub fn start(&mut self, resuming: bool) -> StartOutcome {
        let outcome = match (self.state, resuming) {
            (RecordingState::Stopped, _) => StartOutcome::Fresh,
            (RecordingState::Paused, true) => StartOutcome::Resumed,
            (RecordingState::Paused, false) => StartOutcome::Restarted,
            (RecordingState::Recording, true) => StartOutcome::AlreadyRecording,
            (RecordingState::Recording, false) => StartOutcome::Restarted,
        };
        if outcome.is_new_session() {
            self.session_id += 1;
        }
        self.state = RecordingState::Recording;
        outcome
    }

    /// Apply `pause_recording()`. Returns `false` when not recording.
    pub fn pause(&mut self) -> bool {
        if self.state == RecordingState::Recording {
            self.state = RecordingState::Paused;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_pause_resume() {
        let mut session = RecordingSession::new();
        assert_eq!(session.start(false), StartOutcome::Fresh);
        assert_eq!(session.session_id(), 1);
        assert!(session.pause());
        assert_eq!(session.state(), RecordingState::Paused);
        assert_eq!(session.start(true), StartOutcome::Resumed);
        assert_eq!(session.session_id(), 1);
        assert!(session.is_recording());
    }

    #[test]
    fn test_restart_from_paused() {
        let mut session = RecordingSession::new();
        session.start(false);
        session.pause();
        assert_eq!(session.start(false), StartOutcome::Restarted);
        assert_eq!(session.session_id(), 2);
    }

    #[test]
    fn test_restart_while_recording() {
        let mut session = RecordingSession::new();
        assert_eq!(session.start(false), StartOutcome::Fresh);
        assert_eq!(session.session_id(), 1);
        assert_eq!(session.start(false), StartOutcome::Restarted);
        assert_eq!(session.session_id(), 2);
        assert!(session.is_recording());
    }

    #[test]
    fn test_resume_from_stopped_starts_fresh() {
        let mut session = RecordingSession::new();
        assert_eq!(session.start(true), StartOutcome::Fresh);
        assert_eq!(session.session_id(), 1);
        assert!(session.is_recording());
    }

    #[test]
    fn test_resume_while_recording_is_noop() {
        let mut session = RecordingSession::new();
        session.start(false);
        assert_eq!(session.start(true), StartOutcome::AlreadyRecording);
        assert_eq!(session.session_id(), 1);
    }

    #[test]
    fn test_pause_when_not_recording() {
        let mut session = RecordingSession::new();
        assert!(!session.pause());
        assert_eq!(session.state(), RecordingState::Stopped);
    }
}
