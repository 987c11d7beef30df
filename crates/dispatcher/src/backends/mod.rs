//! Built-in backend implementations
//!
//! Contains LogBackend and MemoryBackend, plus the filtering gates both
//! apply before emitting anything.

mod log;
mod memory;

pub use self::log::LogBackend;
pub use self::memory::{EmittedCall, MemoryBackend, MemoryBackendConfig};

use std::collections::HashMap;
use tracing::debug;

use contracts::{
    Capabilities, ContractError, LevelPolicy, Payload, TrackDataPoint, TrackDecision,
    TrackableEvent,
};

/// Decide whether a single point may be emitted.
///
/// Logs and counts drops and bypass use.
pub(crate) fn gate_point(backend: &str, policy: &LevelPolicy, point: &TrackDataPoint) -> bool {
    match policy.decide(point.level()) {
        TrackDecision::Handled => true,
        TrackDecision::Bypassed => {
            observability::record_bypass_used(backend, point.level());
            debug!(
                backend,
                key = point.key(),
                level = %point.level(),
                "Forwarding point via bypass"
            );
            true
        }
        TrackDecision::Denied => {
            observability::record_points_filtered(backend, 1);
            debug!(
                backend,
                key = point.key(),
                level = %point.level(),
                "Point dropped by level filter"
            );
            false
        }
    }
}

/// Decide whether an event may be emitted and build its payload.
///
/// The event's aggregate level is checked first; an event that fails it is
/// dropped whole. Otherwise the payload holds the points that pass
/// individually.
pub(crate) fn gate_event(
    backend: &str,
    policy: &LevelPolicy,
    event: &TrackableEvent,
) -> Option<Payload> {
    if !policy.can_track_level(event.level()) {
        observability::record_points_filtered(backend, event.values().len());
        debug!(
            backend,
            event = event.event_name(),
            level = %event.level(),
            "Event dropped by level filter"
        );
        return None;
    }

    for point in event.values() {
        if policy.decide(point.level()) == TrackDecision::Bypassed {
            observability::record_bypass_used(backend, point.level());
        }
    }
    observability::record_points_filtered(backend, policy.filtered_count(event));

    Some(policy.generate(event))
}

/// Parse the optional `capabilities` param (comma separated), defaulting to
/// every capability.
pub(crate) fn capabilities_from_params(
    params: &HashMap<String, String>,
) -> Result<Capabilities, ContractError> {
    let Some(raw) = params.get("capabilities") else {
        return Ok(Capabilities {
            recording: true,
            user_identification: true,
            action_tracking: true,
        });
    };

    let mut caps = Capabilities::default();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name {
            "recording" => caps.recording = true,
            "user_identification" => caps.user_identification = true,
            "action_tracking" => caps.action_tracking = true,
            other => {
                return Err(ContractError::invalid_argument(
                    "capabilities",
                    format!("unknown capability '{other}'"),
                ))
            }
        }
    }
    Ok(caps)
}
