//! Capability filter and payload generation
//!
//! Filtering is set membership, never ordering: a level passes when it is
//! handled or explicitly bypassed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{LevelSet, PiiLevel, TrackDataPoint, TrackValue, TrackableEvent};

/// Filtered key/value mapping handed to a backend's vendor SDK.
pub type Payload = BTreeMap<String, TrackValue>;

/// Outcome of checking a level against a [`LevelPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackDecision {
    /// Level is declared safe to handle
    Handled,
    /// Level is not handled but the backend bypasses the check for it
    Bypassed,
    /// Level must not be forwarded
    Denied,
}

impl TrackDecision {
    #[inline]
    pub const fn is_allowed(self) -> bool {
        !matches!(self, TrackDecision::Denied)
    }
}

/// A backend's declared handling and bypass sets.
///
/// `bypasses` is DANGEROUS: every level in it reaches the backend whether or
/// not the backend declared it can handle that level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPolicy {
    #[serde(default)]
    pub handles: LevelSet,
    #[serde(default)]
    pub bypasses: LevelSet,
}

impl LevelPolicy {
    pub fn new(handles: impl Into<LevelSet>, bypasses: impl Into<LevelSet>) -> Self {
        Self {
            handles: handles.into(),
            bypasses: bypasses.into(),
        }
    }

    /// Policy without any bypass levels.
    pub fn handling(handles: impl Into<LevelSet>) -> Self {
        Self::new(handles, LevelSet::empty())
    }

    pub fn decide(&self, level: PiiLevel) -> TrackDecision {
        if self.handles.contains(level) {
            TrackDecision::Handled
        } else if self.bypasses.contains(level) {
            TrackDecision::Bypassed
        } else {
            TrackDecision::Denied
        }
    }

    #[inline]
    pub fn can_track_level(&self, level: PiiLevel) -> bool {
        self.decide(level).is_allowed()
    }

    /// Bypass levels that are not also handled, i.e. the ones that actually
    /// defeat the sensitivity gate.
    pub fn bypass_levels_in_use(&self) -> LevelSet {
        self.bypasses.difference(self.handles)
    }

    /// Every level this policy lets through.
    pub fn accepted_levels(&self) -> LevelSet {
        self.handles.union(self.bypasses)
    }

    /// Build the filtered payload for `event`.
    ///
    /// Includes exactly the points that pass the filter and carry a value.
    /// Duplicate keys resolve to the last point in `values` order.
    pub fn generate(&self, event: &TrackableEvent) -> Payload {
        event
            .values()
            .iter()
            .filter(|point| self.can_track_level(point.level()))
            .filter_map(|point| {
                point
                    .value()
                    .map(|value| (point.key().to_string(), value.clone()))
            })
            .collect()
    }

    /// Number of points in `event` the filter drops (absent values excluded).
    pub fn filtered_count(&self, event: &TrackableEvent) -> usize {
        event
            .values()
            .iter()
            .filter(|point| !self.can_track_level(point.level()))
            .count()
    }
}

/// Implemented by every backend: exposes its policy and derives the filter
/// and payload operations from it.
pub trait HandlesSensitive {
    /// Declared handling / bypass sets
    fn policy(&self) -> &LevelPolicy;

    fn can_track_point(&self, point: &TrackDataPoint) -> bool {
        self.policy().can_track_level(point.level())
    }

    fn can_track_event(&self, event: &TrackableEvent) -> bool {
        self.policy().can_track_level(event.level())
    }

    fn generate(&self, event: &TrackableEvent) -> Payload {
        self.policy().generate(event)
    }
}

impl HandlesSensitive for LevelPolicy {
    fn policy(&self) -> &LevelPolicy {
        self
    }
}
