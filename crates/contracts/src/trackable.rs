//! Trackable data model
//!
//! A [`TrackDataPoint`] is one named, leveled unit of information. A
//! [`TrackableEvent`] bundles zero or more of them under an event name and
//! carries the highest level among them.

use serde::{Deserialize, Serialize};

use crate::{ContractError, PiiLevel};

/// Value carried by a data point.
pub type TrackValue = serde_json::Value;

/// One named piece of information to be recorded.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataPoint")]
pub struct TrackDataPoint {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<TrackValue>,
    level: PiiLevel,
}

impl TrackDataPoint {
    /// Create a data point.
    ///
    /// # Errors
    /// `InvalidArgument` when `key` is empty.
    pub fn new(
        key: impl Into<String>,
        value: Option<TrackValue>,
        level: PiiLevel,
    ) -> Result<Self, ContractError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ContractError::invalid_argument(
                "key",
                "data point key cannot be empty",
            ));
        }
        Ok(Self { key, value, level })
    }

    /// Create a data point with a present value.
    pub fn with_value(
        key: impl Into<String>,
        value: impl Into<TrackValue>,
        level: PiiLevel,
    ) -> Result<Self, ContractError> {
        Self::new(key, Some(value.into()), level)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&TrackValue> {
        self.value.as_ref()
    }

    pub fn level(&self) -> PiiLevel {
        self.level
    }
}

/// Wire form of a data point. `level` is required: unlabelled data is
/// rejected rather than classified.
#[derive(Deserialize)]
struct RawDataPoint {
    key: String,
    #[serde(default)]
    value: Option<TrackValue>,
    level: PiiLevel,
}

impl TryFrom<RawDataPoint> for TrackDataPoint {
    type Error = ContractError;

    fn try_from(raw: RawDataPoint) -> Result<Self, Self::Error> {
        TrackDataPoint::new(raw.key, raw.value, raw.level)
    }
}

/// A named occurrence bundling zero or more data points.
///
/// `level` is the maximum level of the contained points (`None` when empty),
/// computed once at construction. There is no API to add points afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrackableEvent")]
pub struct TrackableEvent {
    event_name: String,
    values: Vec<TrackDataPoint>,
    level: PiiLevel,
}

impl TrackableEvent {
    /// Create an event and derive its aggregate level.
    ///
    /// # Errors
    /// `InvalidArgument` when `event_name` is empty.
    pub fn new(
        event_name: impl Into<String>,
        values: impl IntoIterator<Item = TrackDataPoint>,
    ) -> Result<Self, ContractError> {
        let event_name = event_name.into();
        if event_name.trim().is_empty() {
            return Err(ContractError::invalid_argument(
                "event_name",
                "event name cannot be empty",
            ));
        }
        let values: Vec<TrackDataPoint> = values.into_iter().collect();
        let level = aggregate_level(&values);
        Ok(Self {
            event_name,
            values,
            level,
        })
    }

    /// Event without any data points.
    pub fn bare(event_name: impl Into<String>) -> Result<Self, ContractError> {
        Self::new(event_name, std::iter::empty())
    }

    /// Event using one of the canonical cross-application names.
    pub fn named(
        name: EventName,
        values: impl IntoIterator<Item = TrackDataPoint>,
    ) -> Result<Self, ContractError> {
        Self::new(name.as_str(), values)
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn values(&self) -> &[TrackDataPoint] {
        &self.values
    }

    pub fn level(&self) -> PiiLevel {
        self.level
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Highest level among `points`, `PiiLevel::None` when there are none.
pub fn aggregate_level(points: &[TrackDataPoint]) -> PiiLevel {
    points
        .iter()
        .map(TrackDataPoint::level)
        .max()
        .unwrap_or(PiiLevel::None)
}

// `level` may be present in serialized input; it is ignored and recomputed.
#[derive(Deserialize)]
struct RawTrackableEvent {
    event_name: String,
    #[serde(default)]
    values: Option<Vec<TrackDataPoint>>,
}

impl TryFrom<RawTrackableEvent> for TrackableEvent {
    type Error = ContractError;

    fn try_from(raw: RawTrackableEvent) -> Result<Self, Self::Error> {
        TrackableEvent::new(raw.event_name, raw.values.unwrap_or_default())
    }
}

/// Canonical event names shared across applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    UserSignedUp,
    UserLoggedIn,
    UserCompletedOnboarding,
}

impl EventName {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventName::UserSignedUp => "user_signed_up",
            EventName::UserLoggedIn => "user_logged_in",
            EventName::UserCompletedOnboarding => "user_completed_onboarding",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(key: &str, level: PiiLevel) -> TrackDataPoint {
        TrackDataPoint::with_value(key, "v", level).unwrap()
    }

    #[test]
    fn test_empty_event_is_none() {
        let event = TrackableEvent::bare("app_opened").unwrap();
        assert_eq!(event.level(), PiiLevel::None);
        assert!(event.is_empty());
    }

    #[test]
    fn test_event_takes_highest_level() {
        let event = TrackableEvent::new(
            "profile_updated",
            vec![
                point("age", PiiLevel::NotSensitive),
                point("ssn", PiiLevel::VerySensitive),
                point("gps", PiiLevel::PersonalData),
            ],
        )
        .unwrap();
        assert_eq!(event.level(), PiiLevel::VerySensitive);
    }

    #[test]
    fn test_equal_levels_do_not_upgrade() {
        let event = TrackableEvent::new(
            "opened",
            vec![point("a", PiiLevel::None), point("b", PiiLevel::None)],
        )
        .unwrap();
        assert_eq!(event.level(), PiiLevel::None);
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(matches!(
            TrackDataPoint::new("", None, PiiLevel::None),
            Err(ContractError::InvalidArgument { ref field, .. }) if field == "key"
        ));
        assert!(matches!(
            TrackableEvent::bare("  "),
            Err(ContractError::InvalidArgument { ref field, .. }) if field == "event_name"
        ));
    }

    #[test]
    fn test_point_without_value() {
        let p = TrackDataPoint::new("screen_open", None, PiiLevel::None).unwrap();
        assert!(p.value().is_none());
    }

    #[test]
    fn test_deserialize_recomputes_level() {
        let json = r#"{
            "event_name": "checkout",
            "level": "none",
            "values": [
                { "key": "email", "value": "a@b.c", "level": "very_sensitive" },
                { "key": "cart_size", "value": 3, "level": "not_sensitive" }
            ]
        }"#;
        let event: TrackableEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.level(), PiiLevel::VerySensitive);
        assert_eq!(event.values()[1].level(), PiiLevel::NotSensitive);
    }

    #[test]
    fn test_deserialize_rejects_missing_level() {
        let event = r#"{
            "event_name": "signup",
            "values": [{ "key": "ssn", "value": "123-45-6789" }]
        }"#;
        let err = serde_json::from_str::<TrackableEvent>(event).unwrap_err();
        assert!(err.to_string().contains("level"));

        let point = r#"{ "key": "email", "value": "a@b.c" }"#;
        assert!(serde_json::from_str::<TrackDataPoint>(point).is_err());
    }

    #[test]
    fn test_deserialize_rejects_empty_key() {
        let json = r#"{ "event_name": "x", "values": [{ "key": "", "level": "none" }] }"#;
        assert!(serde_json::from_str::<TrackableEvent>(json).is_err());
    }

    #[test]
    fn test_deserialize_absent_values() {
        let event: TrackableEvent = serde_json::from_str(r#"{ "event_name": "x" }"#).unwrap();
        assert!(event.is_empty());
        assert_eq!(event.level(), PiiLevel::None);
    }

    #[test]
    fn test_named_event() {
        let event = TrackableEvent::named(EventName::UserLoggedIn, vec![]).unwrap();
        assert_eq!(event.event_name(), "user_logged_in");
    }
}
