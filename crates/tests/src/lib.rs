//! # Integration Tests
//!
//! Cross-crate integration and end-to-end tests.
//!
//! Covers:
//! - Level filtering and payload scenarios
//! - Capability-based broadcast
//! - Config file -> manager -> backend flows (no vendor SDK needed)

#[cfg(test)]
mod contract_tests {
    use contracts::{
        HandlesSensitive, LevelPolicy, LevelSet, PiiLevel, TrackDataPoint, TrackableEvent,
    };

    fn ssn() -> TrackDataPoint {
        TrackDataPoint::with_value("ssn", "1234567890", PiiLevel::VerySensitive).unwrap()
    }

    fn other() -> TrackDataPoint {
        TrackDataPoint::with_value("other", "someOtherValue", PiiLevel::None).unwrap()
    }

    #[test]
    fn test_handled_sensitive_point_kept() {
        let policy = LevelPolicy::handling([PiiLevel::VerySensitive, PiiLevel::None]);
        let event = TrackableEvent::new("didChangeSSN", vec![ssn()]).unwrap();

        let payload = policy.generate(&event);
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn test_unhandled_sensitive_point_removed() {
        let policy = LevelPolicy::handling([PiiLevel::None]);
        let event = TrackableEvent::new("didChangeSSN", vec![ssn(), other()]).unwrap();

        let payload = policy.generate(&event);
        assert_eq!(payload.len(), 1);
        assert!(payload.contains_key("other"));
        assert!(!payload.contains_key("ssn"));
    }

    #[test]
    fn test_bypass_overrides_handles() {
        let policy = LevelPolicy::new([PiiLevel::None], [PiiLevel::VerySensitive]);
        assert!(policy.can_track_point(&ssn()));
    }

    #[test]
    fn test_bypass_does_not_cover_other_levels() {
        let policy = LevelPolicy::new(LevelSet::empty(), [PiiLevel::Diagnostic]);
        assert!(!policy.can_track_point(&ssn()));
    }

    #[test]
    fn test_event_level_is_max_in_any_order() {
        let point = |key: &str, level| TrackDataPoint::new(key, None, level).unwrap();
        let orders = [
            [PiiLevel::None, PiiLevel::None, PiiLevel::VerySensitive],
            [PiiLevel::None, PiiLevel::VerySensitive, PiiLevel::None],
            [PiiLevel::VerySensitive, PiiLevel::None, PiiLevel::None],
        ];

        for levels in orders {
            let values: Vec<_> = levels
                .iter()
                .enumerate()
                .map(|(i, &level)| point(&format!("k{i}"), level))
                .collect();
            let event = TrackableEvent::new("mixed", values).unwrap();
            assert_eq!(event.level(), PiiLevel::VerySensitive);
        }
    }
}

#[cfg(test)]
mod broadcast_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use contracts::{
        ActionTrackable, AnalyticsBackend, ContractError, HandlesSensitive, LevelPolicy, PiiLevel,
        TrackDataPoint, TrackableEvent, UserTrackable,
    };
    use dispatcher::{AnalyticsManager, EmittedCall, MemoryBackend};

    /// Backend that only tracks actions and counts every call
    struct ActionCounter {
        policy: LevelPolicy,
        calls: AtomicUsize,
    }

    impl HandlesSensitive for ActionCounter {
        fn policy(&self) -> &LevelPolicy {
            &self.policy
        }
    }

    impl ActionTrackable for ActionCounter {
        fn track_point(&self, _point: &TrackDataPoint) -> Result<(), ContractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn track_event(&self, _event: &TrackableEvent) -> Result<(), ContractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl AnalyticsBackend for ActionCounter {
        fn name(&self) -> &str {
            "action_counter"
        }

        fn as_action_trackable(&self) -> Option<&dyn ActionTrackable> {
            Some(self)
        }
    }

    /// Backend that only identifies users
    struct UserCounter {
        policy: LevelPolicy,
        users: AtomicUsize,
    }

    impl HandlesSensitive for UserCounter {
        fn policy(&self) -> &LevelPolicy {
            &self.policy
        }
    }

    impl UserTrackable for UserCounter {
        fn set_user(&self, _user: &TrackDataPoint) -> Result<(), ContractError> {
            self.users.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl AnalyticsBackend for UserCounter {
        fn name(&self) -> &str {
            "user_counter"
        }

        fn as_user_trackable(&self) -> Option<&dyn UserTrackable> {
            Some(self)
        }
    }

    /// Backend whose event tracking always panics
    struct Panicking {
        policy: LevelPolicy,
    }

    impl HandlesSensitive for Panicking {
        fn policy(&self) -> &LevelPolicy {
            &self.policy
        }
    }

    impl ActionTrackable for Panicking {
        fn track_point(&self, _point: &TrackDataPoint) -> Result<(), ContractError> {
            Ok(())
        }

        fn track_event(&self, _event: &TrackableEvent) -> Result<(), ContractError> {
            panic!("vendor SDK crashed");
        }
    }

    impl AnalyticsBackend for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn as_action_trackable(&self) -> Option<&dyn ActionTrackable> {
            Some(self)
        }
    }

    fn user() -> TrackDataPoint {
        TrackDataPoint::new("u-42", None, PiiLevel::PersonalData).unwrap()
    }

    #[test]
    fn test_set_user_reaches_only_user_trackable_backend() {
        let first = Arc::new(ActionCounter {
            policy: LevelPolicy::default(),
            calls: AtomicUsize::new(0),
        });
        let second = Arc::new(UserCounter {
            policy: LevelPolicy::default(),
            users: AtomicUsize::new(0),
        });

        let manager = AnalyticsManager::new();
        manager.register(first.clone());
        manager.register(second.clone());

        manager.set_user(&user());

        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.users.load(Ordering::SeqCst), 1);

        let metrics = manager.metrics();
        assert_eq!(metrics[0].1.skipped_count, 1);
        assert_eq!(metrics[1].1.delivered_count, 1);
    }

    #[test]
    fn test_panicking_backend_isolated() {
        let after = Arc::new(MemoryBackend::new(
            "after",
            LevelPolicy::handling([PiiLevel::None]),
        ));

        let manager = AnalyticsManager::new();
        manager.register(Arc::new(Panicking {
            policy: LevelPolicy::default(),
        }));
        manager.register(after.clone());

        manager.track_event(&TrackableEvent::bare("opened").unwrap());

        assert_eq!(after.event_payloads().len(), 1);
        assert_eq!(manager.metrics()[0].1.panic_count, 1);
    }

    #[test]
    fn test_panicking_backend_propagates_without_isolation() {
        let manager = AnalyticsManager::with_settings(contracts::DispatchSettings {
            isolate_faults: false,
        });
        manager.register(Arc::new(Panicking {
            policy: LevelPolicy::default(),
        }));

        let event = TrackableEvent::bare("opened").unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            manager.track_event(&event);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_recording_broadcast() {
        let backend = Arc::new(MemoryBackend::new("replay", LevelPolicy::default()));
        let manager = AnalyticsManager::new();
        manager.register(backend.clone());

        manager.start_recording(false);
        manager.mark_view(true, &"card_number");
        manager.pause_recording();
        manager.start_recording(true);

        let calls = backend.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[1],
            EmittedCall::ViewMarked {
                as_sensitive: true,
                view: Some("card_number".to_string())
            }
        );
        assert_eq!(calls[2], EmittedCall::RecordingPaused);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{PiiLevel, TrackDataPoint, TrackableEvent};
    use dispatcher::{AnalyticsManager, EmittedCall, LogBackend, MemoryBackend};
    use serde_json::json;

    const CONFIG: &str = r#"
[dispatch]
isolate_faults = true

[[backends]]
name = "console"
backend_type = "log"
handles_levels = [
    "none",
    "not_sensitive",
    "personal_data",
    "network",
    "diagnostic",
    "very_sensitive",
]
"#;

    /// End-to-end: config -> manager (log backend) + manually registered
    /// memory backends -> filtered output
    #[test]
    fn test_e2e_config_to_backends() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let manager = dispatcher::create_manager(&blueprint).unwrap();

        let everything = Arc::new(MemoryBackend::new(
            "everything",
            contracts::LevelPolicy::handling(contracts::LevelSet::all()),
        ));
        let cautious = Arc::new(MemoryBackend::new(
            "cautious",
            contracts::LevelPolicy::new(
                [PiiLevel::None, PiiLevel::NotSensitive],
                [PiiLevel::PersonalData],
            ),
        ));
        manager.register(everything.clone());
        manager.register(cautious.clone());
        assert_eq!(
            manager.backend_names(),
            vec!["console", "everything", "cautious"]
        );

        let signup = TrackableEvent::new(
            "user_signed_up",
            vec![
                TrackDataPoint::with_value("plan", "pro", PiiLevel::NotSensitive).unwrap(),
                TrackDataPoint::with_value("email", "a@b.c", PiiLevel::PersonalData).unwrap(),
                TrackDataPoint::new("referrer", None, PiiLevel::None).unwrap(),
            ],
        )
        .unwrap();
        manager.track_event(&signup);

        let full = everything.event_payloads();
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].1.get("email"), Some(&json!("a@b.c")));
        assert!(!full[0].1.contains_key("referrer"));

        let filtered = cautious.event_payloads();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].1.len(), 2);

        let secret =
            TrackDataPoint::with_value("ssn", "1234567890", PiiLevel::VerySensitive).unwrap();
        manager.set_user(&secret);
        manager.track_point(&secret);

        assert!(cautious.calls().len() == 1, "cautious must not see the ssn");
        assert!(everything
            .calls()
            .contains(&EmittedCall::User(secret.clone())));

        let delivered: u64 = manager
            .metrics()
            .iter()
            .map(|(_, m)| m.delivered_count)
            .sum();
        assert_eq!(delivered, 9);
    }

    #[test]
    fn test_e2e_events_from_json() {
        let events: Vec<TrackableEvent> = serde_json::from_value(json!([
            {
                "event_name": "didChangeSSN",
                "values": [
                    { "key": "ssn", "value": "1234567890", "level": "very_sensitive" },
                    { "key": "other", "value": "someOtherValue", "level": "none" }
                ]
            },
            { "event_name": "opened", "values": [] }
        ]))
        .unwrap();
        assert_eq!(events[0].level(), PiiLevel::VerySensitive);
        assert_eq!(events[1].level(), PiiLevel::None);

        let manager = AnalyticsManager::new();
        let none_only = Arc::new(MemoryBackend::new(
            "none_only",
            contracts::LevelPolicy::handling([PiiLevel::None]),
        ));
        manager.register(Arc::new(LogBackend::new(
            "console",
            contracts::LevelPolicy::handling([PiiLevel::None]),
        )));
        manager.register(none_only.clone());

        for event in &events {
            manager.track_event(event);
        }

        // the SSN event's aggregate level is denied, so only "opened" arrives
        let payloads = none_only.event_payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].0, "opened");
    }
}
