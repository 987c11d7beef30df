//! Dispatch metrics module
//!
//! Records backend registration and per-call dispatch outcomes through the
//! `metrics` facade, plus an in-memory summary for CLI output.

use metrics::{counter, gauge};

use contracts::{Operation, PiiLevel};

/// Record a backend registration
///
/// `bypass_levels` is the number of levels the backend receives only through
/// its bypass set.
pub fn record_backend_registered(backend: &str, bypass_levels: usize) {
    counter!("pii_dispatch_backends_registered_total").increment(1);
    gauge!(
        "pii_dispatch_backend_bypass_levels",
        "backend" => backend.to_string()
    )
    .set(bypass_levels as f64);
}

/// Record the outcome of forwarding one operation to one backend
pub fn record_backend_dispatch(backend: &str, operation: Operation, outcome: &str) {
    counter!(
        "pii_dispatch_calls_total",
        "backend" => backend.to_string(),
        "operation" => operation.as_str(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record data points a backend dropped by filtering
pub fn record_points_filtered(backend: &str, count: usize) {
    if count == 0 {
        return;
    }
    counter!(
        "pii_dispatch_points_filtered_total",
        "backend" => backend.to_string()
    )
    .increment(count as u64);
}

/// Record a data point forwarded only because of a bypass level
pub fn record_bypass_used(backend: &str, level: PiiLevel) {
    counter!(
        "pii_dispatch_bypass_forwarded_total",
        "backend" => backend.to_string(),
        "level" => level.as_str()
    )
    .increment(1);
}

/// Per-backend line of a [`DispatchSummary`]
#[derive(Debug, Clone, Default)]
pub struct BackendSummary {
    pub name: String,
    pub delivered: u64,
    pub failed: u64,
    pub panicked: u64,
    pub skipped: u64,
}

/// Dispatch summary
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub backends: Vec<BackendSummary>,
}

impl DispatchSummary {
    pub fn new(backends: Vec<BackendSummary>) -> Self {
        Self { backends }
    }

    pub fn total_delivered(&self) -> u64 {
        self.backends.iter().map(|b| b.delivered).sum()
    }

    pub fn total_faults(&self) -> u64 {
        self.backends.iter().map(|b| b.failed + b.panicked).sum()
    }
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Backends: {}", self.backends.len())?;
        writeln!(f, "Delivered calls: {}", self.total_delivered())?;
        writeln!(f, "Faulted calls: {}", self.total_faults())?;

        if !self.backends.is_empty() {
            writeln!(f, "Per backend:")?;
            for backend in &self.backends {
                writeln!(
                    f,
                    "  {}: delivered={}, failed={}, panicked={}, skipped={}",
                    backend.name,
                    backend.delivered,
                    backend.failed,
                    backend.panicked,
                    backend.skipped
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let summary = DispatchSummary::new(vec![
            BackendSummary {
                name: "a".into(),
                delivered: 3,
                failed: 1,
                panicked: 0,
                skipped: 2,
            },
            BackendSummary {
                name: "b".into(),
                delivered: 2,
                failed: 0,
                panicked: 1,
                skipped: 0,
            },
        ]);
        assert_eq!(summary.total_delivered(), 5);
        assert_eq!(summary.total_faults(), 2);
    }

    #[test]
    fn test_summary_display() {
        let summary = DispatchSummary::new(vec![BackendSummary {
            name: "console".into(),
            delivered: 4,
            ..Default::default()
        }]);

        let output = format!("{}", summary);
        assert!(output.contains("Backends: 1"));
        assert!(output.contains("console: delivered=4"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_backend_registered("a", 1);
        record_backend_dispatch("a", Operation::TrackEvent, "delivered");
        record_points_filtered("a", 2);
        record_bypass_used("a", PiiLevel::VerySensitive);
    }
}
