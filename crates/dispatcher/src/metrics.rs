//! Backend metrics for observability

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single registered backend
#[derive(Debug, Default)]
pub struct BackendMetrics {
    /// Calls the backend accepted
    delivered_count: AtomicU64,
    /// Calls the backend returned an error for
    failure_count: AtomicU64,
    /// Calls that panicked inside the backend
    panic_count: AtomicU64,
    /// Calls not forwarded because the capability is missing
    skipped_count: AtomicU64,
}

impl BackendMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn panic_count(&self) -> u64 {
        self.panic_count.load(Ordering::Relaxed)
    }

    pub fn inc_panic_count(&self) {
        self.panic_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped_count(&self) -> u64 {
        self.skipped_count.load(Ordering::Relaxed)
    }

    pub fn inc_skipped_count(&self) {
        self.skipped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            delivered_count: self.delivered_count(),
            failure_count: self.failure_count(),
            panic_count: self.panic_count(),
            skipped_count: self.skipped_count(),
        }
    }
}

/// Snapshot of backend metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub delivered_count: u64,
    pub failure_count: u64,
    pub panic_count: u64,
    pub skipped_count: u64,
}

impl MetricsSnapshot {
    /// Calls that reached the backend, whatever the result
    pub fn invoked_count(&self) -> u64 {
        self.delivered_count + self.failure_count + self.panic_count
    }
}
