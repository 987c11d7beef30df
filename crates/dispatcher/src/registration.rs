//! BackendRegistration - a registered backend with its policy, capability
//! table and metrics

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, trace, warn};

use contracts::{AnalyticsBackend, Capabilities, ContractError, LevelPolicy, Operation};

use crate::metrics::BackendMetrics;

/// Result of forwarding one operation to one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Backend accepted the call
    Delivered,
    /// Backend returned an error
    Failed,
    /// Backend panicked and the panic was contained
    Panicked,
    /// Backend lacks the capability; not invoked
    Skipped,
}

impl DispatchOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            DispatchOutcome::Delivered => "delivered",
            DispatchOutcome::Failed => "failed",
            DispatchOutcome::Panicked => "panicked",
            DispatchOutcome::Skipped => "skipped",
        }
    }
}

/// Registry entry for one backend
///
/// The policy and capability table are captured once at registration.
pub struct BackendRegistration {
    name: String,
    policy: LevelPolicy,
    capabilities: Capabilities,
    backend: Arc<dyn AnalyticsBackend>,
    metrics: Arc<BackendMetrics>,
}

impl BackendRegistration {
    pub fn new(backend: Arc<dyn AnalyticsBackend>) -> Self {
        Self {
            name: backend.name().to_string(),
            policy: *backend.policy(),
            capabilities: backend.capabilities(),
            backend,
            metrics: Arc::new(BackendMetrics::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &LevelPolicy {
        &self.policy
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn backend(&self) -> &Arc<dyn AnalyticsBackend> {
        &self.backend
    }

    pub fn metrics(&self) -> &Arc<BackendMetrics> {
        &self.metrics
    }

    /// Forward `operation` to the backend through `call`.
    ///
    /// `call` returns `None` when the backend's `as_*` hook yields nothing,
    /// which is treated like a missing capability. With `isolate_faults` a
    /// panic is caught and counted; otherwise it unwinds to the caller.
    pub(crate) fn invoke<F>(
        &self,
        operation: Operation,
        isolate_faults: bool,
        call: F,
    ) -> DispatchOutcome
    where
        F: FnOnce(&dyn AnalyticsBackend) -> Option<Result<(), ContractError>>,
    {
        if !self.capabilities.supports(operation.capability()) {
            return self.finish(operation, DispatchOutcome::Skipped);
        }

        let backend = self.backend.as_ref();
        let result = if isolate_faults {
            match catch_unwind(AssertUnwindSafe(|| call(backend))) {
                Ok(result) => result,
                Err(panic) => {
                    error!(
                        backend = %self.name,
                        operation = %operation,
                        panic = %panic_message(panic.as_ref()),
                        "Backend panicked, continuing broadcast"
                    );
                    return self.finish(operation, DispatchOutcome::Panicked);
                }
            }
        } else {
            call(backend)
        };

        let outcome = match result {
            Some(Ok(())) => DispatchOutcome::Delivered,
            Some(Err(e)) => {
                error!(
                    backend = %self.name,
                    operation = %operation,
                    error = %e,
                    "Backend call failed"
                );
                DispatchOutcome::Failed
            }
            None => {
                warn!(
                    backend = %self.name,
                    operation = %operation,
                    "Capability advertised at registration but no longer available"
                );
                DispatchOutcome::Skipped
            }
        };
        self.finish(operation, outcome)
    }

    fn finish(&self, operation: Operation, outcome: DispatchOutcome) -> DispatchOutcome {
        match outcome {
            DispatchOutcome::Delivered => self.metrics.inc_delivered_count(),
            DispatchOutcome::Failed => self.metrics.inc_failure_count(),
            DispatchOutcome::Panicked => self.metrics.inc_panic_count(),
            DispatchOutcome::Skipped => self.metrics.inc_skipped_count(),
        }
        trace!(
            backend = %self.name,
            operation = %operation,
            outcome = outcome.as_str(),
            "Dispatched"
        );
        observability::record_backend_dispatch(&self.name, operation, outcome.as_str());
        outcome
    }
}

impl std::fmt::Debug for BackendRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistration")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
