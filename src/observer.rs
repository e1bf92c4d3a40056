//! Observability hooks for the finance engine.
//!
//! The engine never logs directly. It reports what it computed to an
//! [EngineObserver] supplied at construction time.

use rust_decimal::Decimal;

use crate::{Error, auth::UserID};

/// What the engine computed for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    /// The name of the engine operation, e.g. "total_for_period".
    pub operation: &'static str,
    /// The user the operation was scoped to, if any.
    pub user_id: Option<UserID>,
    /// How many transactions contributed to `total`.
    pub matched: usize,
    /// The result of the operation.
    pub total: Decimal,
}

/// Receives reports from the finance engine.
pub trait EngineObserver: Send + Sync {
    /// Called after an operation produced a result.
    fn on_aggregate(&self, event: &EngineEvent);

    /// Called when an operation failed with `error`.
    fn on_failure(&self, operation: &'static str, error: &Error);
}

/// Emits engine reports as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_aggregate(&self, event: &EngineEvent) {
        tracing::debug!(
            operation = event.operation,
            user_id = event.user_id.map(|user_id| user_id.as_i64()),
            matched = event.matched,
            total = %event.total,
            "engine operation completed"
        );
    }

    fn on_failure(&self, operation: &'static str, error: &Error) {
        match error {
            Error::NotFound | Error::Unauthorized | Error::Validation(_) => {
                tracing::info!(operation, %error, "engine operation rejected")
            }
            _ => tracing::error!(operation, %error, "engine operation failed"),
        }
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {
    fn on_aggregate(&self, _event: &EngineEvent) {}

    fn on_failure(&self, _operation: &'static str, _error: &Error) {}
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::{Arc, Mutex};

    use crate::Error;

    use super::{EngineEvent, EngineObserver};

    /// Records every report so tests can assert on them.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingObserver {
        pub events: Arc<Mutex<Vec<EngineEvent>>>,
        pub failures: Arc<Mutex<Vec<(&'static str, Error)>>>,
    }

    impl EngineObserver for RecordingObserver {
        fn on_aggregate(&self, event: &EngineEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn on_failure(&self, operation: &'static str, error: &Error) {
            self.failures
                .lock()
                .unwrap()
                .push((operation, error.clone()));
        }
    }
}
