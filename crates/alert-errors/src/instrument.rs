//! Per-operation instrumentation
//!
//! Every public store call runs through [`instrumented`], which times it and
//! records the outcome. It never changes the result.
//!
//! # Metrics Exposed
//!
//! - `alert_error_store_op_duration_seconds{op}` - histogram of call durations
//! - `alert_error_store_op_errors_total{op,kind}` - counter of failed calls
//!
//! Metrics go through the `metrics` facade only. The embedding service
//! installs the recorder (e.g. a Prometheus exporter); until one is installed
//! the macros are no-ops. The `alert-errors` binary installs none, since it
//! exits after a single command.

use crate::error::StoreResult;
use metrics::{counter, histogram};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, warn};

/// Public store operations, by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    MarkAlertSuccess,
    MarkAlertFailure,
    GetFailingAlertCounts,
    GetFailingAlerts,
    IsAlertFailing,
    GetLastEvent,
    UpdateLastEvent,
    AddEvent,
    GetFullErrorHistory,
    ClearAlert,
    ClearAll,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::MarkAlertSuccess => "MarkAlertSuccess",
            Operation::MarkAlertFailure => "MarkAlertFailure",
            Operation::GetFailingAlertCounts => "GetFailingAlertCounts",
            Operation::GetFailingAlerts => "GetFailingAlerts",
            Operation::IsAlertFailing => "IsAlertFailing",
            Operation::GetLastEvent => "GetLastEvent",
            Operation::UpdateLastEvent => "UpdateLastEvent",
            Operation::AddEvent => "AddEvent",
            Operation::GetFullErrorHistory => "GetFullErrorHistory",
            Operation::ClearAlert => "ClearAlert",
            Operation::ClearAll => "ClearAll",
        }
    }
}

/// Run `fut` as operation `op`, recording its duration and failure
pub(crate) async fn instrumented<T, F>(op: Operation, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let start = Instant::now();
    let result = fut.await;
    let duration = start.elapsed();

    histogram!("alert_error_store_op_duration_seconds", "op" => op.as_str())
        .record(duration.as_secs_f64());

    match &result {
        Ok(_) => {
            debug!(
                op = op.as_str(),
                duration_ms = duration.as_millis() as u64,
                "Store operation completed"
            );
        }
        Err(e) => {
            counter!(
                "alert_error_store_op_errors_total",
                "op" => op.as_str(),
                "kind" => e.kind().as_str()
            )
            .increment(1);
            warn!(
                op = op.as_str(),
                partial = e.is_partial(),
                error = %e,
                "Store operation failed"
            );
        }
    }

    result
}

/// Counts applied writes of a multi-step operation
///
/// A step failure after at least one applied write is reported as
/// [`StoreError::Partial`](crate::StoreError::Partial); before any write it is
/// returned unchanged.
pub(crate) struct WriteSteps {
    op: Operation,
    completed: usize,
}

impl WriteSteps {
    pub(crate) fn new(op: Operation) -> Self {
        Self { op, completed: 0 }
    }

    /// Apply one write step
    pub(crate) async fn apply<T, F>(&mut self, step: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match step.await {
            Ok(value) => {
                self.completed += 1;
                Ok(value)
            }
            Err(e) if self.completed == 0 => Err(e),
            Err(e) => Err(crate::error::StoreError::Partial {
                operation: self.op.as_str(),
                completed: self.completed,
                source: Box::new(e),
            }),
        }
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed
    }
}
