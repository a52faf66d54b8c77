//! Data models stored and returned by the alert error store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One evaluation error recorded for an alert
///
/// Repeated identical errors are coalesced into a single record: `count`
/// grows and `last_time` moves forward while `first_time` is kept.
/// Field names serialize in PascalCase to stay readable by existing
/// consumers of the `errors:{name}` lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertError {
    /// When this error was first seen
    pub first_time: DateTime<Utc>,
    /// When this error was most recently seen
    pub last_time: DateTime<Utc>,
    /// Number of occurrences folded into this record
    pub count: u64,
    /// Error message reported by the evaluation
    pub message: String,
}

impl AlertError {
    /// Create a record for a first occurrence
    pub fn new(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            first_time: at,
            last_time: at,
            count: 1,
            message: message.into(),
        }
    }

    /// Whether a new error with `message` should be folded into this record
    pub fn is_same_error(&self, message: &str) -> bool {
        self.message == message
    }

    /// Fold one more occurrence into this record
    pub fn coalesce(&mut self, at: DateTime<Utc>) {
        self.count += 1;
        if at > self.last_time {
            self.last_time = at;
        }
    }
}

/// Result of [`get_failing_alert_counts`](crate::ErrorDataAccess::get_failing_alert_counts)
///
/// The two values come from independent reads and are not a consistent
/// snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailingAlertCounts {
    /// Number of alerts currently failing
    pub failing: u64,
    /// Number of raw error events since the last full clear
    pub total_events: u64,
}
