//! Evaluation-side recording policy
//!
//! After each alert evaluation the engine reports either success or an error
//! message. Consecutive identical errors are coalesced into the alert's latest
//! record so its history does not grow without bound, while every raw
//! occurrence is still counted by the store.

use crate::error::StoreResult;
use crate::models::AlertError;
use crate::store::ErrorDataAccess;
use chrono::{DateTime, Utc};
use tracing::debug;

/// What [`ErrorRecorder::record_failure`] did with the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new record was prepended to the alert's history
    Appended,
    /// The latest record was updated in place; `count` is its new total
    Coalesced { count: u64 },
}

/// Applies evaluation results to an [`ErrorDataAccess`] store
pub struct ErrorRecorder<S> {
    store: S,
}

impl<S> ErrorRecorder<S>
where
    S: ErrorDataAccess<AlertError>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a failed evaluation of `name`
    ///
    /// Marks the alert failing, then coalesces into the latest record when
    /// the message matches it, otherwise appends a new record.
    pub async fn record_failure(
        &self,
        name: &str,
        message: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<RecordOutcome> {
        self.store.mark_alert_failure(name).await?;

        match self.store.get_last_event(name).await? {
            Some(mut last) if last.is_same_error(message) => {
                last.coalesce(at);
                self.store.update_last_event(name, &last).await?;
                debug!(alert = name, count = last.count, "Coalesced repeated alert error");
                Ok(RecordOutcome::Coalesced { count: last.count })
            }
            _ => {
                self.store
                    .add_event(name, &AlertError::new(message, at))
                    .await?;
                debug!(alert = name, "Recorded new alert error");
                Ok(RecordOutcome::Appended)
            }
        }
    }

    /// Record a successful evaluation of `name`
    pub async fn record_success(&self, name: &str) -> StoreResult<()> {
        self.store.mark_alert_success(name).await
    }
}
