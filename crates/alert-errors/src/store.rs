//! Alert error store
//!
//! Tracks which alerts are failing and keeps their error history.
//!
//! # Consistency
//!
//! Each operation acquires one session and issues its commands one after the
//! other, with no transaction around them. Concurrent callers may interleave,
//! including for the same alert. A failure mid-sequence leaves the earlier
//! writes in place and is reported as [`StoreError::Partial`]:
//!
//! - `mark_alert_failure`: alert may be in `alertsWithErrors` but not failing
//! - `add_event`, `update_last_event`: alert indexed with no new event, or
//!   history written but occurrence not logged (the volume counter
//!   under-counts), or for an update the previous head popped without its
//!   replacement
//! - `clear_alert`: alert partially cleared
//! - `clear_all`: some histories deleted while the sets and log survive; an
//!   alert failing concurrently with the clear can keep a fresh failure mark
//!
//! Callers retry the whole operation; nothing is rolled back here.

use crate::backend::StoreBackend;
use crate::error::StoreResult;
use crate::indexes::{AlertHistory, AlertSet, OccurrenceLog};
use crate::instrument::{instrumented, Operation, WriteSteps};
use crate::keys::StoreKeys;
use crate::models::{AlertError, FailingAlertCounts};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Failure state and error history of alerts
///
/// `E` is the caller's event record; the store only needs it to survive a
/// JSON round trip.
#[async_trait]
pub trait ErrorDataAccess<E: Send + Sync>: Send + Sync {
    /// Remove `name` from the failing set (no-op if absent)
    async fn mark_alert_success(&self, name: &str) -> StoreResult<()>;

    /// Add `name` to the alerts-with-errors set, then to the failing set
    async fn mark_alert_failure(&self, name: &str) -> StoreResult<()>;

    /// Failing alert count and total raw error events
    async fn get_failing_alert_counts(&self) -> StoreResult<FailingAlertCounts>;

    async fn get_failing_alerts(&self) -> StoreResult<HashSet<String>>;

    async fn is_alert_failing(&self, name: &str) -> StoreResult<bool>;

    /// Most recent event for `name`, `None` if it has no history
    async fn get_last_event(&self, name: &str) -> StoreResult<Option<E>>;

    /// Replace the most recent event for `name` and log one more occurrence
    ///
    /// Also ensures `name` is in the alerts-with-errors set.
    async fn update_last_event(&self, name: &str, event: &E) -> StoreResult<()>;

    /// Prepend an event to the history of `name` and log the occurrence
    ///
    /// Also ensures `name` is in the alerts-with-errors set, so every written
    /// history is reachable from [`get_full_error_history`](Self::get_full_error_history).
    async fn add_event(&self, name: &str, event: &E) -> StoreResult<()>;

    /// Every alert with errors mapped to its events, most recent first
    async fn get_full_error_history(&self) -> StoreResult<HashMap<String, Vec<E>>>;

    /// Erase all state for `name`
    async fn clear_alert(&self, name: &str) -> StoreResult<()>;

    /// Erase all state for every alert
    async fn clear_all(&self) -> StoreResult<()>;
}

/// [`ErrorDataAccess`] over a [`StoreBackend`]
pub struct ErrorStore<B, E = AlertError> {
    backend: B,
    keys: StoreKeys,
    _record: PhantomData<fn() -> E>,
}

impl<B: StoreBackend, E> ErrorStore<B, E> {
    /// Create a store using the bare key names
    pub fn new(backend: B) -> Self {
        Self::with_keys(backend, StoreKeys::new())
    }

    /// Create a store whose keys live under `keys`
    pub fn with_keys(backend: B, keys: StoreKeys) -> Self {
        Self {
            backend,
            keys,
            _record: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    fn failing(&self) -> AlertSet {
        AlertSet::new(self.keys.failing_alerts())
    }

    fn with_errors(&self) -> AlertSet {
        AlertSet::new(self.keys.alerts_with_errors())
    }

    fn occurrences(&self) -> OccurrenceLog {
        OccurrenceLog::new(self.keys.error_events())
    }

    fn history(&self, alert: &str) -> AlertHistory {
        AlertHistory::new(self.keys.history(alert))
    }
}

fn encode<E: Serialize>(event: &E) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(event)?)
}

fn decode<E: DeserializeOwned>(payload: &[u8]) -> StoreResult<E> {
    Ok(serde_json::from_slice(payload)?)
}

#[async_trait]
impl<B, E> ErrorDataAccess<E> for ErrorStore<B, E>
where
    B: StoreBackend,
    E: Serialize + DeserializeOwned + Send + Sync,
{
    async fn mark_alert_success(&self, name: &str) -> StoreResult<()> {
        instrumented(Operation::MarkAlertSuccess, async {
            let mut conn = self.backend.session().await?;
            self.failing().remove(&mut conn, name).await?;
            debug!(alert = name, "Alert marked successful");
            Ok(())
        })
        .await
    }

    async fn mark_alert_failure(&self, name: &str) -> StoreResult<()> {
        instrumented(Operation::MarkAlertFailure, async {
            let mut conn = self.backend.session().await?;
            let mut steps = WriteSteps::new(Operation::MarkAlertFailure);

            steps.apply(self.with_errors().add(&mut conn, name)).await?;
            steps.apply(self.failing().add(&mut conn, name)).await?;

            debug!(alert = name, "Alert marked failing");
            Ok(())
        })
        .await
    }

    async fn get_failing_alert_counts(&self) -> StoreResult<FailingAlertCounts> {
        instrumented(Operation::GetFailingAlertCounts, async {
            let mut conn = self.backend.session().await?;
            let failing = self.failing().len(&mut conn).await?;
            let total_events = self.occurrences().len(&mut conn).await?;

            Ok(FailingAlertCounts {
                failing,
                total_events,
            })
        })
        .await
    }

    async fn get_failing_alerts(&self) -> StoreResult<HashSet<String>> {
        instrumented(Operation::GetFailingAlerts, async {
            let mut conn = self.backend.session().await?;
            self.failing().members(&mut conn).await
        })
        .await
    }

    async fn is_alert_failing(&self, name: &str) -> StoreResult<bool> {
        instrumented(Operation::IsAlertFailing, async {
            let mut conn = self.backend.session().await?;
            self.failing().contains(&mut conn, name).await
        })
        .await
    }

    async fn get_last_event(&self, name: &str) -> StoreResult<Option<E>> {
        instrumented(Operation::GetLastEvent, async {
            let mut conn = self.backend.session().await?;
            match self.history(name).latest(&mut conn).await? {
                Some(payload) => Ok(Some(decode(&payload)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn update_last_event(&self, name: &str, event: &E) -> StoreResult<()> {
        instrumented(Operation::UpdateLastEvent, async {
            let payload = encode(event)?;
            let mut conn = self.backend.session().await?;
            let history = self.history(name);
            let mut steps = WriteSteps::new(Operation::UpdateLastEvent);

            steps.apply(self.with_errors().add(&mut conn, name)).await?;
            steps.apply(history.pop_latest(&mut conn)).await?;
            steps.apply(history.prepend(&mut conn, &payload)).await?;
            steps.apply(self.occurrences().record(&mut conn, name)).await?;

            debug!(alert = name, "Coalesced alert error event");
            Ok(())
        })
        .await
    }

    async fn add_event(&self, name: &str, event: &E) -> StoreResult<()> {
        instrumented(Operation::AddEvent, async {
            let payload = encode(event)?;
            let mut conn = self.backend.session().await?;
            let mut steps = WriteSteps::new(Operation::AddEvent);

            steps.apply(self.with_errors().add(&mut conn, name)).await?;
            steps
                .apply(self.history(name).prepend(&mut conn, &payload))
                .await?;
            steps
                .apply(self.occurrences().record(&mut conn, name))
                .await?;

            debug!(alert = name, "Recorded alert error event");
            Ok(())
        })
        .await
    }

    async fn get_full_error_history(&self) -> StoreResult<HashMap<String, Vec<E>>> {
        instrumented(Operation::GetFullErrorHistory, async {
            let mut conn = self.backend.session().await?;
            let alerts = self.with_errors().members(&mut conn).await?;

            let mut results = HashMap::with_capacity(alerts.len());
            for alert in alerts {
                let rows = self.history(&alert).all(&mut conn).await?;
                let events = rows
                    .iter()
                    .map(|row| decode(row))
                    .collect::<StoreResult<Vec<E>>>()?;
                results.insert(alert, events);
            }

            Ok(results)
        })
        .await
    }

    async fn clear_alert(&self, name: &str) -> StoreResult<()> {
        instrumented(Operation::ClearAlert, async {
            let mut conn = self.backend.session().await?;
            let mut steps = WriteSteps::new(Operation::ClearAlert);

            steps.apply(self.with_errors().remove(&mut conn, name)).await?;
            steps.apply(self.failing().remove(&mut conn, name)).await?;
            steps.apply(self.history(name).delete(&mut conn)).await?;
            let purged = steps
                .apply(self.occurrences().purge(&mut conn, name))
                .await?;

            warn!(alert = name, purged_events = purged, "Cleared alert error state");
            Ok(())
        })
        .await
    }

    async fn clear_all(&self) -> StoreResult<()> {
        instrumented(Operation::ClearAll, async {
            let mut conn = self.backend.session().await?;
            let alerts = self.with_errors().members(&mut conn).await?;
            let mut steps = WriteSteps::new(Operation::ClearAll);

            for alert in &alerts {
                steps.apply(self.history(alert).delete(&mut conn)).await?;
            }
            steps.apply(self.with_errors().delete(&mut conn)).await?;
            steps.apply(self.failing().delete(&mut conn)).await?;
            steps.apply(self.occurrences().delete(&mut conn)).await?;

            warn!(
                alerts = alerts.len(),
                writes = steps.completed(),
                "Cleared all alert error state"
            );
            Ok(())
        })
        .await
    }
}
