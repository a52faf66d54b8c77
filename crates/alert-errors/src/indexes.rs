//! Typed views over the store's keys
//!
//! [`AlertHistory`] and [`OccurrenceLog`] both grow on every recorded event,
//! but only the history can be rewritten in place: coalescing replaces the
//! head of an alert's history while the occurrence log still gains an entry.
//! The log is therefore a volume counter, never a source of events.

use crate::backend::StoreSession;
use crate::error::StoreResult;
use std::collections::HashSet;

/// A set of alert names (`failingAlerts` or `alertsWithErrors`)
pub(crate) struct AlertSet {
    key: String,
}

impl AlertSet {
    pub(crate) fn new(key: String) -> Self {
        Self { key }
    }

    pub(crate) async fn add<S: StoreSession>(&self, conn: &mut S, alert: &str) -> StoreResult<()> {
        conn.set_add(&self.key, alert).await
    }

    pub(crate) async fn remove<S: StoreSession>(
        &self,
        conn: &mut S,
        alert: &str,
    ) -> StoreResult<()> {
        conn.set_remove(&self.key, alert).await
    }

    pub(crate) async fn contains<S: StoreSession>(
        &self,
        conn: &mut S,
        alert: &str,
    ) -> StoreResult<bool> {
        conn.set_contains(&self.key, alert).await
    }

    pub(crate) async fn members<S: StoreSession>(
        &self,
        conn: &mut S,
    ) -> StoreResult<HashSet<String>> {
        conn.set_members(&self.key).await
    }

    pub(crate) async fn len<S: StoreSession>(&self, conn: &mut S) -> StoreResult<u64> {
        conn.set_len(&self.key).await
    }

    pub(crate) async fn delete<S: StoreSession>(&self, conn: &mut S) -> StoreResult<()> {
        conn.delete(&self.key).await
    }
}

/// One alert's serialized events, most recent first
pub(crate) struct AlertHistory {
    key: String,
}

impl AlertHistory {
    pub(crate) fn new(key: String) -> Self {
        Self { key }
    }

    pub(crate) async fn prepend<S: StoreSession>(
        &self,
        conn: &mut S,
        payload: &[u8],
    ) -> StoreResult<()> {
        conn.list_push_front(&self.key, payload).await
    }

    /// Drop the most recent event
    pub(crate) async fn pop_latest<S: StoreSession>(
        &self,
        conn: &mut S,
    ) -> StoreResult<Option<Vec<u8>>> {
        conn.list_pop_front(&self.key).await
    }

    pub(crate) async fn latest<S: StoreSession>(
        &self,
        conn: &mut S,
    ) -> StoreResult<Option<Vec<u8>>> {
        conn.list_first(&self.key).await
    }

    pub(crate) async fn all<S: StoreSession>(&self, conn: &mut S) -> StoreResult<Vec<Vec<u8>>> {
        conn.list_all(&self.key).await
    }

    pub(crate) async fn delete<S: StoreSession>(&self, conn: &mut S) -> StoreResult<()> {
        conn.delete(&self.key).await
    }
}

/// Append-only log of alert names, one entry per raw event
pub(crate) struct OccurrenceLog {
    key: String,
}

impl OccurrenceLog {
    pub(crate) fn new(key: String) -> Self {
        Self { key }
    }

    pub(crate) async fn record<S: StoreSession>(
        &self,
        conn: &mut S,
        alert: &str,
    ) -> StoreResult<()> {
        conn.list_push_front(&self.key, alert.as_bytes()).await
    }

    pub(crate) async fn len<S: StoreSession>(&self, conn: &mut S) -> StoreResult<u64> {
        conn.list_len(&self.key).await
    }

    /// Remove every entry for `alert`
    pub(crate) async fn purge<S: StoreSession>(
        &self,
        conn: &mut S,
        alert: &str,
    ) -> StoreResult<u64> {
        conn.list_remove_all(&self.key, alert.as_bytes()).await
    }

    pub(crate) async fn delete<S: StoreSession>(&self, conn: &mut S) -> StoreResult<()> {
        conn.delete(&self.key).await
    }
}
