//! Integration tests for clearing and partial failures
//!
//! Tests cover:
//! - Clearing one alert (all four indexes, every occurrence-log entry)
//! - Clearing all alerts
//! - Both clear paths aborting partway
//! - Partial-write reporting for multi-step writes
//! - Session release on success and failure paths
//! - Concurrent writers on the same alert

use alert_errors::{
    AlertError, Command, ErrorDataAccess, ErrorRecorder, ErrorStore, InMemoryBackend,
    RecordOutcome, StoreError, StoreErrorKind,
};
use anyhow::Result;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

fn setup_store() -> ErrorStore<InMemoryBackend, Value> {
    ErrorStore::new(InMemoryBackend::new())
}

async fn seed(store: &ErrorStore<InMemoryBackend, Value>, name: &str, events: usize) -> Result<()> {
    store.mark_alert_failure(name).await?;
    for i in 0..events {
        store.add_event(name, &json!({"alert": name, "n": i})).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_clear_alert_removes_everything_for_alert() -> Result<()> {
    let store = setup_store();
    seed(&store, "cpu.high", 3).await?;
    seed(&store, "disk.full", 2).await?;

    store.clear_alert("cpu.high").await?;

    assert!(!store.get_failing_alerts().await?.contains("cpu.high"));
    assert!(!store.is_alert_failing("cpu.high").await?);
    assert_eq!(store.get_last_event("cpu.high").await?, None);

    let history = store.get_full_error_history().await?;
    assert!(!history.contains_key("cpu.high"));
    assert_eq!(history["disk.full"].len(), 2);

    // Every occurrence of the alert is purged from the log, others remain
    let counts = store.get_failing_alert_counts().await?;
    assert_eq!(counts.failing, 1);
    assert_eq!(counts.total_events, 2);
    assert!(!store
        .backend()
        .list_snapshot("errorEvents")
        .contains(&b"cpu.high".to_vec()));
    Ok(())
}

#[tokio::test]
async fn test_clear_alert_purges_coalesced_occurrences() -> Result<()> {
    let store = setup_store();
    store.add_event("a", &json!({"n": 1})).await?;
    store.update_last_event("a", &json!({"n": 2})).await?;
    store.update_last_event("a", &json!({"n": 3})).await?;
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 3);

    store.clear_alert("a").await?;

    assert_eq!(store.get_failing_alert_counts().await?.total_events, 0);
    Ok(())
}

#[tokio::test]
async fn test_clear_unknown_alert_is_noop() -> Result<()> {
    let store = setup_store();
    seed(&store, "a", 1).await?;

    store.clear_alert("never.seen").await?;

    assert_eq!(store.get_full_error_history().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_clear_all_empties_store() -> Result<()> {
    let store = setup_store();
    seed(&store, "a", 2).await?;
    seed(&store, "b", 1).await?;
    store.mark_alert_success("b").await?;

    store.clear_all().await?;

    assert!(store.get_failing_alerts().await?.is_empty());
    assert!(store.get_full_error_history().await?.is_empty());
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 0);
    for key in ["failingAlerts", "alertsWithErrors", "errorEvents", "errors:a", "errors:b"] {
        assert!(!store.backend().contains_key(key), "{} should be deleted", key);
    }
    Ok(())
}

#[tokio::test]
async fn test_clear_all_on_empty_store() -> Result<()> {
    let store = setup_store();

    store.clear_all().await?;

    assert!(store.get_full_error_history().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_clear_alert_aborts_partway() -> Result<()> {
    let store = setup_store();
    seed(&store, "a", 2).await?;

    // SREM alertsWithErrors succeeds, SREM failingAlerts fails
    store.backend().fail_command(Command::SetRemove, 1);
    let err = store.clear_alert("a").await.unwrap_err();

    assert!(err.is_partial());
    assert_eq!(err.completed_writes(), 1);
    assert_eq!(err.kind(), StoreErrorKind::Command);

    // Left partially cleared: unindexed, still failing, history and log intact
    assert!(store.get_full_error_history().await?.is_empty());
    assert!(store.is_alert_failing("a").await?);
    assert_eq!(store.backend().list_snapshot("errors:a").len(), 2);
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 2);

    // Retrying the whole operation completes it
    store.clear_alert("a").await?;
    assert!(!store.is_alert_failing("a").await?);
    assert!(!store.backend().contains_key("errors:a"));
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 0);
    Ok(())
}

#[tokio::test]
async fn test_clear_all_aborts_partway() -> Result<()> {
    let store = setup_store();
    seed(&store, "a", 1).await?;
    seed(&store, "b", 1).await?;

    // Both history DELs and the alertsWithErrors DEL succeed, failingAlerts DEL fails
    store.backend().fail_command(Command::Delete, 3);
    let err = store.clear_all().await.unwrap_err();

    assert!(err.is_partial());
    assert_eq!(err.completed_writes(), 3);

    // Histories and index gone, failing set and occurrence log survive
    assert!(store.get_full_error_history().await?.is_empty());
    assert!(!store.backend().contains_key("errors:a"));
    assert!(!store.backend().contains_key("errors:b"));
    assert_eq!(store.get_failing_alerts().await?.len(), 2);
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 2);

    store.clear_all().await?;
    assert!(store.get_failing_alerts().await?.is_empty());
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 0);
    Ok(())
}

#[tokio::test]
async fn test_mark_failure_partial_leaves_alert_indexed() -> Result<()> {
    let store = setup_store();

    store.backend().fail_command(Command::SetAdd, 1);
    let err = store.mark_alert_failure("a").await.unwrap_err();

    assert!(err.is_partial());
    assert!(!store.is_alert_failing("a").await?);
    assert!(store
        .backend()
        .set_snapshot("alertsWithErrors")
        .contains("a"));
    Ok(())
}

#[tokio::test]
async fn test_first_write_failure_is_not_partial() -> Result<()> {
    let store = setup_store();

    store.backend().fail_command(Command::SetAdd, 0);
    let err = store.mark_alert_failure("a").await.unwrap_err();

    assert!(matches!(err, StoreError::Command { command: "SADD", .. }));
    assert!(store.get_full_error_history().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_add_event_unlogged_on_log_failure() -> Result<()> {
    let store = setup_store();

    // History LPUSH succeeds, occurrence-log LPUSH fails
    store.backend().fail_command(Command::ListPushFront, 1);
    let err = store.add_event("a", &json!({"msg": "x"})).await.unwrap_err();

    assert!(err.is_partial());
    assert_eq!(err.completed_writes(), 2);
    assert_eq!(store.get_last_event("a").await?, Some(json!({"msg": "x"})));
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 0);
    Ok(())
}

#[tokio::test]
async fn test_update_last_event_pop_without_replacement() -> Result<()> {
    let store = setup_store();
    store.add_event("a", &json!({"n": 1})).await?;
    store.add_event("a", &json!({"n": 2})).await?;

    store.backend().fail_command(Command::ListPushFront, 0);
    let err = store.update_last_event("a", &json!({"n": 3})).await.unwrap_err();

    assert!(err.is_partial());
    assert_eq!(store.get_last_event("a").await?, Some(json!({"n": 1})));
    Ok(())
}

#[tokio::test]
async fn test_connection_failure_before_any_write() -> Result<()> {
    let store = setup_store();
    store.backend().set_unavailable(true);

    let err = store.add_event("a", &json!({"n": 1})).await.unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Connection);
    assert!(!err.is_partial());

    store.backend().set_unavailable(false);
    assert_eq!(store.get_last_event("a").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_sessions_released_on_failure_paths() -> Result<()> {
    let store = setup_store();
    seed(&store, "a", 1).await?;

    store.backend().fail_command(Command::ListRange, 0);
    assert!(store.get_full_error_history().await.is_err());
    store.backend().fail_command(Command::SetLen, 0);
    assert!(store.get_failing_alert_counts().await.is_err());
    store.backend().fail_command(Command::Delete, 0);
    assert!(store.clear_alert("a").await.is_err());

    assert_eq!(store.backend().open_sessions(), 0);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_events_for_same_alert() -> Result<()> {
    let store = Arc::new(setup_store());

    let mut handles = Vec::new();
    for worker in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for n in 0..10 {
                store.mark_alert_failure("shared").await?;
                store
                    .add_event("shared", &json!({"worker": worker, "n": n}))
                    .await?;
            }
            Ok::<_, StoreError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let history = store.get_full_error_history().await?;
    assert_eq!(history["shared"].len(), 80);
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 80);
    assert_eq!(store.backend().open_sessions(), 0);
    Ok(())
}

#[tokio::test]
async fn test_recorder_coalesces_against_store() -> Result<()> {
    let store: ErrorStore<InMemoryBackend, AlertError> = ErrorStore::new(InMemoryBackend::new());
    let recorder = ErrorRecorder::new(store);
    let t = |secs: i64| Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();

    assert_eq!(
        recorder.record_failure("cpu.high", "timeout", t(0)).await?,
        RecordOutcome::Appended
    );
    assert_eq!(
        recorder.record_failure("cpu.high", "timeout", t(60)).await?,
        RecordOutcome::Coalesced { count: 2 }
    );
    assert_eq!(
        recorder.record_failure("cpu.high", "refused", t(120)).await?,
        RecordOutcome::Appended
    );
    recorder.record_success("cpu.high").await?;

    let store = recorder.store();
    let history = store.get_full_error_history().await?;
    let events = &history["cpu.high"];
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].message, "refused");
    assert_eq!(events[1].message, "timeout");
    assert_eq!(events[1].count, 2);
    assert_eq!(events[1].last_time, t(60));

    assert!(!store.is_alert_failing("cpu.high").await?);
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 3);
    Ok(())
}

#[tokio::test]
async fn test_update_last_event_on_empty_history() -> Result<()> {
    let store = setup_store();

    store.update_last_event("x", &json!({"n": 1})).await?;

    let history = store.get_full_error_history().await?;
    assert_eq!(history["x"], vec![json!({"n": 1})]);
    assert_eq!(store.get_failing_alert_counts().await?.total_events, 1);
    Ok(())
}

#[tokio::test]
async fn test_clear_alert_after_clear_all() -> Result<()> {
    let store = setup_store();
    seed(&store, "a", 2).await?;

    store.clear_all().await?;
    store.add_event("a", &json!({"n": 9})).await?;
    store.clear_alert("a").await?;

    assert_eq!(store.get_failing_alert_counts().await?.total_events, 0);
    assert!(store.get_full_error_history().await?.is_empty());
    Ok(())
}
