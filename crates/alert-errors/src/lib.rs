//! Alert error store
//!
//! Persists which alerts are currently failing and the error history of every
//! alert in Redis:
//! - Failing-state tracking (`failingAlerts`, `alertsWithErrors`)
//! - Per-alert event history, most recent first (`errors:{name}`)
//! - Global occurrence log used for volume counting (`errorEvents`)
//! - Clearing one alert or all alerts
//!
//! # Example
//!
//! ```rust,no_run
//! use alert_errors::{AlertError, ErrorDataAccess, ErrorStore, RedisBackend};
//! use chrono::Utc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = RedisBackend::connect("redis://localhost:6379").await?;
//! let store: ErrorStore<_, AlertError> = ErrorStore::new(backend);
//!
//! store.mark_alert_failure("cpu.high").await?;
//! store.add_event("cpu.high", &AlertError::new("timeout", Utc::now())).await?;
//!
//! let history = store.get_full_error_history().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
mod indexes;
pub mod instrument;
pub mod keys;
pub mod models;
pub mod recorder;
pub mod store;

// Re-export commonly used types
pub use backend::{Command, InMemoryBackend, RedisBackend, StoreBackend, StoreSession};
pub use error::{StoreError, StoreErrorKind, StoreResult};
pub use instrument::Operation;
pub use keys::StoreKeys;
pub use models::{AlertError, FailingAlertCounts};
pub use recorder::{ErrorRecorder, RecordOutcome};
pub use store::{ErrorDataAccess, ErrorStore};
