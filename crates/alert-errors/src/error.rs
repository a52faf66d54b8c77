//! Error types for alert error store operations
//!
//! Multi-step writes are not transactional. When a step fails after earlier
//! writes were applied, the failure is wrapped in [`StoreError::Partial`] so
//! callers can tell "nothing happened" from "partially applied, retry the
//! whole operation".

use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Acquiring or using a connection to the store failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store rejected or failed to execute a command
    #[error("{command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },

    /// Event record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A multi-step operation aborted after some writes were applied
    #[error("{operation} aborted after {completed} applied write(s): {source}")]
    Partial {
        operation: &'static str,
        completed: usize,
        #[source]
        source: Box<StoreError>,
    },
}

/// Root cause category of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Connection,
    Command,
    Serialization,
}

impl StoreErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::Connection => "connection",
            StoreErrorKind::Command => "command",
            StoreErrorKind::Serialization => "serialization",
        }
    }
}

impl StoreError {
    /// Create a Connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        StoreError::Connection(msg.into())
    }

    /// Create a Command error for the named store command
    pub fn command(command: &'static str, msg: impl Into<String>) -> Self {
        StoreError::Command {
            command,
            message: msg.into(),
        }
    }

    /// Classify a Redis client error
    ///
    /// Transport failures (I/O, refused, dropped, timed out) are connection
    /// errors; anything the server answered with is a command error.
    pub fn from_redis(command: &'static str, err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            StoreError::Connection(format!("{}: {}", command, err))
        } else {
            StoreError::command(command, err.to_string())
        }
    }

    /// Root cause category, looking through [`StoreError::Partial`]
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Connection(_) => StoreErrorKind::Connection,
            StoreError::Command { .. } => StoreErrorKind::Command,
            StoreError::Serialization(_) => StoreErrorKind::Serialization,
            StoreError::Partial { source, .. } => source.kind(),
        }
    }

    /// Whether earlier writes of the failed operation are still in effect
    pub fn is_partial(&self) -> bool {
        matches!(self, StoreError::Partial { .. })
    }

    /// Number of writes applied before the failure (0 unless partial)
    pub fn completed_writes(&self) -> usize {
        match self {
            StoreError::Partial { completed, .. } => *completed,
            _ => 0,
        }
    }
}

/// Convenience result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
