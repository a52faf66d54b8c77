//! Shared library for the alert error services
//!
//! This crate provides common functionality used by the store and its tools:
//! - Configuration management
//! - Error handling types
//! - Logging infrastructure
//! - Redis client setup

pub mod config;
pub mod error;
pub mod redis;

// Re-export commonly used types
pub use config::{Config, RedisConfig, StoreConfig};
pub use error::{Error, Result};

/// Initialize tracing subscriber for structured logging
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shared=debug,alert_errors=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
