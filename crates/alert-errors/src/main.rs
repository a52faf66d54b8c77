//! Alert error store operator tool
//!
//! Inspects and clears alert failure state and error history.
//!
//! ## Configuration
//!
//! - `REDIS_URL` or `REDIS_HOST` / `REDIS_PORT` / `REDIS_PASSWORD`
//! - `ALERT_ERRORS_NAMESPACE`: optional key prefix
//! - `RUST_LOG`: log filter (logs go to stderr)

mod cli;

use alert_errors::{AlertError, ErrorStore, RedisBackend, StoreKeys};
use anyhow::{Context, Result};
use shared::Config;

use crate::cli::{run, CliCommand};

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing();

    let command = CliCommand::parse(std::env::args().skip(1))?;

    let config = Config::from_env().context("Failed to load configuration")?;

    let backend = RedisBackend::connect(&config.redis.connection_url())
        .await
        .context("Failed to connect to Redis")?;

    let keys = StoreKeys::from_namespace(config.store.namespace.as_deref());
    tracing::debug!(keys = ?keys, command = ?command, "Running command");

    let store: ErrorStore<RedisBackend, AlertError> = ErrorStore::with_keys(backend, keys);

    let output = run(&store, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
