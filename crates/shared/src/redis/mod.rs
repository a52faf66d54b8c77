//! Redis client utilities
//!
//! `ConnectionManager` multiplexes commands over one connection and reconnects
//! transparently; clones are cheap handles onto the same connection.

use crate::error::Result;
use redis::{aio::ConnectionManager, Client};

/// Create a Redis client from configuration
///
/// Both an unparseable URL and a failed first connection surface as
/// [`Error::Redis`](crate::Error::Redis).
pub async fn create_client(url: &str) -> Result<ConnectionManager> {
    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;

    tracing::info!("Connected to Redis");

    Ok(manager)
}
