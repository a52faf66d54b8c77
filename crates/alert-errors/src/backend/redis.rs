//! Redis-backed store sessions
//!
//! Each session is a clone of a shared `ConnectionManager`. Commands in a
//! session are sent one by one, without MULTI or pipelining.

use super::{Command, StoreBackend, StoreSession};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashSet;

/// Redis store backend
#[derive(Clone)]
pub struct RedisBackend {
    redis: ConnectionManager,
}

impl RedisBackend {
    /// Create a backend on an existing connection manager
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Connect to the Redis server at `url`
    pub async fn connect(url: &str) -> shared::Result<Self> {
        shared::redis::create_client(url).await.map(Self::new)
    }
}

#[async_trait]
impl StoreBackend for RedisBackend {
    type Session = RedisSession;

    async fn session(&self) -> StoreResult<RedisSession> {
        Ok(RedisSession {
            conn: self.redis.clone(),
        })
    }
}

/// One store operation's handle on Redis
pub struct RedisSession {
    conn: ConnectionManager,
}

fn redis_err(command: Command) -> impl FnOnce(redis::RedisError) -> StoreError {
    move |e| StoreError::from_redis(command.as_str(), e)
}

#[async_trait]
impl StoreSession for RedisSession {
    async fn set_add(&mut self, key: &str, member: &str) -> StoreResult<()> {
        self.conn
            .sadd::<_, _, ()>(key, member)
            .await
            .map_err(redis_err(Command::SetAdd))
    }

    async fn set_remove(&mut self, key: &str, member: &str) -> StoreResult<()> {
        self.conn
            .srem::<_, _, ()>(key, member)
            .await
            .map_err(redis_err(Command::SetRemove))
    }

    async fn set_members(&mut self, key: &str) -> StoreResult<HashSet<String>> {
        self.conn
            .smembers::<_, HashSet<String>>(key)
            .await
            .map_err(redis_err(Command::SetMembers))
    }

    async fn set_contains(&mut self, key: &str, member: &str) -> StoreResult<bool> {
        self.conn
            .sismember::<_, _, bool>(key, member)
            .await
            .map_err(redis_err(Command::SetContains))
    }

    async fn set_len(&mut self, key: &str) -> StoreResult<u64> {
        self.conn
            .scard::<_, u64>(key)
            .await
            .map_err(redis_err(Command::SetLen))
    }

    async fn list_push_front(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.conn
            .lpush::<_, _, ()>(key, value)
            .await
            .map_err(redis_err(Command::ListPushFront))
    }

    async fn list_pop_front(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.conn
            .lpop::<_, Option<Vec<u8>>>(key, None)
            .await
            .map_err(redis_err(Command::ListPopFront))
    }

    async fn list_first(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.conn
            .lindex::<_, Option<Vec<u8>>>(key, 0)
            .await
            .map_err(redis_err(Command::ListFirst))
    }

    async fn list_all(&mut self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        self.conn
            .lrange::<_, Vec<Vec<u8>>>(key, 0, -1)
            .await
            .map_err(redis_err(Command::ListRange))
    }

    async fn list_len(&mut self, key: &str) -> StoreResult<u64> {
        self.conn
            .llen::<_, u64>(key)
            .await
            .map_err(redis_err(Command::ListLen))
    }

    async fn list_remove_all(&mut self, key: &str, value: &[u8]) -> StoreResult<u64> {
        // count = 0 removes every match
        self.conn
            .lrem::<_, _, u64>(key, 0, value)
            .await
            .map_err(redis_err(Command::ListRemoveAll))
    }

    async fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.conn
            .del::<_, ()>(key)
            .await
            .map_err(redis_err(Command::Delete))
    }
}
