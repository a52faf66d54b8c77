//! Storage backends for the alert error store
//!
//! The store only needs a handful of set and list primitives. A backend hands
//! out one [`StoreSession`] per store operation; the session is released when
//! it is dropped, on every exit path.
//!
//! - [`RedisBackend`] - production, shared networked store
//! - [`InMemoryBackend`] - tests and local tooling, same command semantics

pub mod memory;
pub mod redis;

pub use self::memory::{InMemoryBackend, InMemorySession};
pub use self::redis::{RedisBackend, RedisSession};

use crate::error::StoreResult;
use async_trait::async_trait;
use std::collections::HashSet;

/// Primitive store commands used by the alert error store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SetAdd,
    SetRemove,
    SetMembers,
    SetContains,
    SetLen,
    ListPushFront,
    ListPopFront,
    ListFirst,
    ListRange,
    ListLen,
    ListRemoveAll,
    Delete,
}

impl Command {
    /// Redis command name
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::SetAdd => "SADD",
            Command::SetRemove => "SREM",
            Command::SetMembers => "SMEMBERS",
            Command::SetContains => "SISMEMBER",
            Command::SetLen => "SCARD",
            Command::ListPushFront => "LPUSH",
            Command::ListPopFront => "LPOP",
            Command::ListFirst => "LINDEX",
            Command::ListRange => "LRANGE",
            Command::ListLen => "LLEN",
            Command::ListRemoveAll => "LREM",
            Command::Delete => "DEL",
        }
    }
}

/// Hands out scoped sessions on the backing store
#[async_trait]
pub trait StoreBackend: Send + Sync {
    type Session: StoreSession;

    /// Acquire a session for the duration of one store operation
    async fn session(&self) -> StoreResult<Self::Session>;
}

/// Set and list primitives with Redis semantics
///
/// Empty sets and lists do not exist: removing the last element removes the
/// key, and reading a missing key yields an empty result.
#[async_trait]
pub trait StoreSession: Send {
    async fn set_add(&mut self, key: &str, member: &str) -> StoreResult<()>;

    async fn set_remove(&mut self, key: &str, member: &str) -> StoreResult<()>;

    async fn set_members(&mut self, key: &str) -> StoreResult<HashSet<String>>;

    async fn set_contains(&mut self, key: &str, member: &str) -> StoreResult<bool>;

    async fn set_len(&mut self, key: &str) -> StoreResult<u64>;

    async fn list_push_front(&mut self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove and return the head of the list
    async fn list_pop_front(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Head of the list without removing it
    async fn list_first(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Every element, head first
    async fn list_all(&mut self, key: &str) -> StoreResult<Vec<Vec<u8>>>;

    async fn list_len(&mut self, key: &str) -> StoreResult<u64>;

    /// Remove every element equal to `value`; returns how many were removed
    async fn list_remove_all(&mut self, key: &str, value: &[u8]) -> StoreResult<u64>;

    async fn delete(&mut self, key: &str) -> StoreResult<()>;
}
