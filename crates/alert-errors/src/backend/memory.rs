//! In-memory store backend
//!
//! Mirrors the Redis semantics the store relies on (empty collections vanish,
//! wrong-type access fails) so store logic can be exercised without a server.
//! Fault injection and session accounting let tests drive the partial-failure
//! and connection-release paths.

use super::{Command, StoreBackend, StoreSession};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Entry {
    Set(HashSet<String>),
    List(VecDeque<Vec<u8>>),
}

#[derive(Debug)]
struct Fault {
    command: Command,
    skip: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, Entry>,
    faults: Vec<Fault>,
    unavailable: bool,
    open_sessions: usize,
    sessions_opened: usize,
    executed: Vec<Command>,
}

impl MemoryState {
    /// Consume a matching fault, if one is due
    fn take_fault(&mut self, command: Command) -> bool {
        let Some(pos) = self.faults.iter().position(|f| f.command == command) else {
            return false;
        };

        if self.faults[pos].skip == 0 {
            self.faults.remove(pos);
            true
        } else {
            self.faults[pos].skip -= 1;
            false
        }
    }

    fn set(&self, command: Command, key: &str) -> StoreResult<Option<&HashSet<String>>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Set(set)) => Ok(Some(set)),
            Some(Entry::List(_)) => Err(wrong_type(command)),
        }
    }

    fn list(&self, command: Command, key: &str) -> StoreResult<Option<&VecDeque<Vec<u8>>>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::List(list)) => Ok(Some(list)),
            Some(Entry::Set(_)) => Err(wrong_type(command)),
        }
    }

    fn list_mut(
        &mut self,
        command: Command,
        key: &str,
    ) -> StoreResult<Option<&mut VecDeque<Vec<u8>>>> {
        match self.entries.get_mut(key) {
            None => Ok(None),
            Some(Entry::List(list)) => Ok(Some(list)),
            Some(Entry::Set(_)) => Err(wrong_type(command)),
        }
    }

    /// Drop `key` if its collection became empty
    fn prune(&mut self, key: &str) {
        let empty = match self.entries.get(key) {
            Some(Entry::Set(set)) => set.is_empty(),
            Some(Entry::List(list)) => list.is_empty(),
            None => false,
        };
        if empty {
            self.entries.remove(key);
        }
    }
}

fn wrong_type(command: Command) -> StoreError {
    StoreError::command(
        command.as_str(),
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    )
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory store backend
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `skip + 1`-th upcoming execution of `command` with a command error
    pub fn fail_command(&self, command: Command, skip: usize) {
        lock(&self.state).faults.push(Fault { command, skip });
    }

    /// Make session acquisition fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    /// Sessions acquired and not yet released
    pub fn open_sessions(&self) -> usize {
        lock(&self.state).open_sessions
    }

    /// Sessions acquired since creation
    pub fn sessions_opened(&self) -> usize {
        lock(&self.state).sessions_opened
    }

    /// Commands executed successfully, in order
    pub fn executed_commands(&self) -> Vec<Command> {
        lock(&self.state).executed.clone()
    }

    /// Whether `key` currently exists
    pub fn contains_key(&self, key: &str) -> bool {
        lock(&self.state).entries.contains_key(key)
    }

    /// Snapshot of a list, head first (empty if missing or not a list)
    pub fn list_snapshot(&self, key: &str) -> Vec<Vec<u8>> {
        match lock(&self.state).entries.get(key) {
            Some(Entry::List(list)) => list.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Snapshot of a set (empty if missing or not a set)
    pub fn set_snapshot(&self, key: &str) -> HashSet<String> {
        match lock(&self.state).entries.get(key) {
            Some(Entry::Set(set)) => set.clone(),
            _ => HashSet::new(),
        }
    }
}

#[async_trait]
impl StoreBackend for InMemoryBackend {
    type Session = InMemorySession;

    async fn session(&self) -> StoreResult<InMemorySession> {
        let mut state = lock(&self.state);
        if state.unavailable {
            return Err(StoreError::connection("in-memory store unavailable"));
        }

        state.open_sessions += 1;
        state.sessions_opened += 1;

        Ok(InMemorySession {
            state: Arc::clone(&self.state),
        })
    }
}

/// Session on an [`InMemoryBackend`]; released on drop
pub struct InMemorySession {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemorySession {
    fn exec<T>(
        &self,
        command: Command,
        f: impl FnOnce(&mut MemoryState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut state = lock(&self.state);
        if state.take_fault(command) {
            return Err(StoreError::command(command.as_str(), "injected fault"));
        }

        let result = f(&mut *state)?;
        state.executed.push(command);
        Ok(result)
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.open_sessions = state.open_sessions.saturating_sub(1);
    }
}

#[async_trait]
impl StoreSession for InMemorySession {
    async fn set_add(&mut self, key: &str, member: &str) -> StoreResult<()> {
        self.exec(Command::SetAdd, |state| {
            state.set(Command::SetAdd, key)?;
            let entry = state
                .entries
                .entry(key.to_string())
                .or_insert_with(|| Entry::Set(HashSet::new()));
            if let Entry::Set(set) = entry {
                set.insert(member.to_string());
            }
            Ok(())
        })
    }

    async fn set_remove(&mut self, key: &str, member: &str) -> StoreResult<()> {
        self.exec(Command::SetRemove, |state| {
            state.set(Command::SetRemove, key)?;
            if let Some(Entry::Set(set)) = state.entries.get_mut(key) {
                set.remove(member);
            }
            state.prune(key);
            Ok(())
        })
    }

    async fn set_members(&mut self, key: &str) -> StoreResult<HashSet<String>> {
        self.exec(Command::SetMembers, |state| {
            Ok(state
                .set(Command::SetMembers, key)?
                .cloned()
                .unwrap_or_default())
        })
    }

    async fn set_contains(&mut self, key: &str, member: &str) -> StoreResult<bool> {
        self.exec(Command::SetContains, |state| {
            Ok(state
                .set(Command::SetContains, key)?
                .is_some_and(|set| set.contains(member)))
        })
    }

    async fn set_len(&mut self, key: &str) -> StoreResult<u64> {
        self.exec(Command::SetLen, |state| {
            Ok(state
                .set(Command::SetLen, key)?
                .map_or(0, |set| set.len() as u64))
        })
    }

    async fn list_push_front(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.exec(Command::ListPushFront, |state| {
            state.list(Command::ListPushFront, key)?;
            let entry = state
                .entries
                .entry(key.to_string())
                .or_insert_with(|| Entry::List(VecDeque::new()));
            if let Entry::List(list) = entry {
                list.push_front(value.to_vec());
            }
            Ok(())
        })
    }

    async fn list_pop_front(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.exec(Command::ListPopFront, |state| {
            let popped = state
                .list_mut(Command::ListPopFront, key)?
                .and_then(|list| list.pop_front());
            state.prune(key);
            Ok(popped)
        })
    }

    async fn list_first(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.exec(Command::ListFirst, |state| {
            Ok(state
                .list(Command::ListFirst, key)?
                .and_then(|list| list.front().cloned()))
        })
    }

    async fn list_all(&mut self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        self.exec(Command::ListRange, |state| {
            Ok(state
                .list(Command::ListRange, key)?
                .map(|list| list.iter().cloned().collect())
                .unwrap_or_default())
        })
    }

    async fn list_len(&mut self, key: &str) -> StoreResult<u64> {
        self.exec(Command::ListLen, |state| {
            Ok(state
                .list(Command::ListLen, key)?
                .map_or(0, |list| list.len() as u64))
        })
    }

    async fn list_remove_all(&mut self, key: &str, value: &[u8]) -> StoreResult<u64> {
        self.exec(Command::ListRemoveAll, |state| {
            let removed = match state.list_mut(Command::ListRemoveAll, key)? {
                Some(list) => {
                    let before = list.len();
                    list.retain(|item| item.as_slice() != value);
                    (before - list.len()) as u64
                }
                None => 0,
            };
            state.prune(key);
            Ok(removed)
        })
    }

    async fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.exec(Command::Delete, |state| {
            state.entries.remove(key);
            Ok(())
        })
    }
}
