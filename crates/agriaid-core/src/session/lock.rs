//! Per-user async locks.
//!
//! Two messages from the same phone number are handled one after the
//! other; messages from different numbers never wait on each other.
//! Entries are dropped from the map once no one holds or awaits them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user`'s session state.
    pub async fn acquire(&self, user: &str) -> UserLockGuard {
        let mutex = self
            .inner
            .entry(user.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // The map guard is gone before we await.
        let guard = mutex.lock_owned().await;
        UserLockGuard {
            guard: Some(guard),
            user: user.to_string(),
            locks: Arc::clone(&self.inner),
        }
    }

    /// Users with a live lock entry.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Held for the duration of one inbound message.
#[derive(Debug)]
pub struct UserLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    user: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        // Release the mutex first so the map holds the last reference when idle.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.user, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
