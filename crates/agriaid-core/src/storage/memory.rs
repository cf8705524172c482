//! In-process TTL cache backed by `DashMap`.
//!
//! Expiry is lazy: expired entries are invisible to reads and are removed
//! when touched or by `purge_expired`. Guards are never held across
//! `.await` (all operations are synchronous under the hood).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use agriaid_types::error::CacheError;

use super::cache::TtlCache;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Shared in-memory cache. Cloning produces a view of the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryTtlCache {
    inner: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryTtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.inner.len())
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn get_sync(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entry = self.inner.get(key)?;
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }
        // Read guard released above; removing under it would deadlock the shard.
        self.inner.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    fn incr_sync(&self, key: &str, ttl: Duration) -> Result<i64, CacheError> {
        let now = Instant::now();
        let mut entry = self.inner.entry(key.to_string()).or_insert_with(|| CacheEntry {
            value: "0".to_string(),
            expires_at: now,
        });

        let current = if entry.is_live(now) {
            entry
                .value
                .parse::<i64>()
                .map_err(|_| CacheError::NotAnInteger {
                    key: key.to_string(),
                })?
        } else {
            0
        };

        let next = current + 1;
        entry.value = next.to_string();
        entry.expires_at = expiry(now, ttl);
        Ok(next)
    }
}

impl TtlCache for MemoryTtlCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.get_sync(key))
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.inner.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: expiry(Instant::now(), ttl),
            },
        );
        Ok(())
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> Result<i64, CacheError> {
        self.incr_sync(key, ttl)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let now = Instant::now();
        Ok(self
            .inner
            .iter()
            .filter(|r| r.key().starts_with(prefix) && r.value().is_live(now))
            .map(|r| r.key().clone())
            .collect())
    }
}
