//! Session records in the TTL cache.
//!
//! Records live under `sms_session:{user}:{session_id}` as JSON and expire
//! after the configured session duration. Lookup of the active session scans
//! the user's prefix, so no separate index key is kept.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use agriaid_types::error::StoreError;
use agriaid_types::session::Session;

use crate::storage::TtlCache;

const SESSION_PREFIX: &str = "sms_session";

/// Reads and writes [`Session`] records through a [`TtlCache`].
pub struct SessionStore<C> {
    cache: Arc<C>,
}

impl<C> Clone for SessionStore<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C: TtlCache> SessionStore<C> {
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn session_key(user: &str, session_id: &Uuid) -> String {
        format!("{SESSION_PREFIX}:{user}:{session_id}")
    }

    fn user_prefix(user: &str) -> String {
        format!("{SESSION_PREFIX}:{user}:")
    }

    /// Find the user's active session, if any.
    ///
    /// Unreadable records are skipped with a warning. When several active
    /// records exist the most recently used one wins.
    pub async fn get_active(&self, user: &str) -> Result<Option<Session>, StoreError> {
        let keys = self.cache.keys_with_prefix(&Self::user_prefix(user)).await?;

        let mut active: Vec<Session> = Vec::new();
        for key in keys {
            let Some(raw) = self.cache.get(&key).await? else {
                continue;
            };
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) if session.is_active && session.user_identifier == user => {
                    active.push(session);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping unreadable session record");
                }
            }
        }

        if active.len() > 1 {
            tracing::warn!(
                user = %user,
                count = active.len(),
                "multiple active sessions found; using the most recent"
            );
        }

        Ok(active.into_iter().max_by_key(|s| s.last_activity))
    }

    /// Load one session record by id. A record that fails to parse is an error.
    pub async fn load(&self, user: &str, session_id: &Uuid) -> Result<Option<Session>, StoreError> {
        let key = Self::session_key(user, session_id);
        let Some(raw) = self.cache.get(&key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }

    /// Write the full record, resetting its TTL.
    pub async fn save(&self, session: &Session, ttl: Duration) -> Result<(), StoreError> {
        let key = Self::session_key(&session.user_identifier, &session.session_id);
        let json =
            serde_json::to_string(session).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.cache.set_with_ttl(&key, json, ttl).await?;
        tracing::debug!(
            key = %key,
            message_count = session.message_count,
            is_active = session.is_active,
            "session saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};

    use agriaid_types::session::Speaker;

    use super::*;
    use crate::storage::MemoryTtlCache;

    const HOUR: Duration = Duration::from_secs(3600);

    fn store() -> SessionStore<MemoryTtlCache> {
        SessionStore::new(Arc::new(MemoryTtlCache::new()))
    }

    #[tokio::test]
    async fn save_then_load_preserves_record() {
        let store = store();
        let now = Utc::now();
        let mut session = Session::new("+254711000111", now);
        session.message_count = 2;
        session.push(Speaker::Human, "How do I plant sukuma wiki?", now);
        session.push(Speaker::Assistant, "Space seedlings 45cm apart.", now);
        session.push(Speaker::Human, "And watering?", now + ChronoDuration::seconds(30));
        session.last_activity = now + ChronoDuration::seconds(30);

        store.save(&session, HOUR).await.unwrap();
        let loaded = store
            .load("+254711000111", &session.session_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded, session);
        assert_eq!(loaded.messages.len(), 3);
    }

    #[tokio::test]
    async fn get_active_ignores_inactive_records() {
        let store = store();
        let mut ended = Session::new("u1", Utc::now());
        ended.is_active = false;
        store.save(&ended, HOUR).await.unwrap();

        assert!(store.get_active("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_active_is_scoped_to_user() {
        let store = store();
        store.save(&Session::new("+2547001", Utc::now()), HOUR).await.unwrap();

        // "+254700" is a prefix of "+2547001" but must not match it.
        assert!(store.get_active("+254700").await.unwrap().is_none());
        assert!(store.get_active("+2547001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_active_prefers_most_recent_activity() {
        let store = store();
        let now = Utc::now();
        let older = Session::new("u1", now);
        let mut newer = Session::new("u1", now);
        newer.last_activity = now + ChronoDuration::minutes(5);
        store.save(&older, HOUR).await.unwrap();
        store.save(&newer, HOUR).await.unwrap();

        let active = store.get_active("u1").await.unwrap().unwrap();
        assert_eq!(active.session_id, newer.session_id);
    }

    #[tokio::test]
    async fn get_active_skips_corrupt_record() {
        let store = store();
        store
            .cache()
            .set_with_ttl("sms_session:u1:garbage", "{not json".into(), HOUR)
            .await
            .unwrap();
        let good = Session::new("u1", Utc::now());
        store.save(&good, HOUR).await.unwrap();

        let active = store.get_active("u1").await.unwrap().unwrap();
        assert_eq!(active.session_id, good.session_id);
    }

    #[tokio::test]
    async fn load_corrupt_record_is_error() {
        let store = store();
        let id = Uuid::now_v7();
        store
            .cache()
            .set_with_ttl(&SessionStore::<MemoryTtlCache>::session_key("u1", &id), "[]".into(), HOUR)
            .await
            .unwrap();

        let err = store.load("u1", &id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn records_expire_with_ttl() {
        let store = store();
        let session = Session::new("u1", Utc::now());
        store.save(&session, Duration::from_secs(10)).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;

        assert!(store.get_active("u1").await.unwrap().is_none());
        assert!(store.load("u1", &session.session_id).await.unwrap().is_none());
    }
}
