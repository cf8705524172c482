//! Daily session quota and post-activity cooldown.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use agriaid_types::config::SessionConfig;
use agriaid_types::error::StoreError;
use agriaid_types::session::RateLimitDecision;

use super::store::SessionStore;
use crate::storage::TtlCache;

const QUOTA_PREFIX: &str = "user_sessions";
const QUOTA_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Decides whether a user may open a new session.
pub struct RateLimiter<C> {
    cache: Arc<C>,
    store: SessionStore<C>,
}

impl<C> Clone for RateLimiter<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            store: self.store.clone(),
        }
    }
}

impl<C: TtlCache> RateLimiter<C> {
    pub fn new(cache: Arc<C>) -> Self {
        let store = SessionStore::new(Arc::clone(&cache));
        Self { cache, store }
    }

    /// Counter key for `user` on `date`, e.g. `user_sessions:+2547..:2026-10-18`.
    pub fn quota_key(user: &str, date: NaiveDate) -> String {
        format!("{QUOTA_PREFIX}:{user}:{}", date.format("%Y-%m-%d"))
    }

    /// Sessions `user` has started on the calendar day of `now`.
    pub async fn sessions_today(&self, user: &str, now: DateTime<Utc>) -> Result<u32, StoreError> {
        let key = Self::quota_key(user, now.date_naive());
        let count = match self.cache.get(&key).await? {
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!(key = %key, value = %raw, "unreadable quota counter; treating as zero");
                0
            }),
            None => 0,
        };
        Ok(count)
    }

    /// Quota first, then cooldown against any active session.
    pub async fn check(
        &self,
        user: &str,
        config: &SessionConfig,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, StoreError> {
        let used = self.sessions_today(user, now).await?;
        if used >= config.max_sessions_per_day {
            tracing::info!(user = %user, used, "daily session quota exhausted");
            return Ok(RateLimitDecision::deny(format!(
                "Daily limit reached. You can have {} sessions per day. Try again tomorrow.",
                config.max_sessions_per_day
            )));
        }

        if let Some(active) = self.store.get_active(user).await? {
            if active.idle(now) < config.session_timeout() {
                tracing::info!(user = %user, session_id = %active.session_id, "session start within cooldown");
                return Ok(RateLimitDecision::deny(format!(
                    "Please wait {} minutes before starting a new session.",
                    config.session_timeout_minutes
                )));
            }
        }

        Ok(RateLimitDecision::allow())
    }

    /// Count one session start against today's quota. Returns the new total.
    pub async fn charge_quota(&self, user: &str, now: DateTime<Utc>) -> Result<i64, StoreError> {
        let key = Self::quota_key(user, now.date_naive());
        let total = self.cache.incr_with_ttl(&key, QUOTA_TTL).await?;
        tracing::debug!(user = %user, total, "session quota charged");
        Ok(total)
    }
}
