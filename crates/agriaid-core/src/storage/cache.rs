//! TTL cache trait.
//!
//! The capability set mirrors a Redis-style cache: plain get, set with
//! expiry, atomic increment with expiry refresh, and prefix enumeration.
//! Uses RPITIT (native async fn in traits, Rust 2024 edition).

use std::time::Duration;

use agriaid_types::error::CacheError;

/// Key-value cache whose entries expire after a time-to-live.
pub trait TtlCache: Send + Sync {
    /// Get a value. Expired and missing keys both return `None`.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, CacheError>> + Send;

    /// Store a value, replacing any previous value and TTL (last write wins).
    fn set_with_ttl(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), CacheError>> + Send;

    /// Atomically add one to an integer value and reset its TTL.
    ///
    /// A missing or expired key counts from zero. Returns the new value.
    fn incr_with_ttl(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<i64, CacheError>> + Send;

    /// List live keys starting with `prefix`, in no particular order.
    fn keys_with_prefix(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, CacheError>> + Send;
}
