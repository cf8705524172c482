//! Session management: persistence, rate limiting, lifecycle, and
//! per-user serialization of inbound messages.

pub mod lifecycle;
pub mod lock;
pub mod rate_limit;
pub mod store;

pub use lifecycle::{EndReason, SessionLifecycle, Transition};
pub use lock::{UserLockGuard, UserLocks};
pub use rate_limit::RateLimiter;
pub use store::SessionStore;
