//! HTTP layer: the SMS gateway callback and a health check.

pub mod handlers;
pub mod router;
