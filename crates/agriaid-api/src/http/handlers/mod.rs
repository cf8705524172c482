//! HTTP request handlers.

pub mod sms;
