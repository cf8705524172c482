//! Shared domain types for AgriAid.
//!
//! Sessions, model request/response shapes, tool definitions, configuration,
//! and the error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod sms;
pub mod tool;
