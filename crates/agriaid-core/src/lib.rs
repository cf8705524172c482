//! Business logic and port traits for AgriAid.
//!
//! This crate defines the "ports" (cache, LLM provider, tool, SMS gateway
//! traits) that the infrastructure layer implements, plus the session state
//! machine and the bounded tool-orchestration loop. It depends only on
//! `agriaid-types` -- never on `agriaid-infra` or any network crate.

pub mod agent;
pub mod clock;
pub mod llm;
pub mod message;
pub mod session;
pub mod sms;
pub mod storage;
pub mod tool;

#[cfg(test)]
pub(crate) mod testing;
