//! Infrastructure adapters for AgriAid.
//!
//! Concrete implementations of the ports defined in `agriaid-core`:
//! an OpenAI-compatible chat-completions provider, the Africa's Talking
//! SMS gateway, the `send_message` tool built on it, and the TOML config
//! loader.

pub mod config;
pub mod llm;
pub mod sms;
pub mod tools;
