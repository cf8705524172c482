//! LLM provider port.

pub mod box_provider;
pub mod provider;

pub use box_provider::{BoxLlmProvider, LlmProviderDyn};
pub use provider::LlmProvider;
