//! LlmProvider trait definition.

use agriaid_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// A chat-completion backend with tool calling.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Use
/// [`super::BoxLlmProvider`] where the concrete type must be erased.
pub trait LlmProvider: Send + Sync {
    /// Short provider name, used as the `gen_ai.system` span attribute.
    fn name(&self) -> &str;

    /// Send one completion request and wait for the whole response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
