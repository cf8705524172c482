//! Bounded agent/tools loop.
//!
//! Each round sends the conversation to the model. A final answer ends the
//! loop; tool requests are executed in the order given, their results are
//! appended as tool messages, and the next round begins. The loop stops
//! after `max_rounds` model calls no matter what the model asks for.

use serde_json::Value;
use tracing::{Instrument, debug, info_span, warn};

use agriaid_types::config::AgentConfig;
use agriaid_types::llm::{CompletionRequest, LlmError, Message, ModelResponse, ToolCall, Usage};
use agriaid_types::tool::ToolError;

use crate::llm::BoxLlmProvider;
use crate::tool::ToolRegistry;

/// Reply used when the round cap is hit before the model produced any text.
pub const ROUND_CAP_FALLBACK: &str = "Sorry, I couldn't finish working on that. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model returned a final answer.
    Answered,
    /// The model was still requesting tools when the cap was reached.
    RoundCapReached,
}

#[derive(Debug, Clone)]
pub struct OrchestratorResult {
    pub final_text: String,
    /// Model calls made.
    pub rounds: u32,
    /// Tool calls executed, successful or not.
    pub tool_calls: u32,
    pub outcome: LoopOutcome,
    pub usage: Usage,
}

#[derive(Debug, Clone)]
pub struct ToolOrchestrator {
    max_rounds: u32,
    model: String,
    max_tokens: u32,
    temperature: Option<f64>,
}

impl ToolOrchestrator {
    /// `max_rounds` below one is raised to one.
    pub fn new(model: impl Into<String>, max_rounds: u32) -> Self {
        Self {
            max_rounds: max_rounds.max(1),
            model: model.into(),
            max_tokens: 1024,
            temperature: None,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: Some(config.temperature),
            ..Self::new(config.model.clone(), config.max_tool_rounds)
        }
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Run the loop over `conversation` and return the reply text.
    ///
    /// Tool failures (including unknown tool names) become tool-result
    /// messages and never abort the round. Only a model call failure is
    /// returned as an error.
    pub async fn invoke(
        &self,
        provider: &BoxLlmProvider,
        tools: &ToolRegistry,
        mut conversation: Vec<Message>,
        system_prompt: &str,
    ) -> Result<OrchestratorResult, OrchestratorError> {
        let definitions = tools.definitions();
        let mut usage = Usage::default();
        let mut tool_calls = 0u32;
        let mut last_text: Option<String> = None;

        for round in 1..=self.max_rounds {
            let request = CompletionRequest {
                model: self.model.clone(),
                messages: conversation.clone(),
                system: Some(system_prompt.to_string()),
                tools: definitions.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            let span = info_span!(
                "gen_ai.complete",
                gen_ai.system = provider.name(),
                gen_ai.request.model = %request.model,
                gen_ai.request.max_tokens = request.max_tokens,
                gen_ai.request.temperature = ?request.temperature,
                agent.round = round,
            );
            let response = provider.complete(&request).instrument(span).await?;
            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;

            match response.output {
                ModelResponse::FinalAnswer { text } => {
                    debug!(round, tool_calls, "model returned final answer");
                    return Ok(OrchestratorResult {
                        final_text: text,
                        rounds: round,
                        tool_calls,
                        outcome: LoopOutcome::Answered,
                        usage,
                    });
                }
                ModelResponse::ToolRequests { text, calls } => {
                    debug!(round, requested = calls.len(), "model requested tools");
                    if !text.trim().is_empty() {
                        last_text = Some(text.clone());
                    }
                    conversation.push(Message::assistant_tool_calls(text, calls.clone()));
                    for call in &calls {
                        let content = Self::run_tool(tools, call).await;
                        conversation.push(Message::tool_result(call.id.clone(), content));
                        tool_calls += 1;
                    }
                }
            }
        }

        warn!(
            max_rounds = self.max_rounds,
            tool_calls, "round cap reached while model was still requesting tools"
        );
        Ok(OrchestratorResult {
            final_text: last_text.unwrap_or_else(|| ROUND_CAP_FALLBACK.to_string()),
            rounds: self.max_rounds,
            tool_calls,
            outcome: LoopOutcome::RoundCapReached,
            usage,
        })
    }

    /// Execute one call and render its outcome as tool-message content.
    async fn run_tool(tools: &ToolRegistry, call: &ToolCall) -> String {
        let span = info_span!("tool.invoke", tool.name = %call.name, tool.call_id = %call.id);
        async {
            let result = match tools.resolve(&call.name) {
                Ok(tool) => tool.invoke(call.arguments.clone()).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(Value::String(s)) => s,
                Ok(value) => value.to_string(),
                Err(e @ ToolError::UnknownTool { .. }) => {
                    warn!("model requested an unknown tool");
                    e.to_string()
                }
                Err(e) => {
                    warn!(error = %e, "tool call failed");
                    format!("Error: {e}")
                }
            }
        }
        .instrument(span)
        .await
    }
}
