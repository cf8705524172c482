//! Test doubles shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use agriaid_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ModelResponse, ToolCall, Usage,
};
use agriaid_types::tool::{ToolDefinition, ToolError};

use crate::llm::LlmProvider;
use crate::tool::Tool;

pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

pub fn answer(text: &str) -> ModelResponse {
    ModelResponse::FinalAnswer {
        text: text.to_string(),
    }
}

pub fn requests(text: &str, calls: Vec<ToolCall>) -> ModelResponse {
    ModelResponse::ToolRequests {
        text: text.to_string(),
        calls,
    }
}

#[derive(Clone)]
pub enum Step {
    Reply(ModelResponse),
    Fail(String),
}

/// Handles for observing a [`ScriptedProvider`] after it has been boxed.
#[derive(Clone, Default)]
pub struct ProviderProbe {
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ProviderProbe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Replays scripted steps in order; `repeat` answers once the script is empty.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    repeat: Option<Step>,
    delay: Option<Duration>,
    probe: ProviderProbe,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            repeat: None,
            delay: None,
            probe: ProviderProbe::default(),
        }
    }

    pub fn replies(responses: Vec<ModelResponse>) -> Self {
        Self::new(responses.into_iter().map(Step::Reply).collect())
    }

    pub fn always(response: ModelResponse) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.repeat = Some(Step::Reply(response));
        provider
    }

    pub fn failing(message: &str) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.repeat = Some(Step::Fail(message.to_string()));
        provider
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn probe(&self) -> ProviderProbe {
        self.probe.clone()
    }

    fn next_step(&self) -> Step {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
            .unwrap_or_else(|| Step::Fail("script exhausted".to_string()))
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let n = self.probe.calls.fetch_add(1, Ordering::SeqCst);
        self.probe.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.next_step() {
            Step::Reply(output) => Ok(CompletionResponse {
                id: format!("resp-{n}"),
                model: request.model.clone(),
                output,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            }),
            Step::Fail(message) => Err(LlmError::Provider { message }),
        }
    }
}

fn definition(name: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: format!("test tool {name}"),
        parameters: json!({"type": "object", "properties": {}}),
    }
}

/// Returns its arguments unchanged.
pub struct EchoTool {
    definition: ToolDefinition,
}

impl EchoTool {
    pub fn new(name: &str) -> Self {
        Self {
            definition: definition(name),
        }
    }
}

impl Tool for EchoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        Ok(arguments)
    }
}

/// Appends its name to a shared log and returns `"done"`.
pub struct RecordingTool {
    definition: ToolDefinition,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingTool {
    pub fn new(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            definition: definition(name),
            log,
        }
    }
}

impl Tool for RecordingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, _arguments: Value) -> Result<Value, ToolError> {
        self.log.lock().unwrap().push(self.definition.name.clone());
        Ok(Value::String("done".to_string()))
    }
}

/// Always fails as if its backing service were down.
pub struct FailingTool {
    definition: ToolDefinition,
}

impl FailingTool {
    pub fn new(name: &str) -> Self {
        Self {
            definition: definition(name),
        }
    }
}

impl Tool for FailingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, _arguments: Value) -> Result<Value, ToolError> {
        Err(ToolError::Execution("service unavailable".to_string()))
    }
}
