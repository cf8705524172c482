//! OpenAiCompatibleProvider -- [`LlmProvider`] for any `/chat/completions`
//! endpoint that speaks the OpenAI tool-calling protocol.
//!
//! The API key is a [`SecretString`] and is only exposed when building the
//! `Authorization` header.

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use agriaid_core::llm::LlmProvider;
use agriaid_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, ModelResponse,
    ToolCall, Usage,
};

use self::types::{
    ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall, function_kind,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

// No Debug: keeps the client and key out of logs entirely.

impl OpenAiCompatibleProvider {
    pub fn new(api_key: SecretString, base_url: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_chat_request(request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: MessageRole::System.to_string(),
                content: Some(system.clone()),
                tool_calls: Vec::new(),
                tool_call_id: None,
            });
        }
        messages.extend(request.messages.iter().map(to_chat_message));

        let tools = request
            .tools
            .iter()
            .map(|def| ChatTool {
                kind: function_kind(),
                function: ChatFunction {
                    name: def.name.clone(),
                    description: def.description.clone(),
                    parameters: def.parameters.clone(),
                },
            })
            .collect();

        ChatRequest {
            model: request.model.clone(),
            messages,
            tools,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn from_chat_response(response: ChatResponse) -> Result<CompletionResponse, LlmError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Deserialization("response contained no choices".into()))?;

        let calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                arguments: parse_arguments(&call.function.name, &call.function.arguments),
                id: call.id,
                name: call.function.name,
            })
            .collect();

        let usage = response.usage.unwrap_or_default();
        Ok(CompletionResponse {
            id: response.id,
            model: response.model,
            output: ModelResponse::from_parts(choice.message.content.unwrap_or_default(), calls),
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

fn to_chat_message(message: &Message) -> ChatMessage {
    let content = if message.content.is_empty() && !message.tool_calls.is_empty() {
        None
    } else {
        Some(message.content.clone())
    };

    ChatMessage {
        role: message.role.to_string(),
        content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| ChatToolCall {
                id: call.id.clone(),
                kind: function_kind(),
                function: ChatFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

/// Decode the JSON-string arguments of a tool call.
///
/// Malformed JSON is passed through as a string so the tool can reject it
/// and the model sees why.
fn parse_arguments(tool: &str, raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(tool = %tool, error = %e, "model sent malformed tool arguments");
        serde_json::Value::String(raw.to_string())
    })
}

/// Map a non-success HTTP status to an [`LlmError`].
fn map_status(status: u16, body: String, retry_after: Option<&str>) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|secs| (secs * 1000.0) as u64),
        },
        400 | 404 | 422 => LlmError::InvalidRequest(body),
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_chat_request(request);
        let url = self.url("/chat/completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), error_body, retry_after.as_deref()));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        tracing::debug!(
            finish_reason = ?chat.choices.first().and_then(|c| c.finish_reason.as_deref()),
            "chat completion received"
        );
        Self::from_chat_response(chat)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use agriaid_types::tool::ToolDefinition;

    use super::*;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(
            SecretString::from("sk-test-not-real"),
            "https://api.openai.com/v1/",
        )
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![
                Message::user("Is Nakuru a county?"),
                Message::assistant_tool_calls(
                    "",
                    vec![ToolCall {
                        id: "call_1".into(),
                        name: "get_counties".into(),
                        arguments: json!({"name": "Nakuru"}),
                    }],
                ),
                Message::tool_result("call_1", r#"["Nakuru"]"#),
            ],
            system: Some("You are AgriAid.".into()),
            tools: vec![ToolDefinition {
                name: "get_counties".into(),
                description: "List counties".into(),
                parameters: json!({"type": "object"}),
            }],
            max_tokens: 256,
            temperature: Some(0.1),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(
            provider().url("/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(provider().name(), "openai");
    }

    #[test]
    fn request_puts_system_first_and_encodes_tools() {
        let chat = OpenAiCompatibleProvider::to_chat_request(&request());
        let value = serde_json::to_value(&chat).unwrap();

        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "You are AgriAid.");
        assert_eq!(value["messages"][1]["role"], "user");

        let assistant = &value["messages"][2];
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["type"], "function");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            r#"{"name":"Nakuru"}"#
        );

        let tool = &value["messages"][3];
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_1");

        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "get_counties");
        assert_eq!(value["temperature"], 0.1);
    }

    #[test]
    fn tools_omitted_when_registry_empty() {
        let mut req = request();
        req.tools.clear();
        let value = serde_json::to_value(OpenAiCompatibleProvider::to_chat_request(&req)).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn response_with_tool_calls_becomes_tool_requests() {
        let raw = json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "get_wards", "arguments": "{\"subcounty\":\"Njoro\"}"}
                    }]
                }
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138}
        });
        let chat: ChatResponse = serde_json::from_value(raw).unwrap();
        let response = OpenAiCompatibleProvider::from_chat_response(chat).unwrap();

        match response.output {
            ModelResponse::ToolRequests { text, calls } => {
                assert!(text.is_empty());
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].id, "call_9");
                assert_eq!(calls[0].arguments, json!({"subcounty": "Njoro"}));
            }
            other => panic!("expected tool requests, got {other:?}"),
        }
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.output_tokens, 18);
    }

    #[test]
    fn plain_response_becomes_final_answer() {
        let raw = json!({
            "id": "chatcmpl-2",
            "model": "gpt-4o",
            "choices": [{"message": {"role": "assistant", "content": "Plant after the first rains."}}]
        });
        let chat: ChatResponse = serde_json::from_value(raw).unwrap();
        let response = OpenAiCompatibleProvider::from_chat_response(chat).unwrap();
        assert_eq!(
            response.output,
            ModelResponse::FinalAnswer {
                text: "Plant after the first rains.".into()
            }
        );
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn empty_choices_is_deserialization_error() {
        let chat: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        let err = OpenAiCompatibleProvider::from_chat_response(chat).unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[test]
    fn malformed_arguments_pass_through_as_string() {
        assert_eq!(
            parse_arguments("get_soil", "{lat: 1"),
            serde_json::Value::String("{lat: 1".into())
        );
        assert_eq!(parse_arguments("get_soil", ""), json!({}));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(map_status(401, String::new(), None), LlmError::AuthenticationFailed));
        assert!(matches!(
            map_status(429, String::new(), Some("2")),
            LlmError::RateLimited {
                retry_after_ms: Some(2000)
            }
        ));
        assert!(matches!(map_status(400, "bad".into(), None), LlmError::InvalidRequest(_)));
        assert!(matches!(map_status(503, String::new(), None), LlmError::Overloaded(_)));
        assert!(matches!(map_status(500, String::new(), None), LlmError::Provider { .. }));
    }
}
