//! `send_message` -- lets the model text one or more phone numbers,
//! typically to contact an agro center on the user's behalf.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use agriaid_core::sms::SmsGateway;
use agriaid_core::tool::Tool;
use agriaid_types::tool::{ToolDefinition, ToolError};

#[derive(Debug, Deserialize)]
struct SendMessageArgs {
    recipients: Vec<String>,
    message: String,
}

pub struct SendMessageTool<G> {
    gateway: Arc<G>,
    definition: ToolDefinition,
}

impl<G: SmsGateway> SendMessageTool<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            definition: ToolDefinition {
                name: "send_message".to_string(),
                description: "Send an SMS to one or more phone numbers in international \
                              format, e.g. to contact an agro center for the user."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "recipients": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Phone numbers, e.g. [\"+254712345678\"]"
                        },
                        "message": {
                            "type": "string",
                            "description": "Text to send"
                        }
                    },
                    "required": ["recipients", "message"]
                }),
            },
        }
    }
}

impl<G: SmsGateway + 'static> Tool for SendMessageTool<G> {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: SendMessageArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let recipients: Vec<String> = args
            .recipients
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(ToolError::InvalidArguments(
                "at least one recipient is required".to_string(),
            ));
        }
        if args.message.trim().is_empty() {
            return Err(ToolError::InvalidArguments("message must not be empty".to_string()));
        }

        let report = self
            .gateway
            .send(&recipients, &args.message)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        Ok(json!({
            "summary": report.message,
            "recipients": report
                .recipients
                .iter()
                .map(|r| json!({"number": r.number, "status": r.status, "accepted": r.accepted()}))
                .collect::<Vec<_>>(),
        }))
    }
}
