//! Tool definition and error types.
//!
//! A tool is described to the model by name, description, and a JSON Schema
//! for its arguments. Execution failures are reported back to the model as
//! tool results rather than aborting the turn.

use serde::{Deserialize, Serialize};

/// Schema-level description of a tool, sent to the model with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema (object) describing the arguments.
    pub parameters: serde_json::Value,
}

/// Errors from executing a single tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The model asked for a tool the registry does not know.
    #[error("Error: {name} is not a valid tool, try one of [{available}].")]
    UnknownTool { name: String, available: String },

    /// Arguments did not match the tool's schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and its backing service failed.
    #[error("tool execution failed: {0}")]
    Execution(String),
}
