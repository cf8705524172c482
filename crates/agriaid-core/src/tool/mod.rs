//! Tool port and registry.
//!
//! A tool is a named external capability the model can ask for. Each one
//! publishes a [`ToolDefinition`] (name, description, JSON schema for its
//! arguments) and an async `invoke`.

pub mod registry;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use agriaid_types::tool::{ToolDefinition, ToolError};

pub use registry::ToolRegistry;

pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    /// Run the tool. May have external side effects; callers invoke each
    /// requested call at most once.
    fn invoke(&self, arguments: Value)
    -> impl Future<Output = Result<Value, ToolError>> + Send;
}

/// Object-safe version of [`Tool`].
pub trait ToolDyn: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn invoke_boxed(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>>;
}

impl<T: Tool> ToolDyn for T {
    fn definition(&self) -> &ToolDefinition {
        Tool::definition(self)
    }

    fn invoke_boxed(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(self.invoke(arguments))
    }
}

pub struct BoxTool {
    inner: Box<dyn ToolDyn>,
}

impl BoxTool {
    pub fn new<T: Tool + 'static>(tool: T) -> Self {
        Self {
            inner: Box::new(tool),
        }
    }

    pub fn definition(&self) -> &ToolDefinition {
        self.inner.definition()
    }

    pub fn name(&self) -> &str {
        &self.inner.definition().name
    }

    pub async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        self.inner.invoke_boxed(arguments).await
    }
}
