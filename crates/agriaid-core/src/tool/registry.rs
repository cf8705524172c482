//! Name-to-tool mapping handed to the orchestrator.

use std::collections::BTreeMap;

use agriaid_types::tool::{ToolDefinition, ToolError};

use super::{BoxTool, Tool};

/// Registered tools, ordered by name so the definitions sent to the model
/// are stable between requests.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, BoxTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A tool with the same name is replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        let boxed = BoxTool::new(tool);
        let name = boxed.name().to_string();
        if self.tools.insert(name.clone(), boxed).is_some() {
            tracing::warn!(tool = %name, "replacing previously registered tool");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&BoxTool> {
        self.tools.get(name)
    }

    /// Look up `name`, producing the model-facing error when it is absent.
    pub fn resolve(&self, name: &str) -> Result<&BoxTool, ToolError> {
        self.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
            available: self.available_names(),
        })
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition().clone()).collect()
    }

    /// Comma-separated tool names, as quoted in unknown-tool errors.
    pub fn available_names(&self) -> String {
        self.tools
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::EchoTool;

    #[tokio::test]
    async fn register_and_invoke() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("get_counties"));

        let tool = registry.get("get_counties").unwrap();
        let out = tool.invoke(json!({"q": "Nakuru"})).await.unwrap();
        assert_eq!(out, json!({"q": "Nakuru"}));
    }

    #[test]
    fn definitions_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry
            .register(EchoTool::new("get_wards"))
            .register(EchoTool::new("get_counties"));

        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["get_counties", "get_wards"]);
        assert_eq!(registry.available_names(), "get_counties, get_wards");
    }

    #[test]
    fn resolve_unknown_lists_available() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("get_counties"));

        let err = registry.resolve("get_countys").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Error: get_countys is not a valid tool, try one of [get_counties]."
        );
    }

    #[test]
    fn re_register_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool::new("a")).register(EchoTool::new("a"));
        assert_eq!(registry.len(), 1);
    }
}
