//! Tool discovery and dispatch by name.

use super::{call, execute, explain, services, McpTool, ToolContext};
use crate::protocol::ToolDefinition;
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Registry of available MCP tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create a registry with every tool registered.
    pub fn new() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        registry.register(Box::new(execute::ExecuteTool));
        registry.register(Box::new(explain::ExplainIntentTool));
        registry.register(Box::new(services::ListServicesTool));
        registry.register(Box::new(services::SystemStatusTool));
        registry.register(Box::new(call::CallTool));

        debug!("registered {} tools", registry.tools.len());
        registry
    }

    fn register(&mut self, tool: Box<dyn McpTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Definitions for tools/list, sorted for a stable listing.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
        context: &ToolContext,
    ) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow!("Unknown tool: {name}"))?;
        tool.execute(args, context).await
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_all_tools() {
        let registry = ToolRegistry::new();
        for name in [
            "media_execute",
            "media_explain_intent",
            "media_list_services",
            "media_system_status",
            "media_call",
        ] {
            assert!(registry.has_tool(name), "missing tool {name}");
        }
    }

    #[test]
    fn test_list_tools_is_sorted_and_complete() {
        let registry = ToolRegistry::new();
        let tools = registry.list_tools();
        assert_eq!(tools.len(), 5);
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(tools.iter().all(|t| !t.description.is_empty()));
    }
}
