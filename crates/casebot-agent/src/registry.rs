//! Tool registry

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use casebot_core::{Tool, ToolDefinition};

/// Tools the agent may call, keyed by name and fixed once the agent starts
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Definitions bound to every model request, ordered by name
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Run a tool by name. An unknown name is reported as text, like any
    /// other tool failure.
    pub async fn execute(&self, name: &str, args: Value) -> String {
        match self.tools.get(name) {
            Some(tool) => tool.execute(args).await,
            None => format!(
                "Error: unknown tool '{}'. Available tools: {}",
                name,
                self.tool_names().join(", ")
            ),
        }
    }

    /// Get a list of all registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
