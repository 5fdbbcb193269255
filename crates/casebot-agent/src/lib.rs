//! Tool-calling agent for casebot
//!
//! The [`ToolRouter`] runs the model/tool loop over a [`ToolRegistry`] that is
//! fixed at startup. Two tools ship with the crate: `vector_search` over the
//! case report store and `send_email` through an HTTP notification endpoint.

mod config;
mod registry;
mod router;
pub mod tools;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use config::{AgentConfig, DEFAULT_MAX_STEPS, DEFAULT_SYSTEM_PROMPT};
pub use registry::ToolRegistry;
pub use router::{AgentRun, AgentStep, ToolRouter};
pub use tools::{SendEmailTool, VectorSearchTool};

// Re-export core types for convenience
pub use casebot_core::{ChatMessage, ChatSession, Error, Result, Tool, ToolCall, ToolDefinition};

use casebot_core::VectorStore;

/// Registry holding the built-in tools
pub fn default_registry<V: VectorStore + ?Sized + 'static>(
    store: Arc<V>,
    config: &AgentConfig,
) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(VectorSearchTool::new(store)));
    registry.register(Arc::new(SendEmailTool::from_config(config)?));
    Ok(registry)
}
