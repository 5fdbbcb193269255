//! Tool capability trait

use async_trait::async_trait;
use serde_json::Value;

use crate::types::ToolDefinition;

/// A capability the model can invoke by name.
///
/// `execute` never fails across this boundary: problems are described in the
/// returned text, which is handed back to the model as the tool result so it
/// can react to them.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the argument object
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> String;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
