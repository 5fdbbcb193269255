//! Common types used across the casebot system

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Configuration for retry behavior on transient provider errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Delay before the given retry (1-based), doubling each time
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured request from the model to run a named tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Argument text exactly as the model sent it
    #[serde(skip)]
    pub raw_arguments: Option<String>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            raw_arguments: None,
        }
    }

    /// Build a call from arguments encoded as a JSON string, as chat APIs send
    /// them. Unparseable arguments are kept verbatim as a string value so the
    /// tool can fall back to treating them as plain text.
    pub fn from_raw_arguments(
        id: impl Into<String>,
        name: impl Into<String>,
        raw: &str,
    ) -> Self {
        let arguments = if raw.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        };
        Self {
            raw_arguments: Some(raw.to_string()),
            ..Self::new(id, name, arguments)
        }
    }

    /// Arguments as a JSON-encoded string for the wire
    pub fn encoded_arguments(&self) -> String {
        match &self.raw_arguments {
            Some(raw) => raw.clone(),
            None => self.arguments.to_string(),
        }
    }
}

/// Tool description bound to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object
    pub parameters: Value,
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Assistant turn that requests tools
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// Result of a tool call, linked back to the call that produced it
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(Role::Tool, content)
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_arguments_parsed_as_json() {
        let call = ToolCall::from_raw_arguments("call_1", "vector_search", r#"{"query":"knee pain"}"#);
        assert_eq!(call.arguments, json!({"query": "knee pain"}));
    }

    #[test]
    fn test_raw_arguments_kept_as_string_when_invalid() {
        let call = ToolCall::from_raw_arguments("call_1", "send_email", "just send it");
        assert_eq!(call.arguments, Value::String("just send it".to_string()));

        let empty = ToolCall::from_raw_arguments("call_2", "vector_search", "  ");
        assert_eq!(empty.arguments, json!({}));
    }

    #[test]
    fn test_encoded_arguments() {
        let quoted = ToolCall::from_raw_arguments("call_1", "vector_search", "\"knee\"");
        assert_eq!(quoted.arguments, json!("knee"));
        assert_eq!(quoted.encoded_arguments(), "\"knee\"");

        let invalid = ToolCall::from_raw_arguments("call_2", "send_email", "just send it");
        assert_eq!(invalid.encoded_arguments(), "just send it");

        let built = ToolCall::new("call_3", "vector_search", json!("knee"));
        assert_eq!(built.encoded_arguments(), "\"knee\"");
    }

    #[test]
    fn test_tool_result_message() {
        let msg = ChatMessage::tool_result("call_9", "done");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_9"));
        assert!(!msg.has_tool_calls());
    }

    #[test]
    fn test_backoff_doubles() {
        let retry = RetryConfig {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(retry.backoff(1), Duration::from_millis(100));
        assert_eq!(retry.backoff(2), Duration::from_millis(200));
        assert_eq!(retry.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_message_serialization_skips_empty_fields() {
        let value = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hi"}));
    }
}
