//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::{ChatMessage, ToolDefinition};

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gpt-4-turbo".to_string(),
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

/// Result of a plain text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Result of a chat request. `message` is always an assistant message and may
/// carry tool calls when tools were bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers (e.g., OpenAI or compatible endpoints)
///
/// Implementations must not retry forever: transient failures are retried a
/// bounded number of times and then surfaced as `Error::Provider`,
/// `Error::Network` or `Error::Timeout`.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a conversation, optionally with tools the model may call
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ChatResponse>;

    /// Generate text for a single prompt
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let response = self.chat(&[ChatMessage::user(prompt)], &[]).await?;
        Ok(GenerationResult {
            text: response.message.content,
            model_id: self.model_id().to_string(),
            tokens_used: response.tokens_used,
        })
    }

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
