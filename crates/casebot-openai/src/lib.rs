//! OpenAI integration for casebot
//!
//! This crate provides the OpenAI implementation of the [`LLMProvider`] and
//! [`Embedder`] traits over the chat completions and embeddings endpoints.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::OpenAIClient;
pub use config::{DEFAULT_API_BASE, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, OpenAIConfig};

// Re-export core types for convenience
pub use casebot_core::{
    ChatMessage, ChatResponse, Embedder, Error, GenerationResult, LLMProvider, Result,
    RetryConfig, ToolCall, ToolDefinition,
};
