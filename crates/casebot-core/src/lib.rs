//! Core traits and types for casebot
//!
//! This crate defines the interfaces shared by the rest of the workspace:
//! LLM providers, embedders, vector stores, conversation memory and tools,
//! along with the chat message model, the per-user [`ChatSession`] and the
//! closed [`Error`] enum every crate reports through.

pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod memory;
pub mod rag;
pub mod session;
pub mod tool;
pub mod types;
pub mod vector_store;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use embedding::{EMBEDDING_DIMENSION, Embedder};
pub use error::{Error, Result};
pub use llm::{ChatResponse, GenerationConfig, GenerationResult, LLMProvider};
pub use memory::ConversationMemory;
pub use rag::{Answer, RetrievalStatus};
pub use session::{ChatSession, WELCOME_MESSAGE};
pub use tool::Tool;
pub use types::*;
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
