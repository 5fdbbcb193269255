//! Retrieval-augmented generation for casebot
//!
//! This crate provides the query pipeline, the vector stores it searches,
//! the offline embedder and the conversation memories used by chat sessions.

mod config;
mod embedding;
mod engine;
mod memory;
mod seed;
mod vector_store;


pub use config::{
    DEFAULT_COLLECTION_NAME, DEFAULT_QDRANT_URL, DEFAULT_TOP_K, EmbeddingKind, RagConfig,
    StoreKind,
};
pub use embedding::{HashEmbedder, cosine_similarity};
pub use engine::{PromptContext, RagPipeline};
pub use memory::{BufferMemory, DEFAULT_BUFFER_TURNS, SummaryMemory};
pub use seed::seed_sample_reports;
pub use vector_store::{LocalVectorStore, QdrantVectorStore};

// Re-export core types for convenience
pub use casebot_core::{
    Answer, ConversationMemory, Embedder, Error, Result, RetrievalStatus, SearchConfig,
    SearchResult, VectorDocument, VectorStore,
};
