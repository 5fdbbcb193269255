//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A document stored in the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: serde_json::Value,
    /// Relevance assigned by the store for a query. Its meaning is store
    /// specific; the bundled stores use cosine similarity (higher is better).
    pub score: Option<f32>,
}

impl VectorDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding: None,
            metadata: serde_json::Value::Null,
            score: None,
        }
    }
}

/// Search result from vector store, ordered by the store's ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub documents: Vec<VectorDocument>,
    pub total: usize,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: None,
        }
    }
}

/// Trait for vector stores (e.g., Qdrant or the in-memory store)
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Initialize the vector store connection
    async fn connect(&mut self) -> Result<()>;

    /// Store a document, embedding it first if it has no embedding
    async fn store(&self, document: VectorDocument) -> Result<String>;

    /// Store multiple documents in batch
    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>>;

    /// Similarity search returning scored documents, best first
    async fn similarity_search_with_score(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<SearchResult>;

    /// Remove all documents
    async fn clear(&self) -> Result<()>;

    /// Get the total number of documents
    async fn count(&self) -> Result<usize>;

    /// Name of the collection searched
    fn collection_name(&self) -> &str;

    /// Check if the vector store is connected
    fn is_connected(&self) -> bool;
}
