//! Retrieval configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use casebot_core::config::{
    DEFAULT_REQUEST_TIMEOUT_SECS, env_or, request_timeout_from_env, validate_url,
};
use casebot_core::{Error, Result, SearchConfig};

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION_NAME: &str = "case_reports";
pub const DEFAULT_TOP_K: usize = 4;

/// Which vector store backs retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Qdrant,
    Memory,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "qdrant" => Ok(StoreKind::Qdrant),
            "memory" | "local" => Ok(StoreKind::Memory),
            other => Err(Error::Configuration(format!(
                "VECTOR_STORE must be 'qdrant' or 'memory', got {:?}",
                other
            ))),
        }
    }
}

/// Which embedder turns text into vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    OpenAI,
    Hash,
}

impl FromStr for EmbeddingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingKind::OpenAI),
            "hash" => Ok(EmbeddingKind::Hash),
            other => Err(Error::Configuration(format!(
                "EMBEDDINGS must be 'openai' or 'hash', got {:?}",
                other
            ))),
        }
    }
}

/// Retrieval settings for the pipeline and the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub store: StoreKind,
    pub embeddings: EmbeddingKind,
    pub qdrant_url: String,
    pub collection_name: String,
    pub top_k: usize,
    /// Timeout for calls to the vector store
    pub timeout: Duration,
}

impl RagConfig {
    pub fn from_env() -> Result<Self> {
        let qdrant_url: String = env_or("QDRANT_URL", DEFAULT_QDRANT_URL.to_string())?;
        validate_url("QDRANT_URL", &qdrant_url)?;

        let top_k: usize = env_or("RAG_TOP_K", DEFAULT_TOP_K)?;
        if top_k == 0 {
            return Err(Error::Configuration("RAG_TOP_K must be at least 1".to_string()));
        }

        Ok(Self {
            store: env_or("VECTOR_STORE", StoreKind::Qdrant)?,
            embeddings: env_or("EMBEDDINGS", EmbeddingKind::OpenAI)?,
            qdrant_url,
            collection_name: env_or("COLLECTION_NAME", DEFAULT_COLLECTION_NAME.to_string())?,
            top_k,
            timeout: request_timeout_from_env()?,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            top_k: self.top_k,
            score_threshold: None,
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Qdrant,
            embeddings: EmbeddingKind::OpenAI,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            top_k: DEFAULT_TOP_K,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
