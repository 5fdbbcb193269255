//! Wiring of embedder, vector store and memory from configuration

use clap::ValueEnum;
use colored::*;
use std::sync::Arc;
use tracing::{info, warn};

use casebot_core::{ConversationMemory, Embedder, Error, LLMProvider, Result, VectorStore};
use casebot_openai::OpenAIClient;
use casebot_rag::{
    BufferMemory, EmbeddingKind, HashEmbedder, LocalVectorStore, QdrantVectorStore, RagConfig,
    StoreKind, SummaryMemory, seed_sample_reports,
};

/// Conversation memory used by `chat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MemoryKind {
    /// Running summary kept up to date by the model
    Summary,
    /// The last few turns verbatim
    Buffer,
    /// No memory; every question stands alone
    None,
}

pub fn build_memory(
    kind: MemoryKind,
    llm: Arc<dyn LLMProvider>,
) -> Option<Box<dyn ConversationMemory>> {
    match kind {
        MemoryKind::Summary => Some(Box::new(SummaryMemory::new(llm))),
        MemoryKind::Buffer => Some(Box::new(BufferMemory::default())),
        MemoryKind::None => None,
    }
}

pub fn build_embedder(kind: EmbeddingKind, openai: Arc<OpenAIClient>) -> Arc<dyn Embedder> {
    match kind {
        EmbeddingKind::OpenAI => openai as Arc<dyn Embedder>,
        EmbeddingKind::Hash => Arc::new(HashEmbedder::new()),
    }
}

fn continue_without_reports(error: &Error) {
    warn!(error = %error, "vector store unavailable");
    println!(
        "{} Vector store unavailable: {}. Continuing without case reports.",
        "⚠️ ".yellow(),
        error
    );
}

/// Open the configured store.
///
/// An unreachable Qdrant, or sample reports that cannot be embedded, are
/// reported and the store is returned anyway, so answers are produced
/// without documents instead of the command failing.
pub async fn connect_store(
    config: &RagConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn VectorStore>> {
    match config.store {
        StoreKind::Memory => {
            let mut store =
                LocalVectorStore::with_embedder(embedder).with_collection(&config.collection_name);
            store.connect().await?;
            match seed_sample_reports(&store).await {
                Ok(seeded) => {
                    info!(documents = seeded, "in-memory store seeded with sample case reports")
                }
                Err(e) => continue_without_reports(&e),
            }
            Ok(Arc::new(store))
        }
        StoreKind::Qdrant => {
            let mut store = QdrantVectorStore::new(&config.qdrant_url, &config.collection_name, embedder)
                .with_timeout(config.timeout);
            if let Err(e) = store.connect().await {
                continue_without_reports(&e);
            }
            Ok(Arc::new(store))
        }
    }
}
