//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Dimension of every embedding stored in the case report collections
pub const EMBEDDING_DIMENSION: usize = 384;

/// Maps text to a fixed-dimension vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;
}
