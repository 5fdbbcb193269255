//! Offline embedder

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use casebot_core::{EMBEDDING_DIMENSION, Embedder, Result};

/// Deterministic hashed bag-of-words embedder.
///
/// Words and adjacent word pairs are hashed into buckets of a fixed-size
/// vector, which is then L2-normalised. No model download or network access
/// is needed, so it is what tests and the in-memory store use by default.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(EMBEDDING_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, token: &str) -> (usize, u64) {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let hash = hasher.finish();
        ((hash as usize) % self.dimension, hash)
    }

    /// Synchronous form of [`Embedder::embed`]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let mut embedding = vec![0.0f32; self.dimension];

        for word in &words {
            let (idx, hash) = self.bucket(word);
            embedding[idx] += 1.0;

            // longer words also land in a second bucket to soften collisions
            if word.len() > 3 {
                let secondary = ((hash >> 16) as usize) % self.dimension;
                embedding[secondary] += 0.5;
            }
        }

        for pair in words.windows(2) {
            let (idx, _) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            embedding[idx] += 0.3;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        embedding
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
