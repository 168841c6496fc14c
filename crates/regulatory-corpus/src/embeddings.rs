//! Embedding and reranking collaborators
//!
//! Production deployments plug in a real embedding model and cross-encoder
//! behind [`Embedder`] and [`Reranker`]. The built-in [`HashingEmbedder`] is a
//! deterministic token-hashing bag-of-words embedder: good enough for tests
//! and small keyword-heavy corpora, with no model download.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::index::cosine_similarity;

/// Text to fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Re-scores candidate texts against the original query.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Returns one score per candidate, in candidate order.
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>>;
}

/// Deterministic bag-of-words embedder. Tokens are lowercased, hashed into
/// `dim` buckets and the resulting vector is L2-normalized, so cosine
/// similarity reflects token overlap.
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub const DEFAULT_DIM: usize = 256;

    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIM)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dim];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(token)] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        Ok(vector)
    }
}

/// Reranker backed by an embedder: scores each candidate by cosine similarity
/// to the query embedding. Cheaper than a cross-encoder, and a reasonable
/// stand-in where no cross-encoder is deployed.
pub struct EmbeddingReranker {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingReranker {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl Reranker for EmbeddingReranker {
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>> {
        let query_vector = self.embedder.embed(query).await?;
        let embeds = candidates.iter().map(|c| self.embedder.embed(c));
        let vectors = futures::future::try_join_all(embeds).await?;
        Ok(vectors
            .iter()
            .map(|v| cosine_similarity(&query_vector, v))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("register of members").await.unwrap();
        let b = embedder.embed("register of members").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), HashingEmbedder::DEFAULT_DIM);
    }

    #[tokio::test]
    async fn test_hashing_embedder_normalizes() {
        let embedder = HashingEmbedder::default();
        let v = embedder.embed("articles of association").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_hashing_embedder_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::default();
        let v = embedder.embed("  ").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_embedding_reranker_prefers_overlapping_candidate() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());
        let reranker = EmbeddingReranker::new(embedder);
        let candidates = vec![
            "incorporation of a private company".to_string(),
            "annual leave entitlement for employees".to_string(),
        ];
        let scores = reranker
            .score("private company incorporation requirements", &candidates)
            .await
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0] > scores[1]);
    }
}
