//! Vector index abstraction and the in-memory implementation

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ChunkMetadata, IndexHit};

/// Nearest-neighbour lookup over an indexed corpus. Persistence, sharding and
/// ANN internals live behind this seam.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns up to `k` hits ordered by ascending distance.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexHit>>;
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

struct IndexEntry {
    text: String,
    metadata: ChunkMetadata,
    vector: Vec<f32>,
}

/// Exhaustive cosine index held in memory. Suits tests and corpora small
/// enough that a scan beats an ANN structure; build it up front, then share
/// it read-only.
#[derive(Default)]
pub struct InMemoryIndex {
    entries: Vec<IndexEntry>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: impl Into<String>, metadata: ChunkMetadata, vector: Vec<f32>) {
        self.entries.push(IndexEntry {
            text: text.into(),
            metadata,
            vector,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        let mut hits: Vec<IndexHit> = self
            .entries
            .iter()
            .map(|entry| IndexHit {
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
                distance: 1.0 - cosine_similarity(vector, &entry.vector),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(title: &str) -> ChunkMetadata {
        ChunkMetadata::new(title, format!("https://example.org/{title}"))
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        let a = [1.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_query_orders_by_distance_and_truncates() {
        let mut index = InMemoryIndex::new();
        index.add("far", meta("far"), vec![0.0, 1.0]);
        index.add("near", meta("near"), vec![1.0, 0.05]);
        index.add("exact", meta("exact"), vec![1.0, 0.0]);

        let hits = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "exact");
        assert_eq!(hits[1].text, "near");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_hits() {
        let index = InMemoryIndex::new();
        let hits = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }
}
