use serde::{Deserialize, Serialize};

/// Metadata carried alongside each indexed chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub title: String,
    pub source_url: String,
}

impl ChunkMetadata {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
        }
    }
}

/// Raw hit returned by a vector index query. `distance` is in [0, 2] for
/// cosine-style indexes; similarity is derived as `1 - distance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexHit {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// A chunk after retrieval, reranking and threshold filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub similarity_score: f32,
    pub rerank_score: f32,
}
