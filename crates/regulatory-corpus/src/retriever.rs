//! Staged retrieval: embed, retrieve, rerank, threshold-filter
//!
//! Every collaborator call is bounded by the configured timeout. A failed or
//! slow stage degrades to an empty result; callers treat an empty context as
//! "no authoritative source found", never as an error.

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::embeddings::{Embedder, Reranker};
use crate::index::VectorIndex;
use crate::types::RetrievedChunk;

pub struct RegulatoryRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    reranker: Option<Arc<dyn Reranker>>,
    config: RetrievalConfig,
}

impl RegulatoryRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            reranker: None,
            config,
        }
    }

    /// Attach a reranker stage. Without one, candidates keep retrieval order
    /// and their similarity score doubles as the rerank score.
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Runs the full pipeline for one query. Degrades to an empty list on
    /// embedding or index failure; degrades to retrieval order on reranker
    /// failure.
    pub async fn retrieve_and_rerank(&self, query: &str) -> Vec<RetrievedChunk> {
        let timeout = self.config.call_timeout();

        let vector = match tokio::time::timeout(timeout, self.embedder.embed(query)).await {
            Ok(Ok(vector)) if !vector.is_empty() => vector,
            Ok(Ok(_)) => {
                tracing::warn!("Embedder returned an empty vector, skipping retrieval");
                return Vec::new();
            }
            Ok(Err(err)) => {
                tracing::warn!("Query embedding failed: {}", err);
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!("Query embedding timed out after {:?}", timeout);
                return Vec::new();
            }
        };

        let hits = match tokio::time::timeout(timeout, self.index.query(&vector, self.config.top_k))
            .await
        {
            Ok(Ok(hits)) => hits,
            Ok(Err(err)) => {
                tracing::warn!("Vector index query failed: {}", err);
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!("Vector index query timed out after {:?}", timeout);
                return Vec::new();
            }
        };
        if hits.is_empty() {
            tracing::debug!("No candidates retrieved for query");
            return Vec::new();
        }

        let mut chunks: Vec<RetrievedChunk> = hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                similarity_score: 1.0 - hit.distance,
                rerank_score: 1.0 - hit.distance,
                text: hit.text,
                metadata: hit.metadata,
            })
            .collect();

        if let Some(reranker) = &self.reranker {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            match tokio::time::timeout(timeout, reranker.score(query, &texts)).await {
                Ok(Ok(scores)) if scores.len() == chunks.len() => {
                    for (chunk, score) in chunks.iter_mut().zip(scores) {
                        chunk.rerank_score = score;
                    }
                    // Stable sort keeps retrieval order for tied scores
                    chunks.sort_by(|a, b| b.rerank_score.total_cmp(&a.rerank_score));
                }
                Ok(Ok(scores)) => {
                    tracing::warn!(
                        "Reranker returned {} scores for {} candidates, keeping retrieval order",
                        scores.len(),
                        chunks.len()
                    );
                }
                Ok(Err(err)) => {
                    tracing::warn!("Reranking failed, keeping retrieval order: {}", err);
                }
                Err(_) => {
                    tracing::warn!("Reranking timed out after {:?}, keeping retrieval order", timeout);
                }
            }
        }
        chunks.truncate(self.config.rerank_k);

        chunks.retain(|c| c.similarity_score >= self.config.min_score);
        chunks
    }
}

/// Duplicate-free source URLs in first-seen order.
pub fn collect_citations(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut urls = Vec::new();
    for chunk in chunks {
        let url = chunk.metadata.source_url.trim();
        if !url.is_empty() && seen.insert(url.to_string()) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Renders retrieved chunks as a context block for a downstream LLM prompt.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return "No relevant regulatory documents found.".to_string();
    }
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!("Document {}: {}\n", i + 1, chunk.metadata.title));
        if !chunk.metadata.source_url.is_empty() {
            out.push_str(&format!("Source: {}\n", chunk.metadata.source_url));
        }
        out.push_str(&format!("Content: {}\n", chunk.text));
        out.push_str("---\n");
    }
    out
}
