//! Retrieval pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for the retrieval pipeline. Constructed once and handed to
/// [`crate::RegulatoryRetriever`]; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates fetched from the vector index per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Candidates kept after reranking.
    #[serde(default = "default_rerank_k")]
    pub rerank_k: usize,
    /// Minimum similarity score; candidates below are dropped, not demoted.
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    /// Per-call budget for embed/query/rerank collaborator calls.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_top_k() -> usize {
    8
}

fn default_rerank_k() -> usize {
    6
}

fn default_min_score() -> f32 {
    0.35
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            rerank_k: default_rerank_k(),
            min_score: default_min_score(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RetrievalConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 8);
        assert_eq!(config.rerank_k, 6);
        assert_eq!(config.min_score, 0.35);
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RetrievalConfig = serde_json::from_str(r#"{"top_k": 12}"#).unwrap();
        assert_eq!(config.top_k, 12);
        assert_eq!(config.rerank_k, 6);
        assert_eq!(config.min_score, 0.35);
    }
}
