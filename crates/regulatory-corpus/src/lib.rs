//! Regulatory Corpus - retrieval pipeline over indexed regulatory source material
//!
//! This crate provides:
//! - Collaborator traits for embedding, vector lookup and reranking
//! - The staged retrieval pipeline (embed, retrieve, rerank, threshold-filter)
//! - In-memory index and hashing embedder for tests and small corpora
//! - Citation collection and LLM context formatting
//! - Text chunking for ingestion callers

pub mod chunk;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod retriever;
pub mod types;

// Re-export commonly used types
pub use chunk::{chunk_text, clean_text};
pub use config::RetrievalConfig;
pub use embeddings::{Embedder, EmbeddingReranker, HashingEmbedder, Reranker};
pub use index::{InMemoryIndex, VectorIndex};
pub use retriever::{collect_citations, format_context, RegulatoryRetriever};
pub use types::{ChunkMetadata, IndexHit, RetrievedChunk};
