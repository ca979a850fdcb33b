//! In-memory similarity index over one document's chunks
//!
//! The index is rebuilt wholesale on every load and never mutated in place.
//! A single document yields at most a few hundred chunks, so search is an
//! exact cosine scan; the optional JSON snapshot on disk is a disposable
//! cache, not a durability guarantee.

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Similarity score (0.0-1.0, higher is better)
    pub similarity: f32,
}

/// Similarity index over the chunks of a single document
#[derive(Debug, Serialize, Deserialize)]
pub struct ChunkIndex {
    document_id: Uuid,
    dimensions: usize,
    chunks: Vec<Chunk>,
}

impl ChunkIndex {
    /// Build an index from embedded chunks
    ///
    /// Every chunk must carry an embedding of the same dimensionality.
    pub fn build(document_id: Uuid, chunks: Vec<Chunk>) -> Result<Self> {
        let dimensions = chunks
            .first()
            .map(|c| c.embedding.len())
            .ok_or_else(|| Error::Internal("cannot index zero chunks".to_string()))?;

        if dimensions == 0 {
            return Err(Error::Internal("chunks have no embeddings".to_string()));
        }

        for chunk in &chunks {
            if chunk.embedding.len() != dimensions {
                return Err(Error::Internal(format!(
                    "chunk {} has embedding of length {}, expected {}",
                    chunk.chunk_index,
                    chunk.embedding.len(),
                    dimensions
                )));
            }
        }

        Ok(Self {
            document_id,
            dimensions,
            chunks,
        })
    }

    /// Search for the `top_k` chunks most similar to the query embedding
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = self
            .chunks
            .iter()
            .map(|chunk| SearchResult {
                similarity: cosine_similarity(query_embedding, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        results
    }

    /// Id of the indexed document
    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    /// Embedding dimensionality
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Write a snapshot to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)
            .map_err(|e| Error::Internal(format!("failed to serialize index: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Internal(format!("failed to parse index snapshot: {}", e)))
    }
}

/// Cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_with_embedding(index: u32, content: &str, embedding: Vec<f32>) -> Chunk {
        let mut chunk = Chunk::new(Uuid::nil(), content.to_string(), None, 0, content.len(), index);
        chunk.embedding = embedding;
        chunk
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = ChunkIndex::build(
            Uuid::new_v4(),
            vec![
                chunk_with_embedding(0, "orthogonal", vec![0.0, 1.0, 0.0]),
                chunk_with_embedding(1, "aligned", vec![1.0, 0.0, 0.0]),
                chunk_with_embedding(2, "close", vec![0.9, 0.1, 0.0]),
            ],
        )
        .unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 3);
        assert_eq!(results[0].chunk.content, "aligned");
        assert_eq!(results[1].chunk.content, "close");
        assert_eq!(results[2].chunk.content, "orthogonal");
    }

    #[test]
    fn test_search_truncates_to_top_k() {
        let chunks = (0..10)
            .map(|i| chunk_with_embedding(i, "c", vec![1.0, i as f32]))
            .collect();
        let index = ChunkIndex::build(Uuid::new_v4(), chunks).unwrap();

        assert_eq!(index.search(&[1.0, 0.0], 3).len(), 3);
    }

    #[test]
    fn test_build_rejects_missing_embeddings() {
        let bare = Chunk::new(Uuid::nil(), "no embedding".to_string(), None, 0, 12, 0);
        assert!(ChunkIndex::build(Uuid::new_v4(), vec![bare]).is_err());
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let chunks = vec![
            chunk_with_embedding(0, "a", vec![1.0, 0.0]),
            chunk_with_embedding(1, "b", vec![1.0, 0.0, 0.0]),
        ];
        assert!(ChunkIndex::build(Uuid::new_v4(), chunks).is_err());
    }

    #[test]
    fn test_zero_vector_has_zero_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
