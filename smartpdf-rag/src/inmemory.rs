//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps entries in insertion order in a `Vec`
//! protected by a `tokio::sync::RwLock`. Appends take the write lock once
//! per call, so concurrent appends never interleave.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::vectorstore::{IndexedChunk, VectorStore};

#[derive(Debug, Default)]
struct Entries {
    items: Vec<IndexedChunk>,
    dimensions: Option<usize>,
}

/// An in-memory, append-only vector store.
///
/// The first appended vector fixes the store's dimensionality; later
/// appends with a different dimension are rejected as a whole.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Entries>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn store_error(message: String) -> RagError {
    RagError::VectorStoreError { backend: "InMemory".to_string(), message }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn append(&self, new_entries: Vec<IndexedChunk>) -> Result<()> {
        let mut entries = self.entries.write().await;

        let mut dimensions = entries.dimensions;
        for entry in &new_entries {
            let dim = entry.embedding.len();
            if dim == 0 {
                return Err(store_error("embedding vector is empty".to_string()));
            }
            match dimensions {
                Some(expected) if expected != dim => {
                    return Err(store_error(format!(
                        "embedding has {dim} dimensions, store expects {expected}"
                    )));
                }
                _ => dimensions = Some(dim),
            }
        }

        entries.dimensions = dimensions;
        entries.items.extend(new_entries);
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().await;
        if let Some(expected) = entries.dimensions {
            if embedding.len() != expected {
                return Err(store_error(format!(
                    "query has {} dimensions, store expects {expected}",
                    embedding.len()
                )));
            }
        }

        let mut scored: Vec<SearchResult> = entries
            .items
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, embedding),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.items.len()
    }
}
