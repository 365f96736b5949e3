//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A chunk paired with its embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    /// The stored chunk.
    pub chunk: Chunk,
    /// The embedding of the chunk's text.
    pub embedding: Vec<f32>,
}

/// An append-only storage backend for embedded chunks.
///
/// Entries are never updated or removed. Each [`append`](VectorStore::append)
/// call must be atomic: either every entry is stored or none is.
///
/// # Example
///
/// ```rust,ignore
/// use smartpdf_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.append(entries).await?;
/// let results = store.search(&query_embedding, 4).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append entries after all existing ones.
    async fn append(&self, entries: Vec<IndexedChunk>) -> Result<()>;

    /// Return the `top_k` entries most similar to `embedding`.
    ///
    /// Results are ordered by descending similarity; equal scores keep
    /// insertion order.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Number of stored entries.
    async fn len(&self) -> usize;

    /// Whether the store holds no entries.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
