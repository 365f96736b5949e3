//! The session's vector index: embeds chunks and serves similarity search.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::inmemory::InMemoryVectorStore;
use crate::vectorstore::{IndexedChunk, VectorStore};

/// An append-only collection of embedded chunks.
///
/// Composes an [`EmbeddingProvider`] with a [`VectorStore`]. Chunks are
/// never deduplicated: adding the same chunk twice stores two entries.
pub struct Index {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Index {
    /// Create an index over an existing store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Create an index backed by a fresh [`InMemoryVectorStore`].
    pub fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(embedder, Arc::new(InMemoryVectorStore::new()))
    }

    /// Embed and append `chunks`, returning how many were added.
    ///
    /// All chunks are embedded before anything is stored, so a failure
    /// leaves the index exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the provider fails or returns
    /// the wrong number of vectors, and [`RagError::VectorStoreError`] if
    /// the store rejects the batch.
    pub async fn add(&self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(chunk_count = chunks.len(), error = %e, "embedding failed during indexing");
            e
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::EmbeddingError {
                provider: "index".to_string(),
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    chunks.len(),
                    embeddings.len()
                ),
            });
        }

        let count = chunks.len();
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();
        self.store.append(entries).await?;

        debug!(chunk_count = count, "appended chunks to index");
        Ok(count)
    }

    /// Return up to `k` chunks most similar to `query`, best first.
    ///
    /// An empty index returns an empty result without embedding the query.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the query cannot be embedded.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.store.is_empty().await {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;
        self.store.search(&embedding, k).await
    }

    /// Number of indexed chunks.
    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    /// Whether the index holds no chunks.
    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("dimensions", &self.embedder.dimensions())
            .finish_non_exhaustive()
    }
}
