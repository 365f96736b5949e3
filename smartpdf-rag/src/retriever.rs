//! Retriever seam between the query path and the index.

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::Result;
use crate::index::Index;

/// Finds the chunks relevant to a question.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return the chunks most relevant to `question`, best first.
    async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>>;
}

/// Plain top-k similarity search over an [`Index`].
#[derive(Debug, Clone)]
pub struct SimilarityRetriever {
    index: Arc<Index>,
    top_k: usize,
}

impl SimilarityRetriever {
    /// Default number of chunks retrieved per question.
    pub const DEFAULT_TOP_K: usize = 4;

    /// Retrieve `top_k` chunks per question from `index`.
    pub fn new(index: Arc<Index>, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// The number of chunks returned per question.
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

#[async_trait]
impl Retriever for SimilarityRetriever {
    async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        self.index.search(question, self.top_k).await
    }
}
