//! Session orchestrator for ingestion and question answering.
//!
//! A [`Session`] is the explicit context object that owns the session's
//! [`Index`]. Ingestion runs Loader → Chunker → Filter → `Index::add` per
//! document; queries run Retriever → Synthesizer.
//!
//! # Example
//!
//! ```rust,ignore
//! use smartpdf_rag::{Document, HashEmbeddingProvider, Session};
//!
//! let session = Session::builder()
//!     .embedding_provider(Arc::new(HashEmbeddingProvider::default()))
//!     .language_model(Arc::new(my_model))
//!     .build()?;
//!
//! let report = session.ingest_batch(vec![Document::from_path("report.pdf")?]).await?;
//! let answer = session.ask("What were the Q3 results?").await?;
//! ```

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{Instrument, error, info, info_span, warn};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::filter::ChunkFilter;
use crate::index::Index;
use crate::inmemory::InMemoryVectorStore;
use crate::loader::{AutoLoader, DocumentLoader};
use crate::model::{ErrorClassifier, KeywordClassifier, LanguageModel};
use crate::retriever::{Retriever, SimilarityRetriever};
use crate::synthesizer::{Answer, Synthesizer};
use crate::vectorstore::VectorStore;

/// Creates the vector store backing a new [`Index`].
pub type VectorStoreFactory = Arc<dyn Fn() -> Arc<dyn VectorStore> + Send + Sync>;

/// Counts for one successfully ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Document name.
    pub name: String,
    /// Pages returned by the loader.
    pub pages: usize,
    /// Chunks produced by the chunker.
    pub raw_chunks: usize,
    /// Chunks that survived the filter and were indexed.
    pub indexed_chunks: usize,
}

/// The outcome of one document in a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Document name.
    pub name: String,
    /// The ingestion result.
    pub result: Result<IngestReport>,
}

/// Per-document outcomes of an upload batch, in upload order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per submitted document.
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// Reports of the documents that were indexed.
    pub fn succeeded(&self) -> impl Iterator<Item = &IngestReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Names and errors of the documents that failed.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &RagError)> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    /// Number of documents that were indexed.
    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }
}

/// The live index together with the documents indexed into it.
struct IndexSlot {
    index: Arc<Index>,
    processed: Vec<String>,
}

/// One user session: the index plus the components that feed and query it.
///
/// The index is created the first time a document reaches the indexing
/// stage and lives until [`reset`](Session::reset) or drop.
pub struct Session {
    config: RagConfig,
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    filter: ChunkFilter,
    embedder: Arc<dyn EmbeddingProvider>,
    store_factory: VectorStoreFactory,
    synthesizer: Synthesizer,
    index: RwLock<Option<IndexSlot>>,
}

impl Session {
    /// Create a new [`SessionBuilder`].
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Return a reference to the session configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest one document: load → chunk → filter → index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] if the document cannot be parsed,
    /// [`RagError::NoUsableText`] if no chunk survives the filter, and
    /// [`RagError::EmbeddingError`] if embedding fails. A failed document
    /// leaves the index unchanged. Returns [`RagError::SessionReset`] if
    /// [`reset`](Session::reset) ran while the document was being indexed.
    pub async fn ingest(&self, document: &Document) -> Result<IngestReport> {
        self.run_ingest(document)
            .instrument(info_span!("rag.ingest", document = %document.name))
            .await
    }

    async fn run_ingest(&self, document: &Document) -> Result<IngestReport> {
        let pages = info_span!("rag.load").in_scope(|| self.loader.load(document))?;

        let chunks =
            info_span!("rag.chunk").in_scope(|| self.chunker.chunk(&document.name, &pages));
        let raw_chunks = chunks.len();
        info!(document = %document.name, chunk_count = raw_chunks, "created chunks");

        let chunks = info_span!("rag.filter").in_scope(|| self.filter.apply(chunks));
        info!(document = %document.name, chunk_count = chunks.len(), "filtered to valid chunks");
        if chunks.is_empty() {
            return Err(RagError::NoUsableText { document: document.name.clone() });
        }

        let index = self.index_or_create().await;
        let indexed_chunks = index.add(chunks).instrument(info_span!("rag.index")).await?;

        // The chunks only count if the index they went into is still live.
        match self.index.write().await.as_mut() {
            Some(slot) if Arc::ptr_eq(&slot.index, &index) => {
                slot.processed.push(document.name.clone());
            }
            _ => {
                warn!(document = %document.name, "session reset during ingestion");
                return Err(RagError::SessionReset { document: document.name.clone() });
            }
        }

        Ok(IngestReport {
            name: document.name.clone(),
            pages: pages.len(),
            raw_chunks,
            indexed_chunks,
        })
    }

    /// Ingest an upload batch.
    ///
    /// Documents are processed concurrently and independently; a failure is
    /// recorded in the report without affecting the others.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::BatchLimitExceeded`] before doing any work if the
    /// batch holds more than `max_batch_documents` documents.
    pub async fn ingest_batch(&self, documents: Vec<Document>) -> Result<BatchReport> {
        let max = self.config.max_batch_documents;
        if documents.len() > max {
            warn!(count = documents.len(), max, "upload batch rejected");
            return Err(RagError::BatchLimitExceeded { count: documents.len(), max });
        }

        let outcomes = join_all(documents.iter().map(|document| async move {
            let result = self.ingest(document).await;
            match &result {
                Ok(report) => info!(
                    document = %report.name,
                    chunk_count = report.indexed_chunks,
                    "processed document"
                ),
                Err(e) => error!(
                    document = %document.name,
                    error = %e,
                    "error processing document"
                ),
            }
            DocumentOutcome { name: document.name.clone(), result }
        }))
        .await;

        let report = BatchReport { outcomes };
        info!(
            documents = documents.len(),
            succeeded = report.success_count(),
            "batch ingestion finished"
        );
        Ok(report)
    }

    /// Answer a question from the indexed documents.
    ///
    /// Before anything is indexed this returns the "no documents processed"
    /// sentinel without touching the embedder or the model. Retrieval and
    /// model failures are converted into sentinel answers.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuestion`] if `question` is blank.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuestion);
        }

        let Some(index) = self.current_index().await else {
            return Ok(Answer::no_documents());
        };
        if index.is_empty().await {
            return Ok(Answer::no_documents());
        }

        let span = info_span!("rag.ask", top_k = self.config.top_k);
        let answer = async {
            let retriever = SimilarityRetriever::new(index, self.config.top_k);
            let retrieved =
                retriever.retrieve(question).instrument(info_span!("rag.retrieve")).await;
            let chunks = match retrieved {
                Ok(chunks) => chunks,
                Err(e) => {
                    error!(error = %e, "retrieval failed");
                    return Answer::from_error(&e, self.synthesizer.classifier());
                }
            };

            self.synthesizer
                .answer(question, &chunks)
                .instrument(info_span!("rag.synthesize", chunk_count = chunks.len()))
                .await
        }
        .instrument(span)
        .await;

        Ok(answer)
    }

    /// Whether at least one document has been indexed.
    pub async fn is_ready(&self) -> bool {
        match self.current_index().await {
            Some(index) => !index.is_empty().await,
            None => false,
        }
    }

    /// Number of chunks in the index.
    pub async fn indexed_chunks(&self) -> usize {
        match self.current_index().await {
            Some(index) => index.len().await,
            None => 0,
        }
    }

    /// Names of successfully ingested documents, in completion order.
    pub async fn processed_documents(&self) -> Vec<String> {
        self.index.read().await.as_ref().map(|slot| slot.processed.clone()).unwrap_or_default()
    }

    /// Drop the index and forget processed documents.
    ///
    /// Ingestions still running against the dropped index fail with
    /// [`RagError::SessionReset`].
    pub async fn reset(&self) {
        self.index.write().await.take();
        info!("session reset");
    }

    async fn current_index(&self) -> Option<Arc<Index>> {
        self.index.read().await.as_ref().map(|slot| slot.index.clone())
    }

    async fn index_or_create(&self) -> Arc<Index> {
        if let Some(index) = self.current_index().await {
            return index;
        }
        let mut slot = self.index.write().await;
        slot.get_or_insert_with(|| {
            info!("creating session index");
            IndexSlot {
                index: Arc::new(Index::new(self.embedder.clone(), (self.store_factory)())),
                processed: Vec::new(),
            }
        })
        .index
        .clone()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("synthesizer", &self.synthesizer)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Session`].
///
/// The embedding provider and language model are required. Everything else
/// defaults from the [`RagConfig`]: [`AutoLoader`], [`RecursiveChunker`],
/// [`ChunkFilter`], [`KeywordClassifier`] and [`InMemoryVectorStore`].
#[derive(Default)]
pub struct SessionBuilder {
    config: Option<RagConfig>,
    loader: Option<Arc<dyn DocumentLoader>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    classifier: Option<Arc<dyn ErrorClassifier>>,
    store_factory: Option<VectorStoreFactory>,
}

impl SessionBuilder {
    /// Set the session configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document loader.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the chunker, overriding the one derived from the config.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the language model.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the transient-failure classifier.
    pub fn classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the factory for the index's vector store.
    pub fn vector_store_factory(
        mut self,
        factory: impl Fn() -> Arc<dyn VectorStore> + Send + Sync + 'static,
    ) -> Self {
        let factory: VectorStoreFactory = Arc::new(factory);
        self.store_factory = Some(factory);
        self
    }

    /// Build the [`Session`], validating the config and required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the config is invalid or a
    /// required field is missing.
    pub fn build(self) -> Result<Session> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let embedder = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let model = self
            .language_model
            .ok_or_else(|| RagError::ConfigError("language_model is required".to_string()))?;

        let classifier = self.classifier.unwrap_or_else(|| {
            Arc::new(KeywordClassifier::new(config.transient_indicators.iter().cloned()))
                as Arc<dyn ErrorClassifier>
        });
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(RecursiveChunker::from_config(&config)) as Arc<dyn Chunker>
        });
        let loader =
            self.loader.unwrap_or_else(|| Arc::new(AutoLoader) as Arc<dyn DocumentLoader>);
        let store_factory = self.store_factory.unwrap_or_else(|| {
            Arc::new(|| Arc::new(InMemoryVectorStore::new()) as Arc<dyn VectorStore>)
                as VectorStoreFactory
        });

        Ok(Session {
            filter: ChunkFilter::new(config.min_chunk_chars),
            loader,
            chunker,
            embedder,
            store_factory,
            synthesizer: Synthesizer::new(model).with_classifier(classifier),
            index: RwLock::new(None),
            config,
        })
    }
}
