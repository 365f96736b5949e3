//! # smartpdf-rag
//!
//! Retrieval-augmented question answering over uploaded documents.
//!
//! ## Overview
//!
//! Ingestion turns each uploaded file into indexed chunks:
//!
//! - [`DocumentLoader`]: bytes to page text ([`PdfLoader`], [`TextLoader`], [`AutoLoader`])
//! - [`Chunker`]: page text to overlapping, size-bounded chunks ([`RecursiveChunker`])
//! - [`ChunkFilter`]: whitespace normalization and removal of short chunks
//! - [`Index`]: embeds chunks with an [`EmbeddingProvider`] and appends them to a [`VectorStore`]
//!
//! Questions go through a [`Retriever`] and a [`Synthesizer`], which stuffs
//! the retrieved chunks into one prompt for a [`LanguageModel`] and records
//! which documents contributed.
//!
//! [`Session`] ties both paths together and owns the index for the
//! lifetime of a user session.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use smartpdf_rag::{Document, HashEmbeddingProvider, Session};
//!
//! let session = Session::builder()
//!     .embedding_provider(Arc::new(HashEmbeddingProvider::default()))
//!     .language_model(Arc::new(my_model))
//!     .build()?;
//!
//! let report = session.ingest_batch(vec![Document::from_path("manual.pdf")?]).await?;
//! let answer = session.ask("How do I reset the device?").await?;
//! println!("{} (from {:?})", answer.text, answer.sources);
//! ```
//!
//! ## Features
//!
//! - `pdf` (default): PDF loading via `lopdf`
//! - `openai`: OpenAI-compatible embedding and chat completion clients

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod index;
pub mod inmemory;
pub mod loader;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod synthesizer;
pub mod vectorstore;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, ChunkMetadata, Document, Page, SearchResult};
pub use embedding::{EmbeddingProvider, HashEmbeddingProvider};
pub use error::{RagError, Result};
pub use filter::ChunkFilter;
pub use index::Index;
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "pdf")]
pub use loader::PdfLoader;
pub use loader::{AutoLoader, DocumentLoader, TextLoader};
pub use model::{ErrorClassifier, KeywordClassifier, LanguageModel};
#[cfg(feature = "openai")]
pub use openai::{ChatCompletionsModel, OpenAIEmbeddingProvider};
pub use pipeline::{BatchReport, DocumentOutcome, IngestReport, Session, SessionBuilder};
pub use retriever::{Retriever, SimilarityRetriever};
pub use synthesizer::{Answer, AnswerStatus, Synthesizer};
pub use vectorstore::{IndexedChunk, VectorStore};
