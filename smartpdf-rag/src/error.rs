//! Error types for the `smartpdf-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting documents or answering questions.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document bytes could not be parsed into pages.
    #[error("Failed to load '{document}': {message}")]
    Load {
        /// Name of the document that failed to load.
        document: String,
        /// A description of the failure.
        message: String,
    },

    /// The document loaded but produced no chunk long enough to index.
    #[error("No usable text found in '{document}'")]
    NoUsableText {
        /// Name of the document.
        document: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The language model backend is temporarily unavailable.
    #[error("Model temporarily unavailable ({provider}): {message}")]
    ModelTransient {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Any other language model failure.
    #[error("Model error ({provider}): {message}")]
    Model {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An upload batch contained more documents than allowed.
    #[error(
        "You can upload a maximum of {max} files. Please remove {} file(s).",
        count.saturating_sub(*max)
    )]
    BatchLimitExceeded {
        /// Number of documents in the rejected batch.
        count: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The session was reset while the document was being indexed.
    #[error("Session was reset while '{document}' was being processed")]
    SessionReset {
        /// Name of the document.
        document: String,
    },

    /// A question was empty or whitespace only.
    #[error("Please enter a question first.")]
    EmptyQuestion,

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    /// Returns `true` for errors scoped to a single document in a batch.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::Load { .. }
                | Self::NoUsableText { .. }
                | Self::EmbeddingError { .. }
                | Self::VectorStoreError { .. }
                | Self::SessionReset { .. }
        )
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
