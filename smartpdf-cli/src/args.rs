//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use smartpdf_rag::{RagConfig, RagError};

/// Chat completion backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LlmBackend {
    /// Groq (`GROQ_API_KEY`)
    Groq,
    /// OpenAI (`OPENAI_API_KEY`)
    Openai,
}

/// Embedding backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmbeddingBackend {
    /// Local hashed bag-of-words vectors; no network access
    Hash,
    /// OpenAI embeddings API (`OPENAI_API_KEY`)
    Openai,
}

/// Ask questions about PDF documents.
#[derive(Debug, Parser)]
#[command(name = "smartpdf")]
#[command(about = "Upload PDF documents and ask questions about their content", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Documents to upload as one batch (.pdf, .txt, .md)
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Ask one question and exit instead of starting the interactive prompt
    #[arg(long, short = 'q', value_name = "QUESTION")]
    pub question: Option<String>,

    /// Maximum characters per chunk
    #[arg(long, value_name = "CHARS", default_value_t = 800)]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, value_name = "CHARS", default_value_t = 150)]
    pub chunk_overlap: usize,

    /// Chunks this short or shorter are discarded before indexing
    #[arg(long, value_name = "CHARS", default_value_t = 50)]
    pub min_chunk_chars: usize,

    /// Number of chunks retrieved per question
    #[arg(long, value_name = "COUNT", default_value_t = 4)]
    pub top_k: usize,

    /// Maximum number of files in one upload batch
    #[arg(long, value_name = "COUNT", default_value_t = 3)]
    pub max_files: usize,

    /// Chat completion backend
    #[arg(long, value_name = "BACKEND", default_value = "groq")]
    pub llm: LlmBackend,

    /// Embedding backend
    #[arg(long, value_name = "BACKEND", default_value = "hash")]
    pub embeddings: EmbeddingBackend,

    /// Chat model name (defaults to the backend's preset)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Embedding model name for `--embeddings openai`
    #[arg(long, value_name = "MODEL")]
    pub embedding_model: Option<String>,

    /// Base URL of an OpenAI-compatible server for the chat backend
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Print how long each pipeline stage took
    #[arg(long)]
    pub timings: bool,
}

impl Cli {
    /// The session configuration implied by the flags.
    pub fn rag_config(&self) -> Result<RagConfig, RagError> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .min_chunk_chars(self.min_chunk_chars)
            .top_k(self.top_k)
            .max_batch_documents(self.max_files)
            .build()
    }
}
