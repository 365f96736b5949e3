//! Data types for documents, pages, chunks, and search results.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// An uploaded source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name, unique within an upload batch.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Create a document from a name and its raw bytes.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }

    /// Read a document from disk, naming it after the file name component.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Lower-cased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name).extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

/// The extracted text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index within the document.
    pub index: usize,
    /// Extracted page text.
    pub text: String,
}

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Name of the source document.
    pub source: String,
    /// Zero-based page index, when the loader reports pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

/// A contiguous span of text drawn from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// Source attribution.
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk attributed to `source` and `page`.
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: Option<usize>) -> Self {
        Self { text: text.into(), metadata: ChunkMetadata { source: source.into(), page } }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the chunk has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Name of the source document.
    pub fn source(&self) -> &str {
        &self.metadata.source
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
