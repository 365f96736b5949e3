//! Whitespace normalization and removal of degenerate chunks.

use tracing::debug;

use crate::document::Chunk;

/// Drops chunks too short to carry retrieval signal (headers, page numbers,
/// extraction artifacts) and collapses whitespace in the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkFilter {
    min_chars: usize,
}

impl ChunkFilter {
    /// Keep only chunks whose normalized length exceeds `min_chars`.
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// The length a normalized chunk must exceed to survive.
    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Normalize and filter `chunks`, preserving order and metadata.
    pub fn apply(&self, chunks: Vec<Chunk>) -> Vec<Chunk> {
        let before = chunks.len();
        let kept: Vec<Chunk> = chunks
            .into_iter()
            .filter_map(|mut chunk| {
                chunk.text = normalize_whitespace(&chunk.text);
                (chunk.len() > self.min_chars).then_some(chunk)
            })
            .collect();

        debug!(before, after = kept.len(), min_chars = self.min_chars, "filtered chunks");
        kept
    }
}

impl Default for ChunkFilter {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
