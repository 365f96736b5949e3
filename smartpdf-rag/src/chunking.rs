//! Splitting page text into overlapping, size-bounded chunks.
//!
//! [`RecursiveChunker`] tries separators in priority order: paragraph
//! break, line break, sentence end, whitespace, and finally an arbitrary
//! character cut. A lower-priority separator is only used for a piece that
//! the higher-priority one could not bring under the size limit.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::{DEFAULT_SEPARATORS, RagConfig};
use crate::document::{Chunk, Page};

/// A strategy for splitting a loaded document into chunks.
pub trait Chunker: Send + Sync {
    /// Split the pages of the document named `source` into chunks.
    ///
    /// Chunks are returned in page order and tagged with `source` and the
    /// page index. Blank pages produce no chunks.
    fn chunk(&self, source: &str, pages: &[Page]) -> Vec<Chunk>;
}

/// Splits text hierarchically by a prioritized list of separators.
///
/// Lengths are counted in characters. Every chunk is at most `chunk_size`
/// long and consecutive chunks share at most `chunk_overlap` characters.
///
/// # Example
///
/// ```rust
/// use smartpdf_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(10, 0);
/// assert_eq!(chunker.split_text("AAAA. BBBB. CCCC."), vec!["AAAA.", "BBBB.", "CCCC."]);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker` with the default separators.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: maximum number of characters shared by consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a chunker from the size, overlap and separators in `config`.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
            .with_separators(config.separators.iter().cloned())
    }

    /// Replace the separators, highest priority first.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Split a single text into trimmed, non-empty spans.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.split_into(text, &self.separators, &mut chunks);
        chunks
    }

    fn split_into(&self, text: &str, separators: &[String], out: &mut Vec<String>) {
        // Fall back to a character cut when no listed separator occurs.
        let (separator, remaining) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(sep.as_str()))
            .map(|(i, sep)| (sep.as_str(), &separators[i + 1..]))
            .unwrap_or(("", &[]));

        let pieces = if separator.is_empty() {
            split_chars(text)
        } else {
            split_keeping_separator(text, separator)
        };

        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                self.merge_into(&pending, out);
                pending.clear();
            }
            if separator.is_empty() {
                // A single character cannot be split further.
                push_span(out, piece);
            } else {
                self.split_into(piece, remaining, out);
            }
        }
        if !pending.is_empty() {
            self.merge_into(&pending, out);
        }
    }

    /// Greedily merge small pieces into spans, carrying a tail of at most
    /// `chunk_overlap` characters from one span into the next.
    ///
    /// A window holding only the carried tail plus whitespace is not emitted
    /// again; every other span is kept, even when it repeats earlier text.
    fn merge_into(&self, pieces: &[&str], out: &mut Vec<String>) {
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;
        // Whether the window gained non-blank text since the last span.
        let mut fresh = false;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if fresh {
                    push_span(out, &join(&window));
                    fresh = false;
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
            fresh |= !piece.trim().is_empty();
        }

        if fresh {
            push_span(out, &join(&window));
        }
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, source: &str, pages: &[Page]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = pages
            .iter()
            .flat_map(|page| {
                self.split_text(&page.text)
                    .into_iter()
                    .map(move |text| Chunk::new(text, source, Some(page.index)))
            })
            .collect();

        debug!(
            document = source,
            page_count = pages.len(),
            chunk_count = chunks.len(),
            "split document"
        );
        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join(window: &VecDeque<(&str, usize)>) -> String {
    window.iter().map(|(piece, _)| *piece).collect()
}

/// Trim and append a span, skipping blanks.
fn push_span(out: &mut Vec<String>, span: &str) {
    let span = span.trim();
    if !span.is_empty() {
        out.push(span.to_string());
    }
}

/// Split text at a separator while keeping the separator attached to the preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

fn split_chars(text: &str) -> Vec<&str> {
    text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_separator_on_preceding_piece() {
        assert_eq!(split_keeping_separator("a. b. c", ". "), vec!["a. ", "b. ", "c"]);
        assert_eq!(split_keeping_separator("no match", ". "), vec!["no match"]);
    }

    #[test]
    fn splits_multibyte_characters_whole() {
        assert_eq!(split_chars("héé"), vec!["h", "é", "é"]);
    }

    #[test]
    fn skips_blank_spans_but_keeps_repeats() {
        let mut out = vec!["abc".to_string()];
        push_span(&mut out, "  abc\n");
        push_span(&mut out, " \n ");
        push_span(&mut out, "def ");
        assert_eq!(out, vec!["abc", "abc", "def"]);
    }

    #[test]
    fn carried_tail_with_only_whitespace_is_not_emitted_twice() {
        let chunker = RecursiveChunker::new(10, 6);
        let mut out = Vec::new();
        chunker.merge_into(&["abcd ", "efgh ", " ", " "], &mut out);
        assert_eq!(out, vec!["abcd efgh"]);
    }
}
