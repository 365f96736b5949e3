//! Document loaders that turn raw bytes into page text.
//!
//! - [`PdfLoader`]: PDF via `lopdf` (feature `pdf`, enabled by default)
//! - [`TextLoader`]: UTF-8 text, pages separated by form feeds
//! - [`AutoLoader`]: picks one of the above from the file extension

use tracing::{debug, warn};

use crate::document::{Document, Page};
use crate::error::{RagError, Result};

/// Extracts ordered page text from a [`Document`].
pub trait DocumentLoader: Send + Sync {
    /// Parse the document into pages, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] when the bytes are not a parseable
    /// document of the expected format.
    fn load(&self, document: &Document) -> Result<Vec<Page>>;
}

fn load_error(document: &Document, message: impl Into<String>) -> RagError {
    RagError::Load { document: document.name.clone(), message: message.into() }
}

/// Loads PDF documents with `lopdf`.
///
/// Pages whose text cannot be extracted are kept as empty pages so page
/// indices stay aligned with the PDF; the chunk filter drops them later.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

#[cfg(feature = "pdf")]
impl DocumentLoader for PdfLoader {
    fn load(&self, document: &Document) -> Result<Vec<Page>> {
        let pdf = lopdf::Document::load_mem(&document.bytes)
            .map_err(|e| load_error(document, format!("not a readable PDF: {e}")))?;

        if pdf.is_encrypted() {
            return Err(load_error(document, "encrypted PDFs are not supported"));
        }

        let page_numbers: Vec<u32> = pdf.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(load_error(document, "PDF has no pages"));
        }

        let pages = page_numbers
            .iter()
            .enumerate()
            .map(|(index, number)| {
                let text = pdf.extract_text(&[*number]).unwrap_or_else(|e| {
                    warn!(
                        document = %document.name,
                        page = index,
                        error = %e,
                        "page text extraction failed"
                    );
                    String::new()
                });
                Page { index, text }
            })
            .collect::<Vec<_>>();

        debug!(document = %document.name, page_count = pages.len(), "loaded PDF");
        Ok(pages)
    }
}

/// Loads UTF-8 text. A form feed (`\x0C`) starts a new page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, document: &Document) -> Result<Vec<Page>> {
        let text = std::str::from_utf8(&document.bytes)
            .map_err(|e| load_error(document, format!("not valid UTF-8 text: {e}")))?;

        Ok(text
            .split('\x0C')
            .enumerate()
            .map(|(index, text)| Page { index, text: text.to_string() })
            .collect())
    }
}

/// Chooses a loader from the document's file extension.
///
/// `.pdf` goes to [`PdfLoader`]; `.txt`, `.text` and `.md` go to [`TextLoader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoLoader;

impl DocumentLoader for AutoLoader {
    fn load(&self, document: &Document) -> Result<Vec<Page>> {
        match document.extension().as_deref() {
            #[cfg(feature = "pdf")]
            Some("pdf") => PdfLoader.load(document),
            #[cfg(not(feature = "pdf"))]
            Some("pdf") => Err(load_error(document, "PDF support is not enabled in this build")),
            Some("txt" | "text" | "md") => TextLoader.load(document),
            Some(other) => Err(load_error(document, format!("unsupported file type '.{other}'"))),
            None => Err(load_error(document, "file has no extension")),
        }
    }
}
