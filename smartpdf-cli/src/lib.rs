//! # smartpdf-cli
//!
//! Terminal front-end for `smartpdf-rag`: uploads a batch of documents,
//! reports what was indexed, then answers questions one-shot or from an
//! interactive prompt.

pub mod args;
pub mod backend;
pub mod console;
pub mod report;
pub mod upload;

pub use args::{Cli, EmbeddingBackend, LlmBackend};
