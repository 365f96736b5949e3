//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use smartpdf_rag::{
    EmbeddingProvider, HashEmbeddingProvider, LanguageModel, RagConfig, RagError, Session,
    TextLoader,
};

/// Wraps [`HashEmbeddingProvider`] and counts calls; fails on texts containing a marker.
#[derive(Default)]
pub struct CountingEmbedder {
    inner: HashEmbeddingProvider,
    pub calls: AtomicUsize,
    pub fail_marker: Option<String>,
}

impl CountingEmbedder {
    pub fn failing_on(marker: &str) -> Self {
        Self { fail_marker: Some(marker.to_string()), ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, text: &str) -> smartpdf_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(RagError::EmbeddingError {
                    provider: "counting".into(),
                    message: format!("refusing to embed text containing '{marker}'"),
                });
            }
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// What [`MockModel`] does when called.
pub enum MockReply {
    Text(String),
    Transient(String),
    Failure(String),
}

/// A scripted language model that records every prompt.
pub struct MockModel {
    reply: MockReply,
    pub prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn replying(text: &str) -> Self {
        Self { reply: MockReply::Text(text.to_string()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn with_reply(reply: MockReply) -> Self {
        Self { reply, prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, prompt: &str) -> smartpdf_rag::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Transient(message) => {
                Err(RagError::ModelTransient { provider: "mock".into(), message: message.clone() })
            }
            MockReply::Failure(message) => {
                Err(RagError::Model { provider: "mock".into(), message: message.clone() })
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A session over plain-text documents with small chunks.
pub fn text_session(embedder: Arc<dyn EmbeddingProvider>, model: Arc<MockModel>) -> Session {
    Session::builder()
        .config(
            RagConfig::builder()
                .chunk_size(200)
                .chunk_overlap(40)
                .min_chunk_chars(20)
                .top_k(4)
                .build()
                .unwrap(),
        )
        .loader(Arc::new(TextLoader))
        .embedding_provider(embedder)
        .language_model(model)
        .build()
        .unwrap()
}

pub const RUST_TEXT: &str = "Rust is a systems programming language focused on safety, speed, \
    and concurrency. It achieves memory safety without a garbage collector through its \
    ownership system.";

pub const PYTHON_TEXT: &str = "Python is a high-level interpreted programming language known for \
    its readability. It is widely used in data science, web development, and automation.";

pub const GARDEN_TEXT: &str = "Tomatoes grow best in full sun with well drained soil. Water the \
    garden deeply twice a week and mulch the beds to keep moisture in.";
