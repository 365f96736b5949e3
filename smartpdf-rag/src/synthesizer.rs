//! Answer synthesis: stuff retrieved chunks into one prompt and ask the model.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::document::SearchResult;
use crate::error::RagError;
use crate::model::{ErrorClassifier, KeywordClassifier, LanguageModel, is_transient};

/// Returned when a question arrives before any document was indexed.
pub const NO_DOCUMENTS_ANSWER: &str =
    "No documents processed yet. Please upload and process PDF files first.";

/// Returned when the model backend is temporarily unavailable.
pub const UNAVAILABLE_ANSWER: &str =
    "⚠️ The AI service is temporarily unavailable. Please try again in a few moments.";

/// How an [`Answer`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// The model answered from retrieved context.
    Answered,
    /// Nothing has been indexed yet.
    NoDocuments,
    /// The backend was temporarily unavailable.
    Unavailable,
    /// Answering failed for another reason; the text carries the description.
    Failed,
}

/// The result of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// User-facing answer text.
    pub text: String,
    /// Names of the documents whose chunks were given to the model, sorted.
    pub sources: BTreeSet<String>,
    /// How the answer was produced.
    pub status: AnswerStatus,
}

impl Answer {
    /// The "no documents processed" sentinel.
    pub fn no_documents() -> Self {
        Self {
            text: NO_DOCUMENTS_ANSWER.to_string(),
            sources: BTreeSet::new(),
            status: AnswerStatus::NoDocuments,
        }
    }

    /// Map a failure to its user-facing sentinel answer.
    ///
    /// Transient failures get the fixed unavailability message; anything
    /// else embeds the error description.
    pub fn from_error(error: &RagError, classifier: &dyn ErrorClassifier) -> Self {
        if is_transient(error, classifier) {
            Self {
                text: UNAVAILABLE_ANSWER.to_string(),
                sources: BTreeSet::new(),
                status: AnswerStatus::Unavailable,
            }
        } else {
            Self {
                text: format!("❌ Error: {error}"),
                sources: BTreeSet::new(),
                status: AnswerStatus::Failed,
            }
        }
    }

    /// Whether the model produced this answer.
    pub fn is_answered(&self) -> bool {
        self.status == AnswerStatus::Answered
    }
}

/// Build the stuff-strategy prompt: every chunk verbatim, then the question.
pub fn build_prompt(question: &str, chunks: &[SearchResult]) -> String {
    let context =
        chunks.iter().map(|result| result.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, \
         don't try to make up an answer.\n\n\
         {context}\n\n\
         Question: {question}\n\
         Helpful Answer:"
    )
}

/// Composes prompts from retrieved chunks and invokes the language model once.
pub struct Synthesizer {
    model: Arc<dyn LanguageModel>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl Synthesizer {
    /// Create a synthesizer using the default [`KeywordClassifier`].
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model, classifier: Arc::new(KeywordClassifier::default()) }
    }

    /// Replace the transient-failure classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// The classifier used to pick sentinel answers.
    pub fn classifier(&self) -> &dyn ErrorClassifier {
        self.classifier.as_ref()
    }

    /// Answer `question` from `chunks`.
    ///
    /// Never fails: empty context yields the "no documents" sentinel without
    /// calling the model, and model errors become sentinel answers.
    pub async fn answer(&self, question: &str, chunks: &[SearchResult]) -> Answer {
        if chunks.is_empty() {
            return Answer::no_documents();
        }

        let prompt = build_prompt(question, chunks);
        match self.model.complete(&prompt).await {
            Ok(text) => {
                let sources: BTreeSet<String> =
                    chunks.iter().map(|result| result.chunk.source().to_string()).collect();
                info!(
                    model = self.model.name(),
                    context_chunks = chunks.len(),
                    source_count = sources.len(),
                    "answered question"
                );
                Answer { text, sources, status: AnswerStatus::Answered }
            }
            Err(e) => {
                let answer = Answer::from_error(&e, self.classifier.as_ref());
                if answer.status == AnswerStatus::Unavailable {
                    warn!(model = self.model.name(), error = %e, "model temporarily unavailable");
                } else {
                    error!(model = self.model.name(), error = %e, "error answering question");
                }
                answer
            }
        }
    }
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer").field("model", &self.model.name()).finish_non_exhaustive()
    }
}
