//! Tests for prompt construction, provenance and sentinel answers.

mod common;

use std::sync::Arc;

use common::{MockModel, MockReply};
use smartpdf_rag::model::is_transient;
use smartpdf_rag::synthesizer::{NO_DOCUMENTS_ANSWER, UNAVAILABLE_ANSWER, build_prompt};
use smartpdf_rag::{
    Answer, AnswerStatus, Chunk, KeywordClassifier, RagError, SearchResult, Synthesizer,
};

fn result(text: &str, source: &str) -> SearchResult {
    SearchResult { chunk: Chunk::new(text, source, Some(0)), score: 0.5 }
}

#[tokio::test]
async fn empty_context_returns_sentinel_without_calling_model() {
    let model = Arc::new(MockModel::replying("should not be used"));
    let synthesizer = Synthesizer::new(model.clone());

    let answer = synthesizer.answer("What is Rust?", &[]).await;

    assert_eq!(answer.text, NO_DOCUMENTS_ANSWER);
    assert!(answer.sources.is_empty());
    assert_eq!(answer.status, AnswerStatus::NoDocuments);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn stuffs_every_chunk_and_deduplicates_sources() {
    let model = Arc::new(MockModel::replying("Rust uses ownership."));
    let synthesizer = Synthesizer::new(model.clone());
    let chunks = vec![
        result("Ownership rules apply.", "b.pdf"),
        result("Borrowing is checked.", "a.pdf"),
        result("Lifetimes annotate references.", "b.pdf"),
    ];

    let answer = synthesizer.answer("How does Rust manage memory?", &chunks).await;

    assert_eq!(answer.text, "Rust uses ownership.");
    assert_eq!(answer.status, AnswerStatus::Answered);
    assert_eq!(answer.sources.iter().collect::<Vec<_>>(), vec!["a.pdf", "b.pdf"]);
    assert_eq!(model.calls(), 1);

    let prompt = model.last_prompt().unwrap();
    assert!(prompt.contains(
        "Ownership rules apply.\n\nBorrowing is checked.\n\nLifetimes annotate references."
    ));
    assert!(prompt.contains("Question: How does Rust manage memory?"));
}

#[test]
fn prompt_puts_context_before_question() {
    let prompt = build_prompt("Why?", &[result("Because.", "x.pdf")]);
    let context_at = prompt.find("Because.").unwrap();
    let question_at = prompt.find("Question: Why?").unwrap();
    assert!(context_at < question_at);
    assert!(prompt.ends_with("Helpful Answer:"));
}

#[tokio::test]
async fn transient_model_error_yields_unavailable_sentinel() {
    let model = Arc::new(MockModel::with_reply(MockReply::Transient("rate limited".into())));
    let answer = Synthesizer::new(model).answer("q", &[result("ctx", "a.pdf")]).await;

    assert_eq!(answer.text, UNAVAILABLE_ANSWER);
    assert_eq!(answer.status, AnswerStatus::Unavailable);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn model_error_mentioning_gateway_failure_is_transient() {
    for message in ["Error code: 500 - internal", "Blocked by CloudFlare"] {
        let model = Arc::new(MockModel::with_reply(MockReply::Failure(message.into())));
        let answer = Synthesizer::new(model).answer("q", &[result("ctx", "a.pdf")]).await;
        assert_eq!(answer.text, UNAVAILABLE_ANSWER, "message: {message}");
    }
}

#[tokio::test]
async fn other_model_errors_embed_the_description() {
    let model = Arc::new(MockModel::with_reply(MockReply::Failure("invalid api key".into())));
    let answer = Synthesizer::new(model).answer("q", &[result("ctx", "a.pdf")]).await;

    assert!(answer.text.starts_with("❌ Error: "));
    assert!(answer.text.contains("invalid api key"));
    assert_eq!(answer.status, AnswerStatus::Failed);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn custom_classifier_replaces_default_indicators() {
    let model = Arc::new(MockModel::with_reply(MockReply::Failure("service overloaded".into())));
    let synthesizer =
        Synthesizer::new(model).with_classifier(Arc::new(KeywordClassifier::new(["overloaded"])));

    let answer = synthesizer.answer("q", &[result("ctx", "a.pdf")]).await;
    assert_eq!(answer.status, AnswerStatus::Unavailable);
}

#[test]
fn sentinel_mapping_is_pure() {
    let classifier = KeywordClassifier::default();
    let transient = RagError::ModelTransient { provider: "p".into(), message: "timeout".into() };
    let gateway = RagError::Model { provider: "p".into(), message: "HTTP 500".into() };
    let permanent = RagError::Model { provider: "p".into(), message: "bad request".into() };

    assert!(is_transient(&transient, &classifier));
    assert!(is_transient(&gateway, &classifier));
    assert!(!is_transient(&permanent, &classifier));

    assert_eq!(Answer::from_error(&transient, &classifier).status, AnswerStatus::Unavailable);
    let failed = Answer::from_error(&permanent, &classifier);
    assert_eq!(failed.status, AnswerStatus::Failed);
    assert!(failed.text.contains("bad request"));
}
