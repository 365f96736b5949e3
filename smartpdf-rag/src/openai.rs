//! OpenAI-compatible HTTP backends for embeddings and chat completions.
//!
//! This module is only available when the `openai` feature is enabled. Both
//! clients talk to any server exposing the OpenAI `/v1/embeddings` and
//! `/v1/chat/completions` endpoints (OpenAI, Groq, local inference servers).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::model::LanguageModel;

/// The default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The Groq OpenAI-compatible API base URL.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// The default model for OpenAI embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The default Groq chat model.
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// The default OpenAI chat model.
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Inputs per embeddings request. The API accepts at most 2048.
const DEFAULT_BATCH_SIZE: usize = 256;

/// Upper bound on the characters sent in one embeddings request, well
/// below the API's per-request token limit.
const MAX_BATCH_CHARS: usize = 400_000;

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        error!(error = %e, "failed to build HTTP client, using defaults");
        reqwest::Client::new()
    })
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Read a failed response body, preferring the API's error message.
async fn error_detail(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible embeddings API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `base_url` – defaults to the OpenAI API.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use smartpdf_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
    batch_size: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`) and dimensions (1536).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingError {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT),
            api_key,
            base_url: OPENAI_BASE_URL.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| RagError::EmbeddingError {
            provider: "OpenAI".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the provider at another OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Set the maximum number of inputs per request, clamped to `1..=2048`.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, 2048);
        self
    }

    fn error(message: String) -> RagError {
        RagError::EmbeddingError { provider: "OpenAI".into(), message }
    }

    /// Embed one request's worth of inputs, in input order.
    async fn embed_request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "request failed");
                Self::error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            error!(provider = "OpenAI", %status, "API error");
            return Err(Self::error(format!("API returned {status}: {detail}")));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse response");
            Self::error(format!("failed to parse response: {e}"))
        })?;

        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);
        if data.len() != texts.len() || data.iter().enumerate().any(|(i, d)| d.index != i) {
            return Err(Self::error(format!(
                "expected embeddings for indices 0..{}, got {} items",
                texts.len(),
                data.len()
            )));
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Split `texts` into consecutive slices of at most `max_inputs` items and
/// `max_chars` characters. A single text longer than `max_chars` gets a
/// slice of its own.
fn request_slices<'a, 'b>(
    texts: &'b [&'a str],
    max_inputs: usize,
    max_chars: usize,
) -> Vec<&'b [&'a str]> {
    let mut slices = Vec::new();
    let mut start = 0;
    let mut chars = 0;

    for (i, text) in texts.iter().enumerate() {
        let len = text.chars().count();
        if i > start && (i - start == max_inputs || chars + len > max_chars) {
            slices.push(&texts[start..i]);
            start = i;
            chars = 0;
        }
        chars += len;
    }
    if start < texts.len() {
        slices.push(&texts[start..]);
    }
    slices
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| Self::error("API returned empty response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let slices = request_slices(texts, self.batch_size, MAX_BATCH_CHARS);
        debug!(
            provider = "OpenAI",
            batch_size = texts.len(),
            requests = slices.len(),
            model = %self.model,
            "embedding batch"
        );

        let mut embeddings = Vec::with_capacity(texts.len());
        for slice in slices {
            embeddings.extend(self.embed_request(slice).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// A [`LanguageModel`] backed by an OpenAI-compatible chat completions API.
///
/// Sends the prompt as a single user message at temperature 0. Rate limits,
/// 5xx responses, timeouts and connection failures are reported as
/// [`RagError::ModelTransient`].
///
/// # Example
///
/// ```rust,ignore
/// use smartpdf_rag::openai::ChatCompletionsModel;
///
/// let model = ChatCompletionsModel::groq(std::env::var("GROQ_API_KEY")?)?;
/// let text = model.complete("Say hello").await?;
/// ```
pub struct ChatCompletionsModel {
    client: reqwest::Client,
    provider: String,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionsModel {
    /// Create a client for any OpenAI-compatible server.
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let provider = provider.into();
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Model { provider, message: "API key must not be empty".into() });
        }

        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT),
            provider,
            api_key,
            base_url: base_url.into(),
            model: model.into(),
            temperature: 0.0,
        })
    }

    /// Groq with `llama-3.3-70b-versatile`.
    pub fn groq(api_key: impl Into<String>) -> Result<Self> {
        Self::new("Groq", api_key, GROQ_BASE_URL, DEFAULT_GROQ_MODEL)
    }

    /// OpenAI with `gpt-4o-mini`.
    pub fn openai(api_key: impl Into<String>) -> Result<Self> {
        Self::new("OpenAI", api_key, OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at another OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn transient(&self, message: String) -> RagError {
        RagError::ModelTransient { provider: self.provider.clone(), message }
    }

    fn failure(&self, message: String) -> RagError {
        RagError::Model { provider: self.provider.clone(), message }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            provider = %self.provider,
            model = %self.model,
            prompt_len = prompt.len(),
            "chat completion"
        );

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.provider, error = %e, "request failed");
                if e.is_timeout() || e.is_connect() {
                    self.transient(format!("request failed: {e}"))
                } else {
                    self.failure(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            error!(provider = %self.provider, %status, "API error");
            let message = format!("API returned {status}: {detail}");
            return Err(if status.is_server_error() || status.as_u16() == 429 {
                self.transient(message)
            } else {
                self.failure(message)
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = %self.provider, error = %e, "failed to parse response");
            self.failure(format!("failed to parse response: {e}"))
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| self.failure("API returned no completion".into()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_respect_input_count() {
        let texts = ["a"; 5];
        let slices = request_slices(&texts, 2, MAX_BATCH_CHARS);
        let sizes: Vec<usize> = slices.iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn slices_respect_character_budget() {
        let texts = ["aaaa", "bbbb", "cc", "dddddddddd", "e"];
        let slices = request_slices(&texts, 100, 8);
        assert_eq!(
            slices,
            vec![&["aaaa", "bbbb"][..], &["cc"][..], &["dddddddddd"][..], &["e"][..]]
        );
    }

    #[test]
    fn empty_input_needs_no_request() {
        assert!(request_slices(&[], 10, 10).is_empty());
    }
}
