//! Language model trait and transient-failure classification.

use async_trait::async_trait;

use crate::config::DEFAULT_TRANSIENT_INDICATORS;
use crate::error::{RagError, Result};

/// A text-completion backend.
///
/// Implementations return [`RagError::ModelTransient`] when they know the
/// failure is temporary (overload, gateway errors) and [`RagError::Model`]
/// otherwise. Timeouts belong to the implementation.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// A short name for logs.
    fn name(&self) -> &str;
}

/// Decides whether a model error message describes a transient outage.
pub trait ErrorClassifier: Send + Sync {
    /// Returns `true` if `message` indicates the backend is temporarily unavailable.
    fn is_transient(&self, message: &str) -> bool;
}

/// Matches configurable indicator substrings, ignoring case.
///
/// Defaults to `"500"` and `"cloudflare"`, which catch gateway error pages
/// that some hosted backends return during outages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordClassifier {
    indicators: Vec<String>,
}

impl KeywordClassifier {
    /// Create a classifier from indicator substrings.
    pub fn new<I, S>(indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indicators: indicators
                .into_iter()
                .map(|s| s.into().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSIENT_INDICATORS)
    }
}

impl ErrorClassifier for KeywordClassifier {
    fn is_transient(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.indicators.iter().any(|indicator| message.contains(indicator.as_str()))
    }
}

/// Whether `error` should be reported as a temporary outage.
///
/// [`RagError::ModelTransient`] always is; any other error is transient
/// when the classifier matches its description.
pub fn is_transient(error: &RagError, classifier: &dyn ErrorClassifier) -> bool {
    match error {
        RagError::ModelTransient { .. } => true,
        other => classifier.is_transient(&other.to_string()),
    }
}
