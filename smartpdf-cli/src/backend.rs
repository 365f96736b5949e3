//! Construction of the embedding and chat backends from the command line.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use smartpdf_rag::{
    ChatCompletionsModel, EmbeddingProvider, HashEmbeddingProvider, LanguageModel,
    OpenAIEmbeddingProvider, Session,
};

use crate::args::{Cli, EmbeddingBackend, LlmBackend};

fn require_key<'a>(key: &'a Option<String>, var: &str) -> Result<&'a str> {
    match key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => bail!("{var} must be set (in the environment or a .env file)"),
    }
}

pub fn embedder(cli: &Cli) -> Result<Arc<dyn EmbeddingProvider>> {
    match cli.embeddings {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbeddingProvider::default())),
        EmbeddingBackend::Openai => {
            let key = require_key(&cli.openai_api_key, "OPENAI_API_KEY")?;
            let mut provider = OpenAIEmbeddingProvider::new(key)?;
            if let Some(model) = &cli.embedding_model {
                provider = provider.with_model(model);
            }
            Ok(Arc::new(provider))
        }
    }
}

pub fn language_model(cli: &Cli) -> Result<Arc<dyn LanguageModel>> {
    let mut model = match cli.llm {
        LlmBackend::Groq => {
            ChatCompletionsModel::groq(require_key(&cli.groq_api_key, "GROQ_API_KEY")?)?
        }
        LlmBackend::Openai => {
            ChatCompletionsModel::openai(require_key(&cli.openai_api_key, "OPENAI_API_KEY")?)?
        }
    };
    if let Some(name) = &cli.model {
        model = model.with_model(name);
    }
    if let Some(url) = &cli.base_url {
        model = model.with_base_url(url);
    }
    Ok(Arc::new(model))
}

/// Build a session from the flags, checking the configuration first.
pub fn session(cli: &Cli) -> Result<Session> {
    let config = cli.rag_config().context("invalid chunking or retrieval options")?;
    let session = Session::builder()
        .config(config)
        .embedding_provider(embedder(cli)?)
        .language_model(language_model(cli)?)
        .build()?;
    Ok(session)
}
