//! LLM integration for the analysis gateway.
//!
//! Supports:
//! - **Gemini**: Google `generateContent` API
//! - **OpenRouter**: OpenAI-compatible chat completions
//! - **OpenAI**: chat completions
//!
//! Each provider is an explicit client handle built from an `LlmConfig` and
//! injected into the gateway. There are no global clients.

pub mod gemini;
pub mod openai_compat;
pub mod provider;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use provider::*;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Gemini,
    OpenRouter,
    OpenAi,
}

impl LlmBackend {
    /// Environment variable holding the API key for this backend.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_AI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Default endpoint (or base URL, for Gemini).
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => gemini::GEMINI_API_BASE,
            Self::OpenRouter => openai_compat::OPENROUTER_API_URL,
            Self::OpenAi => openai_compat::OPENAI_API_URL,
        }
    }
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!("unknown LLM backend '{other}'")),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
            Self::OpenAi => "openai",
        };
        write!(f, "{s}")
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    /// `None` builds a client whose every call fails with `MissingApiKey`.
    pub api_key: Option<secrecy::SecretString>,
    pub model: String,
    /// Overrides `LlmBackend::default_endpoint`.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let endpoint = config
        .endpoint
        .clone()
        .unwrap_or_else(|| config.backend.default_endpoint().to_string());

    if config.api_key.is_none() {
        tracing::warn!(
            backend = %config.backend,
            env = config.backend.api_key_env(),
            "No API key configured; analyses on this provider will use fallback results"
        );
    }

    let provider: Arc<dyn LlmProvider> = match config.backend {
        LlmBackend::Gemini => Arc::new(GeminiProvider::new(
            endpoint,
            config.api_key.clone(),
            &config.model,
            config.timeout,
        )?),
        LlmBackend::OpenRouter | LlmBackend::OpenAi => Arc::new(OpenAiCompatProvider::new(
            config.backend.to_string(),
            endpoint,
            config.api_key.clone(),
            &config.model,
            config.timeout,
        )?),
    };

    tracing::info!(backend = %config.backend, model = %config.model, "LLM provider ready");
    Ok(provider)
}
