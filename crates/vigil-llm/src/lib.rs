//! Generative-language backends.
//!
//! A single [`LanguageBackend`] capability replaces per-provider branching:
//! callers hold `Arc<dyn LanguageBackend>` and never know which vendor is
//! behind it. Concrete backends exist for two hosted APIs (Anthropic,
//! OpenAI), a local Ollama server, and a no-op fallback used when nothing is
//! configured.

pub mod anthropic;
pub mod noop;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use vigil_core::config::LlmConfig;

pub use anthropic::AnthropicBackend;
pub use noop::NoopBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Errors from a language backend call.
///
/// Callers treat every variant the same way (fall back to deterministic
/// behavior), so the variants exist for logging, not for branching.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no language backend configured")]
    Disabled,
    #[error("backend request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Http(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Http(err.to_string())
        }
    }
}

/// A text-generation capability with a bounded per-call timeout.
#[async_trait]
pub trait LanguageBackend: Send + Sync {
    /// Generate a completion for the given prompts.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, BackendError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Whether this backend can actually produce text. The no-op backend
    /// reports `false` so callers can skip the attempt entirely.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Build the backend selected by configuration.
///
/// `provider = "auto"` picks the first backend with credentials, in order
/// anthropic, openai, ollama; anything unconfigured or `"none"` yields the
/// no-op backend.
pub fn from_config(cfg: &LlmConfig) -> Arc<dyn LanguageBackend> {
    let choice = if cfg.provider == "auto" {
        if !cfg.anthropic_api_key.is_empty() {
            "anthropic"
        } else if !cfg.openai_api_key.is_empty() {
            "openai"
        } else if cfg.ollama_enabled {
            "ollama"
        } else {
            "none"
        }
    } else {
        cfg.provider.as_str()
    };

    let backend: Arc<dyn LanguageBackend> = match choice {
        "anthropic" => match AnthropicBackend::new(cfg) {
            Ok(b) => Arc::new(b),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build anthropic backend, disabling LLM tier");
                Arc::new(NoopBackend)
            }
        },
        "openai" => match OpenAiBackend::new(cfg) {
            Ok(b) => Arc::new(b),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build openai backend, disabling LLM tier");
                Arc::new(NoopBackend)
            }
        },
        "ollama" => match OllamaBackend::new(cfg) {
            Ok(b) => Arc::new(b),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build ollama backend, disabling LLM tier");
                Arc::new(NoopBackend)
            }
        },
        other => {
            if other != "none" {
                tracing::warn!(provider = other, "Unknown LLM provider, disabling LLM tier");
            }
            Arc::new(NoopBackend)
        }
    };

    tracing::info!(backend = backend.name(), "Language backend selected");
    backend
}
