//! Local Ollama backend.
//!
//! Talks to a locally running Ollama server over its non-streaming
//! `/api/generate` endpoint. Ollama has no separate system role there, so the
//! two prompts are concatenated.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use vigil_core::config::LlmConfig;

use crate::{BackendError, LanguageBackend};

pub struct OllamaBackend {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(cfg: &LlmConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: cfg.ollama_url.trim_end_matches('/').to_string(),
            model: cfg.ollama_model.clone(),
        })
    }
}

#[async_trait]
impl LanguageBackend for OllamaBackend {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "prompt": format!("{system_prompt}\n\n{user_prompt}"),
            "stream": false,
        });

        let resp = self
            .client
            .post(format!("{}/api/generate", self.url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let payload: serde_json::Value = resp.json().await?;
        let text = payload["response"]
            .as_str()
            .ok_or_else(|| BackendError::InvalidResponse("missing response field".into()))?;

        debug!(model = %self.model, chars = text.len(), "Ollama completion received");
        Ok(text.to_string())
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
