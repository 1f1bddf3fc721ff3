//! Anthropic Messages API backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use vigil_core::config::LlmConfig;

use crate::{BackendError, LanguageBackend};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 512;

pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    pub fn new(cfg: &LlmConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: cfg.anthropic_api_key.clone(),
            model: cfg.anthropic_model.clone(),
        })
    }
}

#[async_trait]
impl LanguageBackend for AnthropicBackend {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": [{"role": "user", "content": user_prompt}],
        });

        let resp = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let payload: serde_json::Value = resp.json().await?;
        let text = payload["content"][0]["text"]
            .as_str()
            .ok_or_else(|| BackendError::InvalidResponse("missing content[0].text".into()))?;

        debug!(model = %self.model, chars = text.len(), "Anthropic completion received");
        Ok(text.to_string())
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}
