//! OpenAI Chat Completions backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use vigil_core::config::LlmConfig;

use crate::{BackendError, LanguageBackend};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 512;

pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(cfg: &LlmConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: cfg.openai_api_key.clone(),
            model: cfg.openai_model.clone(),
        })
    }
}

#[async_trait]
impl LanguageBackend for OpenAiBackend {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });

        let resp = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let payload: serde_json::Value = resp.json().await?;
        let text = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                BackendError::InvalidResponse("missing choices[0].message.content".into())
            })?;

        debug!(model = %self.model, chars = text.len(), "OpenAI completion received");
        Ok(text.to_string())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
