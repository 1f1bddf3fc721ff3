use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VigilError};

/// Top-level configuration for the Vigil application.
///
/// Loaded from `~/.vigil/config.toml` by default. Built once at process
/// start and passed by reference into the components that need it; there is
/// no global configuration lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl VigilConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VigilConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not
    /// exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VigilError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay secrets from the environment so tokens never need to live in
    /// the config file. Empty file values are replaced; set values win.
    pub fn apply_env_overrides(mut self) -> Self {
        if self.monitor.api_token.is_empty() {
            if let Ok(token) = std::env::var("VIGIL_API_TOKEN") {
                self.monitor.api_token = token;
            }
        }
        if self.llm.anthropic_api_key.is_empty() {
            if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
                self.llm.anthropic_api_key = key;
            }
        }
        if self.llm.openai_api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                self.llm.openai_api_key = key;
            }
        }
        self
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Monitoring backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Base URL of the monitoring API, without trailing slash.
    pub base_url: String,
    /// API token; usually supplied via the `VIGIL_API_TOKEN` env var.
    pub api_token: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Page size for entity and problem queries.
    pub page_size: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            request_timeout_secs: 15,
            page_size: 500,
        }
    }
}

/// Language backend selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "auto", "anthropic", "openai", "ollama", or "none".
    pub provider: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub ollama_enabled: bool,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Per-call timeout in seconds. The intent resolver falls back to its
    /// deterministic tier once this elapses.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
            anthropic_api_key: String::new(),
            anthropic_model: "claude-3-5-haiku-latest".to_string(),
            openai_api_key: String::new(),
            openai_model: "gpt-4o-mini".to_string(),
            ollama_enabled: false,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            request_timeout_secs: 5,
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum number of turns kept in the in-memory history.
    pub max_history: usize,
    /// Maximum services shown by a listing response.
    pub list_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            list_limit: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VigilConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.llm.provider, "auto");
        assert_eq!(config.llm.request_timeout_secs, 5);
        assert_eq!(config.monitor.page_size, 500);
        assert_eq!(config.chat.max_history, 50);
    }

    #[test]
    fn test_parse_partial_toml_fills_defaults() {
        let toml_str = r#"
            [monitor]
            base_url = "https://env.example.com"

            [llm]
            provider = "ollama"
            ollama_enabled = true
        "#;
        let config: VigilConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.monitor.base_url, "https://env.example.com");
        assert_eq!(config.monitor.request_timeout_secs, 15);
        assert_eq!(config.llm.provider, "ollama");
        assert!(config.llm.ollama_enabled);
        assert_eq!(config.llm.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: VigilConfig = toml::from_str("").unwrap();
        assert_eq!(config.chat.list_limit, 50);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = VigilConfig::load_or_default(Path::new("/nonexistent/vigil.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_round_trip_serialization() {
        let mut config = VigilConfig::default();
        config.monitor.base_url = "https://tenant.example.com".to_string();
        config.llm.provider = "anthropic".to_string();

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: VigilConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.monitor.base_url, "https://tenant.example.com");
        assert_eq!(parsed.llm.provider, "anthropic");
    }
}
