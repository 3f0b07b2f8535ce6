//! LLM settings
//!
//! Deserialized from the application config (file + `PLAYFORGE__LLM__*`
//! environment overlay); every field has a default so an empty source works.

use crate::provider::{ProviderConfig, DASHSCOPE_BASE_URL};
use playforge_error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API key shared by every route; routes differ only by model.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model behind the `default` / `dashscope` selector.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_kimi_model")]
    pub kimi_model: String,

    #[serde(default = "default_qwen3_coder_model")]
    pub qwen3_coder_model: String,

    #[serde(default = "default_deepseek_model")]
    pub deepseek_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<usize>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DASHSCOPE_BASE_URL.to_string()
}

fn default_model() -> String {
    "qwen-plus-2025-07-28".to_string()
}

fn default_kimi_model() -> String {
    "Moonshot-Kimi-K2-Instruct".to_string()
}

fn default_qwen3_coder_model() -> String {
    "qwen3-coder-plus".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-v3.1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> Option<usize> {
    Some(4000)
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            kimi_model: default_kimi_model(),
            qwen3_coder_model: default_qwen3_coder_model(),
            deepseek_model: default_deepseek_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmSettings {
    /// The configured key, or `DASHSCOPE_API_KEY` when none is set.
    /// Blank values count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::config_invalid(format!(
                "llm.base_url must be an http(s) URL, got '{}'",
                self.base_url
            ))
            .with_context("field", "llm.base_url"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config_invalid(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.temperature
            ))
            .with_context("field", "llm.temperature"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config_invalid("llm.timeout_secs must be positive")
                .with_context("field", "llm.timeout_secs"));
        }
        if self.default_model.trim().is_empty() {
            return Err(Error::config_invalid("llm.default_model cannot be empty")
                .with_context("field", "llm.default_model"));
        }
        Ok(())
    }

    /// Provider config for one model on the shared endpoint.
    pub fn provider_config(&self, api_key: &str, model: &str) -> ProviderConfig {
        let mut config = ProviderConfig::dashscope(api_key, model)
            .with_base_url(self.base_url.clone())
            .with_temperature(self.temperature)
            .with_timeout(self.timeout_secs);
        if let Some(max) = self.max_tokens {
            config = config.with_max_tokens(max);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LlmSettings::default();
        assert_eq!(settings.default_model, "qwen-plus-2025-07-28");
        assert_eq!(settings.kimi_model, "Moonshot-Kimi-K2-Instruct");
        assert_eq!(settings.timeout_secs, 300);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let settings: LlmSettings =
            serde_json::from_value(serde_json::json!({ "temperature": 0.3 })).unwrap();
        assert_eq!(settings.temperature, 0.3);
        assert_eq!(settings.base_url, DASHSCOPE_BASE_URL);
        assert_eq!(settings.max_tokens, Some(4000));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = LlmSettings {
            base_url: "dashscope.aliyuncs.com".into(),
            ..LlmSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = LlmSettings {
            temperature: 3.5,
            ..LlmSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = LlmSettings {
            timeout_secs: 0,
            ..LlmSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_configured_key_wins() {
        let settings = LlmSettings {
            api_key: Some("sk-config".into()),
            ..LlmSettings::default()
        };
        assert_eq!(settings.resolved_api_key().as_deref(), Some("sk-config"));
    }

    #[test]
    fn test_provider_config_carries_settings() {
        let settings = LlmSettings {
            base_url: "http://localhost:8000/v1".into(),
            timeout_secs: 42,
            ..LlmSettings::default()
        };
        let config = settings.provider_config("sk", "qwen3-coder-plus");
        assert_eq!(config.base_url, "http://localhost:8000/v1");
        assert_eq!(config.model, "qwen3-coder-plus");
        assert_eq!(config.api_key, "sk");
        assert_eq!(config.timeout_secs, 42);
        assert_eq!(config.max_tokens, Some(4000));
    }
}
