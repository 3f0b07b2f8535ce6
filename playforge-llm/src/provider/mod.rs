//! # Chat-completion providers
//!
//! `LlmProvider` is the seam between game agents and a model backend. It is
//! object safe so the router can hand out `Arc<dyn LlmProvider>`, and agents
//! only ever call [`LlmProvider::chat`].
//!
//! The one real backend, [`OpenAIProvider`], speaks the OpenAI wire format.
//! DashScope's compatible mode accepts it for every model the router knows
//! (Qwen, Kimi, Deepseek), so a route is just a model name on a shared
//! endpoint.

pub mod openai;

pub use openai::OpenAIProvider;

use async_trait::async_trait;
use playforge_error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Base URL of DashScope's OpenAI-compatible endpoint.
pub const DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Whole-page HTML generation is slow.
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// One chat-completion call. Unset fields fall back to the provider's config.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages, ..Default::default() }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Option<String>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    /// Hit `max_tokens`; the page is probably truncated.
    Length,
    ContentFilter,
    Unknown,
}

impl FinishReason {
    pub fn parse(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Backend failures, before they are folded into [`playforge_error::Error`].
#[derive(Debug, ThisError)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("rate limited")]
    RateLimited,
    #[error("request rejected: {0}")]
    InvalidRequest(String),
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("no content in response")]
    EmptyResponse,
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Fold into the workspace error, keeping `self` as the source.
    pub fn into_error(self) -> Error {
        let kind = match &self {
            Self::Network(_) | Self::Timeout => ErrorKind::NetworkFailed,
            Self::Api { .. } | Self::EmptyResponse | Self::Other(_) => ErrorKind::InferenceFailed,
            Self::Parse(_) => ErrorKind::ParseFailed,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::InvalidRequest(_) => ErrorKind::InvalidArgument,
            Self::ModelNotFound(_) => ErrorKind::ProviderUnavailable,
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
        };
        let mut err = Error::new(kind, format!("LLM call failed: {}", self))
            .with_operation("provider::complete");
        if let Self::Api { status, .. } = &self {
            err = err.with_context("status", status.to_string());
        }
        err.set_source(self)
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Backend label for logs, e.g. `"dashscope"`.
    fn name(&self) -> &str;

    /// Model used when a request does not name one.
    fn default_model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    async fn prompt(&self, prompt: &str) -> Result<String, ProviderError> {
        self.chat(vec![ChatMessage::user(prompt)]).await
    }

    /// Text of the first choice. Blank content counts as
    /// [`ProviderError::EmptyResponse`].
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ProviderError> {
        let response = self.complete(CompletionRequest::new(messages)).await?;
        match response.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(ProviderError::EmptyResponse),
        }
    }
}

/// Connection and sampling settings for one [`OpenAIProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub name: String,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn dashscope(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "dashscope".to_string(),
            api_key: api_key.into(),
            base_url: DASHSCOPE_BASE_URL.to_string(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
