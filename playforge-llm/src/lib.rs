//! # Playforge LLM
//!
//! Chat-completion plumbing for the game generators.
//!
//! ## Core Concepts
//! - **Provider**: Trait-based LLM communication (`LlmProvider`), with an
//!   OpenAI-compatible implementation that also serves DashScope, Kimi and Deepseek
//! - **Router**: Resolves a model selector such as `"kimi-k2"` to a provider,
//!   falling back to the configured default
//! - **Settings**: Serde-backed LLM configuration shared by the router and the CLI

pub mod provider;
pub mod router;
pub mod settings;

pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
    OpenAIProvider, ProviderConfig, ProviderError, Role, Usage, DASHSCOPE_BASE_URL,
};
pub use router::{ModelRoute, ModelRouter};
pub use settings::LlmSettings;
