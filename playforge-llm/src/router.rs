//! Model routing: selector string -> chat-completion backend.
//!
//! Selectors are matched case-insensitively. Absent, blank, `default` and
//! `dashscope` pick the default backend; `kimi-k2`, `qwen3-coder-plus` and
//! `deepseek` pick their own backend when one is configured and the default
//! otherwise. Unknown selectors also fall back to the default.

use crate::provider::{LlmProvider, OpenAIProvider, ProviderError};
use crate::settings::LlmSettings;
use playforge_error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Display name reported when the default backend has no model name.
const FALLBACK_DEFAULT_NAME: &str = "dashscope-default";

/// A named route the router knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelRoute {
    Default,
    KimiK2,
    Qwen3CoderPlus,
    Deepseek,
}

impl ModelRoute {
    pub const ALL: [ModelRoute; 4] = [
        ModelRoute::Default,
        ModelRoute::KimiK2,
        ModelRoute::Qwen3CoderPlus,
        ModelRoute::Deepseek,
    ];

    /// Parse a selector. `None` means the selector is not recognized.
    pub fn from_key(key: Option<&str>) -> Option<Self> {
        let key = match key.map(str::trim) {
            None | Some("") => return Some(ModelRoute::Default),
            Some(k) => k.to_ascii_lowercase(),
        };
        match key.as_str() {
            "default" | "dashscope" => Some(ModelRoute::Default),
            "kimi-k2" => Some(ModelRoute::KimiK2),
            "qwen3-coder-plus" => Some(ModelRoute::Qwen3CoderPlus),
            "deepseek" => Some(ModelRoute::Deepseek),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelRoute::Default => "default",
            ModelRoute::KimiK2 => "kimi-k2",
            ModelRoute::Qwen3CoderPlus => "qwen3-coder-plus",
            ModelRoute::Deepseek => "deepseek",
        }
    }

    fn model<'a>(&self, settings: &'a LlmSettings) -> &'a str {
        match self {
            ModelRoute::Default => &settings.default_model,
            ModelRoute::KimiK2 => &settings.kimi_model,
            ModelRoute::Qwen3CoderPlus => &settings.qwen3_coder_model,
            ModelRoute::Deepseek => &settings.deepseek_model,
        }
    }
}

impl fmt::Display for ModelRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves model selectors to providers.
#[derive(Clone, Default)]
pub struct ModelRouter {
    routes: HashMap<ModelRoute, Arc<dyn LlmProvider>>,
}

impl ModelRouter {
    /// A router with no backends; every lookup yields `None`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(self, provider: Arc<dyn LlmProvider>) -> Self {
        self.with_route(ModelRoute::Default, provider)
    }

    pub fn with_route(mut self, route: ModelRoute, provider: Arc<dyn LlmProvider>) -> Self {
        self.routes.insert(route, provider);
        self
    }

    /// Build one OpenAI-compatible backend per route from settings.
    ///
    /// Without an API key the router is left empty and callers degrade to
    /// their offline behaviour.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        settings.validate()?;

        let Some(api_key) = settings.resolved_api_key() else {
            tracing::warn!("No LLM API key configured; model routes disabled");
            return Ok(Self::new());
        };

        let mut router = Self::new();
        for route in ModelRoute::ALL {
            let model = route.model(settings);
            let provider = OpenAIProvider::new(settings.provider_config(&api_key, model))
                .map_err(ProviderError::into_error)?;
            tracing::info!(route = %route, model, "Configured model route");
            router = router.with_route(route, Arc::new(provider));
        }
        Ok(router)
    }

    /// Whether a default backend exists.
    pub fn has_default(&self) -> bool {
        self.routes.contains_key(&ModelRoute::Default)
    }

    /// Configured routes, default first.
    pub fn routes(&self) -> Vec<ModelRoute> {
        ModelRoute::ALL
            .into_iter()
            .filter(|route| self.routes.contains_key(route))
            .collect()
    }

    /// Resolve a selector to a provider, falling back to the default.
    pub fn get(&self, key: Option<&str>) -> Option<Arc<dyn LlmProvider>> {
        let route = ModelRoute::from_key(key).unwrap_or_else(|| {
            tracing::debug!(selector = ?key, "Unknown model selector, using default");
            ModelRoute::Default
        });
        self.routes
            .get(&route)
            .or_else(|| self.routes.get(&ModelRoute::Default))
            .cloned()
    }

    /// Display name of the model a selector resolves to.
    ///
    /// Unknown selectors are reported verbatim.
    pub fn model_name(&self, key: Option<&str>) -> String {
        let Some(route) = ModelRoute::from_key(key) else {
            return key.unwrap_or_default().trim().to_string();
        };
        match self.get(Some(route.as_str())) {
            Some(provider) => provider.default_model().to_string(),
            None => FALLBACK_DEFAULT_NAME.to_string(),
        }
    }
}

impl fmt::Debug for ModelRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRouter")
            .field("routes", &self.routes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CompletionRequest, CompletionResponse, FinishReason, Usage};
    use async_trait::async_trait;

    struct NamedProvider(&'static str);

    #[async_trait]
    impl LlmProvider for NamedProvider {
        fn name(&self) -> &str {
            "named"
        }

        fn default_model(&self) -> &str {
            self.0
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse {
                id: String::new(),
                model: self.0.to_string(),
                content: Some(self.0.to_string()),
                finish_reason: FinishReason::Stop,
                usage: Usage::default(),
            })
        }
    }

    fn router() -> ModelRouter {
        ModelRouter::new()
            .with_default(Arc::new(NamedProvider("qwen-plus")))
            .with_route(ModelRoute::KimiK2, Arc::new(NamedProvider("Moonshot-Kimi-K2-Instruct")))
    }

    #[test]
    fn test_from_key() {
        assert_eq!(ModelRoute::from_key(None), Some(ModelRoute::Default));
        assert_eq!(ModelRoute::from_key(Some("  ")), Some(ModelRoute::Default));
        assert_eq!(ModelRoute::from_key(Some("DashScope")), Some(ModelRoute::Default));
        assert_eq!(ModelRoute::from_key(Some("KIMI-K2")), Some(ModelRoute::KimiK2));
        assert_eq!(ModelRoute::from_key(Some("deepseek")), Some(ModelRoute::Deepseek));
        assert_eq!(ModelRoute::from_key(Some("gpt-5")), None);
    }

    #[test]
    fn test_get_resolves_configured_route() {
        let router = router();
        let provider = router.get(Some("kimi-k2")).unwrap();
        assert_eq!(provider.default_model(), "Moonshot-Kimi-K2-Instruct");
    }

    #[test]
    fn test_get_falls_back_to_default() {
        let router = router();
        for key in [None, Some("default"), Some("deepseek"), Some("no-such-model")] {
            let provider = router.get(key).unwrap();
            assert_eq!(provider.default_model(), "qwen-plus", "selector {:?}", key);
        }
    }

    #[test]
    fn test_empty_router_yields_nothing() {
        let router = ModelRouter::new();
        assert!(router.get(None).is_none());
        assert!(router.get(Some("kimi-k2")).is_none());
        assert!(!router.has_default());
        assert_eq!(router.model_name(None), FALLBACK_DEFAULT_NAME);
    }

    #[test]
    fn test_model_name() {
        let router = router();
        assert_eq!(router.model_name(None), "qwen-plus");
        assert_eq!(router.model_name(Some("kimi-k2")), "Moonshot-Kimi-K2-Instruct");
        assert_eq!(router.model_name(Some("qwen3-coder-plus")), "qwen-plus");
        assert_eq!(router.model_name(Some("my-local-model")), "my-local-model");
    }

    #[test]
    fn test_routes_listing() {
        assert_eq!(router().routes(), vec![ModelRoute::Default, ModelRoute::KimiK2]);
    }

    #[test]
    fn test_from_settings_builds_every_route() {
        let settings = LlmSettings {
            api_key: Some("sk-test".into()),
            ..LlmSettings::default()
        };
        let router = ModelRouter::from_settings(&settings).unwrap();

        assert_eq!(router.routes(), ModelRoute::ALL.to_vec());
        assert_eq!(router.model_name(Some("deepseek")), "deepseek-v3.1");
        assert_eq!(router.model_name(Some("dashscope")), "qwen-plus-2025-07-28");
    }

    #[test]
    fn test_from_settings_rejects_invalid() {
        let settings = LlmSettings {
            api_key: Some("sk-test".into()),
            timeout_secs: 0,
            ..LlmSettings::default()
        };
        assert!(ModelRouter::from_settings(&settings).is_err());
    }

    #[tokio::test]
    async fn test_routed_provider_is_callable() {
        let provider = router().get(Some("kimi-k2")).unwrap();
        let reply = provider.prompt("hello").await.unwrap();
        assert_eq!(reply, "Moonshot-Kimi-K2-Instruct");
    }
}
