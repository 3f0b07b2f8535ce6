//! Caller-facing entry point: text in, game out.

use crate::agent::{AgentDescriptor, GameAgent};
use crate::config::{build_config, GameConfig};
use crate::context::{AgentContext, GameArtifact};
use crate::dispatch::{DispatchPolicy, UNIVERSAL_KEY};
use crate::games::{MathGameAgent, MemoryGameAgent, UniversalGameAgent};
use crate::intent::{GameIntent, IntentAnalyzer};
use crate::lifecycle::run_agent;
use crate::registry::AgentRegistry;
use playforge_error::{Error, Result};
use playforge_llm::ModelRouter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one [`GameGenerator::generate`] call.
///
/// `artifact` is set only when `success` is true; `error` only when it is
/// false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub session_id: String,
    pub success: bool,
    pub artifact: Option<GameArtifact>,
    pub config: Option<GameConfig>,
    pub agent_key: Option<String>,
    pub agent_name: Option<String>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl GenerationResult {
    pub fn generated_by_llm(&self) -> bool {
        self.artifact
            .as_ref()
            .map(|artifact| artifact.generated_by_llm)
            .unwrap_or(false)
    }

    /// `"llm"` for model-generated games, `"system"` otherwise.
    pub fn agent_source(&self) -> &'static str {
        if self.generated_by_llm() {
            "llm"
        } else {
            "system"
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        self.artifact.as_ref().and_then(|artifact| artifact.model_name.as_deref())
    }
}

/// Routes requests through intent analysis, dispatch and the agent lifecycle.
#[derive(Debug, Clone)]
pub struct GameGenerator {
    analyzer: IntentAnalyzer,
    registry: Arc<AgentRegistry>,
    dispatch: DispatchPolicy,
}

impl GameGenerator {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            analyzer: IntentAnalyzer::new(),
            dispatch: DispatchPolicy::new(registry.clone()),
            registry,
        }
    }

    /// A generator with the built-in math, memory and universal agents.
    pub fn with_default_agents(router: ModelRouter) -> Result<Self> {
        let registry = Arc::new(AgentRegistry::new());
        registry.register("math", Arc::new(MathGameAgent::new()))?;
        registry.register("memory", Arc::new(MemoryGameAgent::new()))?;
        registry.register(UNIVERSAL_KEY, Arc::new(UniversalGameAgent::with_router(router)))?;
        Ok(Self::new(registry))
    }

    /// The shared registry; registering through it is seen by later calls.
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Register `agent` under `key`, replacing any earlier agent there.
    pub fn register(&self, key: impl Into<String>, agent: Arc<dyn GameAgent>) -> Result<()> {
        self.registry.register(key, agent)
    }

    /// Every registered agent, in selection-preference order.
    pub fn agents(&self) -> Vec<AgentDescriptor> {
        self.registry.list()
    }

    /// Descriptor for one registry key. Unknown keys are `AgentNotFound`.
    pub fn describe(&self, key: &str) -> Result<AgentDescriptor> {
        self.registry
            .require_descriptor(key)
            .map_err(|err| err.with_operation("generator::describe"))
    }

    /// Intent and configuration for `user_input`, without running an agent.
    pub fn analyze(&self, user_input: &str) -> (GameIntent, GameConfig) {
        let intent = self.analyzer.analyze(user_input);
        let config = build_config(&intent);
        (intent, config)
    }

    /// Generate a game. Never fails: problems are reported in the result.
    pub async fn generate(
        &self,
        user_input: &str,
        session_id: &str,
        options: HashMap<String, serde_json::Value>,
    ) -> GenerationResult {
        let started = Instant::now();
        tracing::info!(session_id, input = user_input, "Generating game");

        let (intent, config) = self.analyze(user_input);
        tracing::info!(
            session_id,
            category = %intent.game_type,
            age_group = %intent.age_group,
            difficulty = %intent.difficulty,
            theme = %intent.theme,
            "Intent recognized"
        );

        let mut result = GenerationResult {
            session_id: session_id.to_string(),
            success: false,
            artifact: None,
            config: Some(config.clone()),
            agent_key: None,
            agent_name: None,
            error: None,
            elapsed_ms: 0,
        };

        let Some(selection) = self.dispatch.select(config.game_type) else {
            let err = Error::dispatch_failed(config.game_type.as_str())
                .with_operation("generator::generate");
            tracing::error!(session_id, error = %err, "Dispatch failed");
            result.error = Some(err.message().to_string());
            result.elapsed_ms = started.elapsed().as_millis() as u64;
            return result;
        };

        let mut context = AgentContext::new(session_id, user_input, config).with_attributes(options);
        run_agent(selection.agent.as_ref(), &mut context).await;

        result.agent_key = Some(selection.key);
        result.agent_name = Some(selection.agent.name().to_string());
        result.success = context.success;
        if context.success {
            result.artifact = context.result;
        } else {
            result.error = context.error;
        }
        result.elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            session_id,
            success = result.success,
            agent = result.agent_name.as_deref().unwrap_or_default(),
            elapsed_ms = result.elapsed_ms,
            "Generation finished"
        );
        result
    }
}
