//! Per-request execution context and the artifact an agent produces.

use crate::config::GameConfig;
use crate::lifecycle::AgentState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Attribute holding the caller's model selector.
pub const MODEL_ATTRIBUTE: &str = "model";
/// Attribute the universal agent fills with the resolved model name.
pub const MODEL_NAME_ATTRIBUTE: &str = "modelName";

/// Output of a successful agent run.
///
/// `game_data` is opaque to the dispatch core; each agent decides its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameArtifact {
    pub html: String,
    /// Kind of game, e.g. `"math"` or `"universal"`.
    pub kind: String,
    pub game_data: serde_json::Value,
    pub generated_by_llm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl GameArtifact {
    /// A locally templated artifact.
    pub fn templated(kind: impl Into<String>, html: String, game_data: serde_json::Value) -> Self {
        Self {
            html,
            kind: kind.into(),
            game_data,
            generated_by_llm: false,
            model_name: None,
        }
    }
}

/// Mutable record of one generation request. Created fresh per request.
#[derive(Debug)]
pub struct AgentContext {
    pub session_id: String,
    pub user_input: String,
    pub config: GameConfig,
    pub attributes: HashMap<String, serde_json::Value>,
    pub result: Option<GameArtifact>,
    /// True unless the agent or the lifecycle reported a failure.
    pub success: bool,
    pub error: Option<String>,
    pub state: AgentState,
    pub started_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
}

impl AgentContext {
    pub fn new(
        session_id: impl Into<String>,
        user_input: impl Into<String>,
        config: GameConfig,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_input: user_input.into(),
            config,
            attributes: HashMap::new(),
            result: None,
            success: true,
            error: None,
            state: AgentState::Created,
            started_at: None,
            started: None,
        }
    }

    /// Merge caller options into the attributes verbatim.
    pub fn with_attributes(
        mut self,
        attributes: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// String attribute; `None` when absent or not a string.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(serde_json::Value::as_str)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn set_result(&mut self, artifact: GameArtifact) {
        self.result = Some(artifact);
    }

    /// Record a failure.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.success = false;
        self.error = Some(message.into());
    }

    pub(crate) fn mark_started(&mut self) {
        self.started_at = Some(Utc::now());
        self.started = Some(Instant::now());
    }

    /// Milliseconds since the agent started; zero if it never did.
    pub fn elapsed_ms(&self) -> u64 {
        self.started
            .map(|started| started.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_config;
    use crate::intent::IntentAnalyzer;
    use serde_json::json;

    fn context() -> AgentContext {
        let config = build_config(&IntentAnalyzer::new().analyze("数学"));
        AgentContext::new("s-1", "数学", config)
    }

    #[test]
    fn test_new_context_defaults() {
        let ctx = context();
        assert!(ctx.success);
        assert!(ctx.result.is_none());
        assert!(ctx.error.is_none());
        assert_eq!(ctx.state, AgentState::Created);
        assert_eq!(ctx.elapsed_ms(), 0);
    }

    #[test]
    fn test_attributes_merge_verbatim() {
        let options = HashMap::from([
            ("model".to_string(), json!("kimi-k2")),
            ("level".to_string(), json!(3)),
        ]);
        let mut ctx = context().with_attributes(options);

        assert_eq!(ctx.attribute_str(MODEL_ATTRIBUTE), Some("kimi-k2"));
        assert_eq!(ctx.attribute("level"), Some(&json!(3)));
        assert_eq!(ctx.attribute_str("level"), None);

        ctx.set_attribute(MODEL_NAME_ATTRIBUTE, "Moonshot-Kimi-K2-Instruct");
        assert!(ctx.has_attribute(MODEL_NAME_ATTRIBUTE));
    }

    #[test]
    fn test_fail_records_error() {
        let mut ctx = context();
        ctx.fail("boom");
        assert!(!ctx.success);
        assert_eq!(ctx.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_mark_started() {
        let mut ctx = context();
        ctx.mark_started();
        assert!(ctx.started_at.is_some());
    }

    #[test]
    fn test_artifact_serialization_skips_missing_model() {
        let artifact = GameArtifact::templated("math", "<html></html>".into(), json!({"n": 1}));
        let value = serde_json::to_value(&artifact).unwrap();
        assert_eq!(value["kind"], "math");
        assert_eq!(value["generated_by_llm"], false);
        assert!(value.get("model_name").is_none());
    }
}
