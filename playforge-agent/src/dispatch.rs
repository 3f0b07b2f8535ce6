//! Category -> agent selection with an ordered fallback chain.
//!
//! For a specific category the candidates are, in order: the canonical
//! lowercase key, the legacy `"<category>GameAgent"` and `"<category>Agent"`
//! keys, then the universal handler. The universal category only ever
//! resolves to the universal handler.

use crate::agent::GameAgent;
use crate::config::GameType;
use crate::registry::AgentRegistry;
use std::fmt;
use std::sync::Arc;

/// Registry key of the generic LLM-backed agent.
pub const UNIVERSAL_KEY: &str = "universal-handler";

/// Which rule of the chain produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStep {
    /// Universal category, universal handler.
    Universal,
    Canonical,
    Legacy,
    /// Specific category with no specific agent.
    Fallback,
}

impl DispatchStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStep::Universal => "universal",
            DispatchStep::Canonical => "canonical",
            DispatchStep::Legacy => "legacy",
            DispatchStep::Fallback => "fallback",
        }
    }
}

impl fmt::Display for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a successful dispatch.
#[derive(Clone)]
pub struct Selection {
    pub key: String,
    pub agent: Arc<dyn GameAgent>,
    pub step: DispatchStep,
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("key", &self.key)
            .field("agent", &self.agent.name())
            .field("step", &self.step)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    registry: Arc<AgentRegistry>,
}

impl DispatchPolicy {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    /// Candidate keys for a category, in lookup order.
    pub fn candidates(category: GameType) -> Vec<(String, DispatchStep)> {
        if category == GameType::Universal {
            return vec![(UNIVERSAL_KEY.to_string(), DispatchStep::Universal)];
        }

        let name = category.as_str();
        vec![
            (name.to_string(), DispatchStep::Canonical),
            (format!("{}GameAgent", name), DispatchStep::Legacy),
            (format!("{}Agent", name), DispatchStep::Legacy),
            (UNIVERSAL_KEY.to_string(), DispatchStep::Fallback),
        ]
    }

    /// First registered candidate, or `None` when the chain is exhausted.
    pub fn select(&self, category: GameType) -> Option<Selection> {
        let selection = Self::candidates(category)
            .into_iter()
            .find_map(|(key, step)| {
                self.registry
                    .lookup(&key)
                    .map(|agent| Selection { key, agent, step })
            });

        match &selection {
            Some(selection) => tracing::info!(
                category = %category,
                key = %selection.key,
                step = %selection.step,
                agent = selection.agent.name(),
                "Selected agent"
            ),
            None => tracing::warn!(category = %category, "No agent available for category"),
        }
        selection
    }
}
