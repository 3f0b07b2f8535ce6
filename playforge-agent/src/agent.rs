//! The game agent capability and its descriptive metadata.

use crate::context::AgentContext;
use async_trait::async_trait;
use playforge_error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative preference among agents, used for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPriority {
    High,
    Medium,
    Low,
}

impl AgentPriority {
    pub fn level(&self) -> u8 {
        match self {
            AgentPriority::High => 3,
            AgentPriority::Medium => 2,
            AgentPriority::Low => 1,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentPriority::High => "高",
            AgentPriority::Medium => "中",
            AgentPriority::Low => "低",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentPriority::High => "high",
            AgentPriority::Medium => "medium",
            AgentPriority::Low => "low",
        }
    }
}

impl fmt::Display for AgentPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A handler that turns a configured context into a game.
///
/// On success an agent stores a [`GameArtifact`](crate::GameArtifact) with
/// [`AgentContext::set_result`]. Agents are run through
/// [`run_agent`](crate::run_agent), which catches errors and panics.
#[async_trait]
pub trait GameAgent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn priority(&self) -> AgentPriority {
        AgentPriority::Medium
    }

    async fn execute(&self, context: &mut AgentContext) -> Result<()>;
}

/// Registry-facing description of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub key: String,
    pub name: String,
    pub description: String,
    pub priority: AgentPriority,
}

impl AgentDescriptor {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        priority: AgentPriority,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            priority,
        }
    }

    /// Describe `agent` as registered under `key`.
    pub fn for_agent(key: impl Into<String>, agent: &dyn GameAgent) -> Self {
        Self::new(key, agent.name(), agent.description(), agent.priority())
    }
}
