//! Agent registry: key -> (agent, descriptor).

use crate::agent::{AgentDescriptor, GameAgent};
use parking_lot::RwLock;
use playforge_error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

struct Entry {
    agent: Arc<dyn GameAgent>,
    descriptor: AgentDescriptor,
}

/// Thread-safe agent registry, shared as `Arc<AgentRegistry>`.
///
/// Registering an existing key replaces the previous agent entirely.
#[derive(Default)]
pub struct AgentRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl AgentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `agent` under `key`, describing it from its own metadata.
    pub fn register(&self, key: impl Into<String>, agent: Arc<dyn GameAgent>) -> Result<()> {
        let key = key.into();
        let descriptor = AgentDescriptor::for_agent(key, agent.as_ref());
        self.register_with_descriptor(descriptor, agent)
    }

    /// Register `agent` with an explicit descriptor; its key is the registry key.
    pub fn register_with_descriptor(
        &self,
        descriptor: AgentDescriptor,
        agent: Arc<dyn GameAgent>,
    ) -> Result<()> {
        if descriptor.key.trim().is_empty() {
            return Err(Error::invalid_argument("agent key must not be blank")
                .with_operation("registry::register")
                .with_context("agent", descriptor.name));
        }

        let key = descriptor.key.clone();
        let previous = self
            .entries
            .write()
            .insert(key.clone(), Entry { agent, descriptor });

        match previous {
            Some(old) => tracing::warn!(
                key = %key,
                replaced = old.descriptor.name.as_str(),
                "Agent key re-registered, previous agent replaced"
            ),
            None => tracing::info!(key = %key, "Registered agent"),
        }
        Ok(())
    }

    /// The agent registered under `key`, matched exactly.
    pub fn lookup(&self, key: &str) -> Option<Arc<dyn GameAgent>> {
        self.entries.read().get(key).map(|entry| entry.agent.clone())
    }

    /// Snapshot of the descriptor registered under `key`.
    pub fn descriptor(&self, key: &str) -> Option<AgentDescriptor> {
        self.entries.read().get(key).map(|entry| entry.descriptor.clone())
    }

    /// Like [`descriptor`](Self::descriptor), but a missing key is an
    /// `AgentNotFound` error.
    pub fn require_descriptor(&self, key: &str) -> Result<AgentDescriptor> {
        self.descriptor(key).ok_or_else(|| {
            Error::agent_not_found(key).with_operation("registry::require_descriptor")
        })
    }

    /// Whether anything is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// All descriptors, highest priority first, then by key.
    pub fn list(&self) -> Vec<AgentDescriptor> {
        let mut descriptors: Vec<AgentDescriptor> = self
            .entries
            .read()
            .values()
            .map(|entry| entry.descriptor.clone())
            .collect();
        descriptors.sort_by(|a, b| {
            b.priority
                .level()
                .cmp(&a.priority.level())
                .then_with(|| a.key.cmp(&b.key))
        });
        descriptors
    }

    /// Number of registered keys; aliases of one agent count separately.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no agent is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        f.debug_struct("AgentRegistry").field("keys", &keys).finish()
    }
}
