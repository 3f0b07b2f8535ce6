//! # Playforge Agent
//!
//! Turns a free-text request into a game:
//! 1. `IntentAnalyzer` extracts category, age group, difficulty, theme,
//!    timer and duration from the text
//! 2. `build_config` derives the game configuration
//! 3. `DispatchPolicy` picks an agent from the `AgentRegistry`, falling back
//!    to the universal LLM-backed agent
//! 4. `run_agent` executes it, capturing errors and panics on the context
//!
//! `GameGenerator` ties the steps together and never fails; problems surface
//! as `GenerationResult { success: false, error, .. }`.

pub mod agent;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod games;
pub mod generator;
pub mod intent;
pub mod lifecycle;
pub mod registry;

pub use agent::{AgentDescriptor, AgentPriority, GameAgent};
pub use config::{build_config, DifficultyLevel, GameConfig, GameType};
pub use context::{AgentContext, GameArtifact};
pub use dispatch::{DispatchPolicy, DispatchStep, Selection, UNIVERSAL_KEY};
pub use games::{MathGameAgent, MemoryGameAgent, UniversalGameAgent};
pub use generator::{GameGenerator, GenerationResult};
pub use intent::{GameIntent, IntentAnalyzer};
pub use lifecycle::{run_agent, AgentState};
pub use registry::AgentRegistry;
