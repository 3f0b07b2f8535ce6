//! Game configuration derived from an analyzed intent.

use crate::intent::GameIntent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Game category inferred from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Math,
    Word,
    Memory,
    Puzzle,
    Drawing,
    /// No specific handler; the request goes to the LLM-backed agent.
    Universal,
}

impl GameType {
    pub const ALL: [GameType; 6] = [
        GameType::Math,
        GameType::Word,
        GameType::Memory,
        GameType::Puzzle,
        GameType::Drawing,
        GameType::Universal,
    ];

    /// Canonical lowercase name, also the registry key of its handler.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Math => "math",
            GameType::Word => "word",
            GameType::Memory => "memory",
            GameType::Puzzle => "puzzle",
            GameType::Drawing => "drawing",
            GameType::Universal => "universal",
        }
    }

    /// Title suffix shown to players.
    pub fn display_name(&self) -> &'static str {
        match self {
            GameType::Math => "数学冒险",
            GameType::Word => "单词探索",
            GameType::Memory => "记忆大师",
            GameType::Puzzle => "拼图世界",
            GameType::Drawing => "创意画板",
            GameType::Universal => "游戏世界",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    #[default]
    Easy,
    Medium,
    Hard,
    Adaptive,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a game agent needs to know about the game to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub game_type: GameType,
    pub age_group: String,
    pub difficulty: DifficultyLevel,
    pub theme: String,
    pub title: String,
    pub timer_enabled: bool,
    pub sound_enabled: bool,
    pub duration_minutes: u32,
    pub score_enabled: bool,
}

impl GameConfig {
    /// Copy every intent field; sound and score are always on.
    pub fn from_intent(intent: &GameIntent) -> Self {
        Self {
            game_type: intent.game_type,
            age_group: intent.age_group.clone(),
            difficulty: intent.difficulty,
            theme: intent.theme.clone(),
            title: intent.title.clone(),
            timer_enabled: intent.timer_enabled,
            sound_enabled: true,
            duration_minutes: intent.duration_minutes,
            score_enabled: true,
        }
    }
}

impl From<&GameIntent> for GameConfig {
    fn from(intent: &GameIntent) -> Self {
        Self::from_intent(intent)
    }
}

/// Build the configuration for an intent.
pub fn build_config(intent: &GameIntent) -> GameConfig {
    GameConfig::from_intent(intent)
}
