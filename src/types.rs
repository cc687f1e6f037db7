use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VocabError;

/// CEFR proficiency tier, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    pub const ALL: [Level; 6] = [Level::A1, Level::A2, Level::B1, Level::B2, Level::C1, Level::C2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "a1",
            Level::A2 => "a2",
            Level::B1 => "b1",
            Level::B2 => "b2",
            Level::C1 => "c1",
            Level::C2 => "c2",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Level::A1 => "Beginner - Basic everyday expressions",
            Level::A2 => "Elementary - Simple phrases and frequently used expressions",
            Level::B1 => "Intermediate - Clear standard input on familiar matters",
            Level::B2 => "Upper-Intermediate - Complex text on concrete and abstract topics",
            Level::C1 => "Advanced - Wide range of demanding texts",
            Level::C2 => "Proficient - Virtually everything heard or read",
        }
    }

    /// First part of the description, e.g. "Beginner".
    pub fn short_description(&self) -> &'static str {
        self.description().split(" - ").next().unwrap_or_default()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for Level {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a1" => Ok(Level::A1),
            "a2" => Ok(Level::A2),
            "b1" => Ok(Level::B1),
            "b2" => Ok(Level::B2),
            "c1" => Ok(Level::C1),
            "c2" => Ok(Level::C2),
            other => Err(VocabError::Data(format!("unknown CEFR level '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// One level chosen by the player
    Custom,
    /// Each word drawn from a random level
    Adventure,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Custom => "custom",
            GameMode::Adventure => "adventure",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Custom => f.write_str("Custom"),
            GameMode::Adventure => f.write_str("Adventure"),
        }
    }
}

/// One catalog entry. Immutable once the pool is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub part_of_speech: String,
    pub level: Level,
}

impl WordEntry {
    pub fn new(word: &str, part_of_speech: &str, level: Level) -> Self {
        Self {
            word: word.trim().to_lowercase(),
            part_of_speech: part_of_speech.trim().to_lowercase(),
            level,
        }
    }

    /// Identifier used by the weight table and history, e.g. `run_verb_a1`.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.word, self.part_of_speech, self.level.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Initial,  // Waiting for Enter to start
    Ready,    // Word shown, collecting the answer
    Feedback, // Answer judged, waiting for Enter
    Ended,    // Summary shown
}
