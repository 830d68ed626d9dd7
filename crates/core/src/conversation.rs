//! Conversation turns and transcripts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation
///
/// Persisted form is `{role, content}`; the receive timestamp is kept only
/// in memory for ordering out-of-order media events before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    #[serde(skip_serializing, default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

impl PartialEq for Turn {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role && self.content == other.content
    }
}

/// Append-only conversation transcript for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn in event delivery order
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Last `n` turns, oldest first
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Most recent assistant turn, if any
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == TurnRole::Assistant)
    }

    pub fn count_role(&self, role: TurnRole) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// Copy of the turns sorted by receive timestamp
    ///
    /// Media events can be delivered out of order; scoring consumers re-sort
    /// before pairing questions with answers.
    pub fn ordered_by_timestamp(&self) -> Vec<Turn> {
        let mut sorted = self.turns.clone();
        sorted.sort_by_key(|t| t.timestamp);
        sorted
    }

    /// Serialize to the persisted JSON array of `{role, content}`
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.turns)
    }

    /// Deserialize from the persisted JSON array
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let turns: Vec<Turn> = serde_json::from_str(json)?;
        Ok(Self { turns })
    }
}
