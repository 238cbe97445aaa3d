//! Conversation log — append-only history of turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One logged exchange unit. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Ordinal within the conversation, starting at 1.
    pub id: u64,
    pub speaker: Speaker,
    pub text: String,
    pub issued_at: DateTime<Utc>,
}

impl Turn {
    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

/// Ordered, append-only sequence of turns. No deletion or mutation.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, assigning the next ordinal. Returns a copy.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) -> Turn {
        let turn = Turn {
            id: self.turns.len() as u64 + 1,
            speaker,
            text: text.into(),
            issued_at: Utc::now(),
        };
        self.turns.push(turn.clone());
        turn
    }

    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
