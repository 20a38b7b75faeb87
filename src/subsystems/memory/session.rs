//! Per-browser session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::ChatMessage;
use crate::subsystems::ui::Theme;

pub type SessionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One displayed chat turn. Assistant turns hold the raw model output; the
/// post-processor runs on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    /// Search string the answer was produced from (assistant turns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_query: Option<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: TurnRole::User, content: content.into(), refined_query: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: TurnRole::Assistant, content: content.into(), refined_query: None }
    }

    pub fn with_refined_query(mut self, query: impl Into<String>) -> Self {
        self.refined_query = Some(query.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// Everything shown in the chat history, including unanswered questions.
    pub turns: Vec<Turn>,
    /// (user, assistant) pairs of successful exchanges, replayed to the
    /// refinement step. Always even length.
    pub memory: Vec<ChatMessage>,
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
    /// Store-wide activity tick of the last access; the lowest is evicted first.
    pub last_seen: u64,
}

impl Session {
    pub(super) fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            memory: Vec::new(),
            theme: Theme::default(),
            created_at: Utc::now(),
            last_seen: 0,
        }
    }

    /// Drop the oldest turns beyond `cap`; the memory log is trimmed in whole
    /// pairs so it stays aligned.
    pub(super) fn enforce_cap(&mut self, cap: usize) {
        if self.turns.len() > cap {
            let excess = self.turns.len() - cap;
            self.turns.drain(..excess);
        }
        let memory_cap = (cap - cap % 2).max(2);
        if self.memory.len() > memory_cap {
            let excess = self.memory.len() - memory_cap;
            self.memory.drain(..excess);
        }
    }
}
