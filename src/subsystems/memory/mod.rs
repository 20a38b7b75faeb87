//! In-memory session store.
//!
//! Nothing is persisted. Sessions live until the process exits or until
//! `max_sessions` is reached, at which point creating a session evicts the
//! least recently active one. The map sits behind a tokio `RwLock` that is
//! only held for the duration of a map operation, never across an LLM or
//! search call.

mod session;

pub use session::{Session, SessionId, Turn, TurnRole};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::llm::ChatMessage;
use crate::subsystems::ui::Theme;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(SessionId),
}

/// Row in [`SessionStore::list`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub turns: usize,
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
}

/// Cheap to clone; all clones share one map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    clock: Arc<AtomicU64>,
    transcript_cap: Option<usize>,
    max_sessions: Option<usize>,
}

impl SessionStore {
    /// `transcript_cap` bounds the displayed turns per session (FIFO).
    pub fn new(transcript_cap: Option<usize>) -> Self {
        Self {
            transcript_cap: transcript_cap.filter(|&c| c > 0),
            ..Self::default()
        }
    }

    /// Bound the number of live sessions; `None` or 0 = unbounded.
    pub fn with_max_sessions(mut self, max_sessions: Option<usize>) -> Self {
        self.max_sessions = max_sessions.filter(|&c| c > 0);
        self
    }

    pub async fn create(&self) -> SessionId {
        let mut session = Session::new();
        session.last_seen = self.tick();
        let id = session.id;

        let mut map = self.sessions.write().await;
        if let Some(max) = self.max_sessions {
            while map.len() >= max {
                let Some(oldest) = map.values().min_by_key(|s| s.last_seen).map(|s| s.id) else {
                    break;
                };
                map.remove(&oldest);
                debug!(session_id = %oldest, max_sessions = max, "session evicted");
            }
        }
        map.insert(id, session);
        debug!(session_id = %id, live = map.len(), "session created");
        id
    }

    /// Return `id` if it names a live session, otherwise create a new one.
    pub async fn get_or_create(&self, id: Option<SessionId>) -> SessionId {
        if let Some(id) = id {
            if self.with_session(id, |_| ()).await.is_ok() {
                return id;
            }
        }
        self.create().await
    }

    pub async fn snapshot(&self, id: SessionId) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Memory log to replay for the next refinement call.
    pub async fn memory(&self, id: SessionId) -> Result<Vec<ChatMessage>, SessionError> {
        self.with_session(id, |s| s.memory.clone()).await
    }

    pub async fn push_user(&self, id: SessionId, text: &str) -> Result<(), SessionError> {
        let cap = self.transcript_cap;
        self.with_session(id, |s| {
            s.turns.push(Turn::user(text));
            if let Some(cap) = cap {
                s.enforce_cap(cap);
            }
        })
        .await
    }

    /// Record a successful exchange: the assistant turn (tagged with the
    /// refined query) plus the (user, assistant) memory pair, under one lock.
    pub async fn commit_exchange(
        &self,
        id: SessionId,
        user: &str,
        refined_query: &str,
        assistant: &str,
    ) -> Result<(), SessionError> {
        let cap = self.transcript_cap;
        self.with_session(id, |s| {
            s.turns.push(Turn::assistant(assistant).with_refined_query(refined_query));
            s.memory.push(ChatMessage::user(user));
            s.memory.push(ChatMessage::assistant(assistant));
            if let Some(cap) = cap {
                s.enforce_cap(cap);
            }
        })
        .await
    }

    pub async fn set_theme(&self, id: SessionId, theme: Theme) -> Result<(), SessionError> {
        self.with_session(id, |s| s.theme = theme).await
    }

    /// All sessions, oldest first.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let map = self.sessions.read().await;
        let mut out: Vec<SessionSummary> = map
            .values()
            .map(|s| SessionSummary {
                session_id: s.id,
                turns: s.turns.len(),
                theme: s.theme,
                created_at: s.created_at,
            })
            .collect();
        out.sort_by_key(|s| s.created_at);
        out
    }

    async fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        let tick = self.tick();
        let mut map = self.sessions.write().await;
        let session = map.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.last_seen = tick;
        Ok(f(session))
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }
}
