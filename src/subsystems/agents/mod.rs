//! Agents subsystem: the per-turn pipeline.
//!
//! One user turn: record the question, refine it into a search string, run
//! the search agent on it, then record the answer and post-process it for
//! display.
//!
//! ```text
//! question ──► refine::refine_query ──► SearchAgent::run ──► postprocess::process
//!                    ▲                                            │
//!                    └──────────── session memory log ◄───────────┘ (success only)
//! ```

pub mod postprocess;
pub mod prompt;
pub mod refine;
pub mod search_agent;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::AgentConfig;
use crate::llm::{LlmProvider, ProviderError};
use crate::subsystems::memory::{SessionError, SessionId, SessionStore};
use crate::subsystems::tools::SearchProvider;

use postprocess::Answer;
use search_agent::SearchAgent;

/// Shown to the user when a turn fails; the raw error goes underneath.
pub const FAILURE_MESSAGE: &str = "오류가 발생했습니다.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] ProviderError),
    #[error("agent stopped after {0} iterations without a final answer")]
    IterationLimit(usize),
    #[error("model returned an empty answer")]
    EmptyAnswer,
}

/// Result of one turn, as rendered by the channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Success {
        refined_query: String,
        /// Raw model output, as stored in the session.
        reply: String,
        answer: Answer,
    },
    Failed {
        /// Present when refinement succeeded before the failure.
        refined_query: Option<String>,
        message: String,
        detail: String,
    },
}

impl TurnOutcome {
    fn failed(refined_query: Option<String>, err: &AgentError) -> Self {
        TurnOutcome::Failed {
            refined_query,
            message: FAILURE_MESSAGE.to_string(),
            detail: err.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assistant {
    llm: LlmProvider,
    search_name: &'static str,
    agent: SearchAgent,
    refine_prompt: String,
    sessions: SessionStore,
}

impl Assistant {
    pub fn new(llm: LlmProvider, search: SearchProvider, sessions: SessionStore, config: &AgentConfig) -> Self {
        let search_name = search.name();
        let agent = SearchAgent::new(llm.clone(), search, &config.prompts_dir, config.max_iterations);
        let refine_prompt = refine::refine_system_prompt(&config.prompts_dir);
        Self { llm, search_name, agent, refine_prompt, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn llm_name(&self) -> &'static str {
        self.llm.name()
    }

    pub fn search_name(&self) -> &'static str {
        self.search_name
    }

    /// Run one turn for `session_id`.
    ///
    /// The user turn is always recorded. The assistant turn and the memory
    /// pair are recorded only on success. The only `Err` is an unknown
    /// session; pipeline failures come back as [`TurnOutcome::Failed`].
    #[instrument(skip_all, fields(%session_id))]
    pub async fn handle_turn(&self, session_id: SessionId, question: &str) -> Result<TurnOutcome, SessionError> {
        let memory = self.sessions.memory(session_id).await?;
        self.sessions.push_user(session_id, question).await?;

        let refined = match refine::refine_query(&self.llm, &self.refine_prompt, question, &memory).await {
            Ok(q) => q,
            Err(e) => {
                warn!(error = %e, "refinement failed");
                return Ok(TurnOutcome::failed(None, &e));
            }
        };

        let reply = match self.agent.run(&refined).await {
            Ok(r) => r,
            Err(e) => {
                warn!(%refined, error = %e, "agent loop failed");
                return Ok(TurnOutcome::failed(Some(refined), &e));
            }
        };

        self.sessions.commit_exchange(session_id, question, &refined, &reply).await?;
        let answer = postprocess::process(&reply);
        info!(%refined, links = answer.links.len(), "turn complete");

        Ok(TurnOutcome::Success { refined_query: refined, reply, answer })
    }
}
