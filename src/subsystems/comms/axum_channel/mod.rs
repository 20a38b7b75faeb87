//! Axum-based HTTP channel: serves the chat page and a JSON API.
//!
//! `run()` drives the axum event loop; the [`CancellationToken`] is wired to
//! axum's graceful shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /?session_id=…            → chat page (redirects with a fresh id when missing)
//! POST /ask                      → form: session_id, question
//! POST /theme                    → form: session_id, theme
//! GET  /favicon.ico              → 204
//! GET  /api/health
//! POST /api/message
//! GET  /api/sessions
//! GET  /api/session/{id}
//! ```

mod api;
mod ui;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::subsystems::agents::Assistant;

// ── Shared request state ──────────────────────────────────────────────────────

/// Axum router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: all fields are reference-counted.
#[derive(Clone)]
pub(crate) struct AxumState {
    /// Channel identifier used in log spans.
    pub channel_id: Arc<str>,
    pub assistant: Arc<Assistant>,
    /// Base64 background photo for the `yonsei` theme, loaded once at startup.
    pub background_b64: Arc<str>,
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    channel_id: String,
    bind_addr: String,
    assistant: Arc<Assistant>,
    background_b64: Arc<str>,
}

impl AxumChannel {
    pub fn new(
        channel_id: impl Into<String>,
        bind_addr: impl Into<String>,
        assistant: Arc<Assistant>,
        background_b64: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            bind_addr: bind_addr.into(),
            assistant,
            background_b64: background_b64.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.channel_id
    }

    /// Bind and serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let channel_id = self.channel_id;
        let bind_addr = self.bind_addr;
        let state = AxumState {
            channel_id: Arc::from(channel_id.as_str()),
            assistant: self.assistant,
            background_b64: self.background_b64,
        };

        let router = build_router(state);

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| AppError::Comms(format!("axum bind failed on {bind_addr}: {e}")))?;

        info!(%channel_id, %bind_addr, "axum channel listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| AppError::Comms(format!("axum server error: {e}")))?;

        info!(%channel_id, "axum channel shut down");
        Ok(())
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub(crate) fn build_router(state: AxumState) -> Router {
    Router::new()
        // API routes
        .route("/api/health",              get(api::health))
        .route("/api/message",             post(api::message))
        .route("/api/sessions",            get(api::sessions))
        .route("/api/session/{session_id}", get(api::session_detail))
        // UI routes
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(ui::root))
        .route("/ask",         post(ui::ask))
        .route("/theme",       post(ui::theme))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::config::Config;
    use crate::llm::{LlmProvider, providers::dummy::DummyProvider};
    use crate::subsystems::memory::SessionStore;
    use crate::subsystems::tools::SearchProvider;

    pub(crate) fn dummy_state() -> AxumState {
        let cfg = Config::test_default();
        let assistant = Assistant::new(
            LlmProvider::Dummy(DummyProvider),
            SearchProvider::Dummy,
            SessionStore::new(None),
            &cfg.agent,
        );
        AxumState {
            channel_id: Arc::from("axum0"),
            assistant: Arc::new(assistant),
            background_b64: Arc::from(""),
        }
    }

    pub(crate) fn with_llm(llm: LlmProvider) -> AxumState {
        let cfg = Config::test_default();
        let assistant = Assistant::new(llm, SearchProvider::Dummy, SessionStore::new(None), &cfg.agent);
        AxumState { assistant: Arc::new(assistant), ..dummy_state() }
    }
}
