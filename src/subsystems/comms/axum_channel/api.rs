//! Axum handlers for `/api/*` routes.
//!
//! Each handler receives [`AxumState`] via [`axum::extract::State`] and
//! returns an axum [`Response`] with a JSON body.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::AxumState;
use crate::subsystems::agents::TurnOutcome;
use crate::subsystems::agents::postprocess::{self, Answer, LinkCandidate, LinkKind};
use crate::subsystems::memory::TurnRole;

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct MessageRequest {
    message: String,
    session_id: Option<String>,
}

#[derive(Serialize)]
struct LinkView<'a> {
    label: &'a str,
    display_label: String,
    url: &'a str,
    kind: LinkKind,
}

impl<'a> From<&'a LinkCandidate> for LinkView<'a> {
    fn from(l: &'a LinkCandidate) -> Self {
        Self { label: &l.label, display_label: l.display_label(), url: &l.url, kind: l.kind }
    }
}

#[derive(Serialize)]
struct AnswerView<'a> {
    text: &'a str,
    links: Vec<LinkView<'a>>,
}

impl<'a> From<&'a Answer> for AnswerView<'a> {
    fn from(a: &'a Answer) -> Self {
        Self { text: &a.text, links: a.links.iter().map(LinkView::from).collect() }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

fn parse_session_id(raw: Option<&str>) -> Option<Uuid> {
    raw.map(str::trim).filter(|s| !s.is_empty()).and_then(|s| Uuid::parse_str(s).ok())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AxumState>) -> Response {
    let body = json!({
        "status": "ok",
        "llm_provider": state.assistant.llm_name(),
        "search_provider": state.assistant.search_name(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/message: run one turn.
pub(super) async fn message(State(state): State<AxumState>, Json(req): Json<MessageRequest>) -> Response {
    let question = req.message.trim();
    if question.is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("bad_request", "message is empty")).into_response();
    }

    let sessions = state.assistant.sessions();
    let session_id = sessions.get_or_create(parse_session_id(req.session_id.as_deref())).await;

    match state.assistant.handle_turn(session_id, question).await {
        Ok(TurnOutcome::Success { refined_query, reply, answer }) => {
            let body = json!({
                "session_id": session_id,
                "refined_query": refined_query,
                "reply": reply,
                "answer": AnswerView::from(&answer),
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(TurnOutcome::Failed { refined_query, message, detail }) => {
            warn!(channel_id = %state.channel_id, %session_id, %detail, "turn failed");
            let body = json!({
                "session_id": session_id,
                "refined_query": refined_query,
                "error": "turn_failed",
                "message": message,
                "detail": detail,
            });
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
        Err(e) => {
            warn!(channel_id = %state.channel_id, %session_id, "message send failed: {e}");
            (StatusCode::NOT_FOUND, json_error("not_found", e)).into_response()
        }
    }
}

/// GET /api/sessions
pub(super) async fn sessions(State(state): State<AxumState>) -> Response {
    let list = state.assistant.sessions().list().await;
    (StatusCode::OK, Json(json!({ "sessions": list }))).into_response()
}

/// GET /api/session/{session_id}: history with post-processed assistant turns.
pub(super) async fn session_detail(State(state): State<AxumState>, Path(session_id): Path<String>) -> Response {
    let Some(id) = parse_session_id(Some(&session_id)) else {
        return (StatusCode::BAD_REQUEST, json_error("bad_request", "invalid session id")).into_response();
    };
    let Some(session) = state.assistant.sessions().snapshot(id).await else {
        return (StatusCode::NOT_FOUND, json_error("not_found", format!("session not found: {id}")))
            .into_response();
    };

    let answers: Vec<Option<Answer>> = session
        .turns
        .iter()
        .map(|t| (t.role == TurnRole::Assistant).then(|| postprocess::process(&t.content)))
        .collect();
    let turns: Vec<_> = session
        .turns
        .iter()
        .zip(&answers)
        .map(|(t, a)| {
            let mut turn = json!(t);
            if let Some(a) = a {
                turn["answer"] = json!(AnswerView::from(a));
            }
            turn
        })
        .collect();

    let body = json!({
        "session_id": session.id,
        "theme": session.theme,
        "created_at": session.created_at,
        "turns": turns,
        "memory_messages": session.memory.len(),
    });
    (StatusCode::OK, Json(body)).into_response()
}
