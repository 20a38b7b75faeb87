//! UI route handlers for the axum channel.
//!
//! The page is fully server-rendered; forms post back and are answered with
//! a `303 See Other` to `/?session_id=…`. A failed turn is the exception: the
//! page is rendered directly with the error banner, since the failure is not
//! stored in the session.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::AxumState;
use crate::subsystems::agents::TurnOutcome;
use crate::subsystems::memory::SessionId;
use crate::subsystems::ui::{ErrorBanner, PageView, Theme, render_page};

#[derive(Deserialize)]
pub(super) struct PageQuery {
    session_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct AskForm {
    session_id: String,
    question: String,
}

#[derive(Deserialize)]
pub(super) struct ThemeForm {
    session_id: String,
    theme: String,
}

fn page_url(id: SessionId) -> String {
    format!("/?session_id={id}")
}

/// Resolve a submitted id to a live session, creating one when needed.
async fn live_session(state: &AxumState, raw: Option<&str>) -> (SessionId, bool) {
    let requested = raw.and_then(|s| Uuid::parse_str(s.trim()).ok());
    let id = state.assistant.sessions().get_or_create(requested).await;
    (id, requested == Some(id))
}

async fn render(state: &AxumState, id: SessionId, error: Option<&ErrorBanner>) -> Response {
    let Some(session) = state.assistant.sessions().snapshot(id).await else {
        return Redirect::to("/").into_response();
    };
    let view = PageView {
        session_id: id,
        theme: session.theme,
        background_b64: &state.background_b64,
        turns: &session.turns,
        error,
    };
    Html(render_page(&view)).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /: chat page for `?session_id=`, or a redirect to a fresh session.
pub(super) async fn root(State(state): State<AxumState>, Query(q): Query<PageQuery>) -> Response {
    let (id, existing) = live_session(&state, q.session_id.as_deref()).await;
    if !existing {
        debug!(channel_id = %state.channel_id, session_id = %id, "redirecting to new session");
        return Redirect::temporary(&page_url(id)).into_response();
    }
    render(&state, id, None).await
}

/// POST /ask: run one turn.
pub(super) async fn ask(State(state): State<AxumState>, Form(form): Form<AskForm>) -> Response {
    let (id, _) = live_session(&state, Some(&form.session_id)).await;
    let question = form.question.trim();
    if question.is_empty() {
        return Redirect::to(&page_url(id)).into_response();
    }

    match state.assistant.handle_turn(id, question).await {
        Ok(TurnOutcome::Success { .. }) => Redirect::to(&page_url(id)).into_response(),
        Ok(TurnOutcome::Failed { message, detail, .. }) => {
            warn!(channel_id = %state.channel_id, session_id = %id, %detail, "turn failed");
            let banner = ErrorBanner { message, detail };
            render(&state, id, Some(&banner)).await
        }
        Err(e) => {
            warn!(channel_id = %state.channel_id, session_id = %id, "ask failed: {e}");
            Redirect::to("/").into_response()
        }
    }
}

/// POST /theme: switch the session's theme.
pub(super) async fn theme(State(state): State<AxumState>, Form(form): Form<ThemeForm>) -> Response {
    let theme: Theme = match form.theme.parse() {
        Ok(t) => t,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };
    let (id, _) = live_session(&state, Some(&form.session_id)).await;
    if let Err(e) = state.assistant.sessions().set_theme(id, theme).await {
        warn!(channel_id = %state.channel_id, session_id = %id, "theme change failed: {e}");
    }
    Redirect::to(&page_url(id)).into_response()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::super::{build_router, test_util};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::llm::LlmProvider;
    use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;
    use crate::subsystems::ui::Theme;

    fn form(uri: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(res: axum::response::Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(res: &axum::response::Response) -> String {
        res.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn root_without_session_redirects() {
        let state = test_util::dummy_state();
        let res = build_router(state.clone()).oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        let loc = location(&res);
        assert!(loc.starts_with("/?session_id="));
        assert_eq!(state.assistant.sessions().list().await.len(), 1);
    }

    #[tokio::test]
    async fn root_with_session_renders_page() {
        let state = test_util::dummy_state();
        let id = state.assistant.sessions().create().await;
        let res = build_router(state)
            .oneshot(Request::get(format!("/?session_id={id}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("물어보연세"));
        assert!(html.contains("질문 답변중 모드를 바꾸지 마세요."));
    }

    #[tokio::test]
    async fn ask_runs_turn_and_redirects() {
        let state = test_util::dummy_state();
        let id = state.assistant.sessions().create().await;
        let res = build_router(state.clone())
            .oneshot(form("/ask", format!("session_id={id}&question=%ED%95%99%EA%B4%80")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), format!("/?session_id={id}"));

        let session = state.assistant.sessions().snapshot(id).await.unwrap();
        assert_eq!(session.turns.len(), 2);
        assert_eq!(session.turns[0].content, "학관");
    }

    #[tokio::test]
    async fn blank_question_is_ignored() {
        let state = test_util::dummy_state();
        let id = state.assistant.sessions().create().await;
        let res = build_router(state.clone()).oneshot(form("/ask", format!("session_id={id}&question=+"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(state.assistant.sessions().snapshot(id).await.unwrap().turns.is_empty());
    }

    #[tokio::test]
    async fn failed_turn_renders_error_banner() {
        let llm = LlmProvider::OpenAiCompatible(
            OpenAiCompatibleProvider::new("http://127.0.0.1:9/v1".into(), "gpt-4o".into(), 0.0, 1, None).unwrap(),
        );
        let state = test_util::with_llm(llm);
        let id = state.assistant.sessions().create().await;
        let res = build_router(state.clone()).oneshot(form("/ask", format!("session_id={id}&question=q"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("error-banner"));
        assert!(html.contains("오류가 발생했습니다."));
        assert!(state.assistant.sessions().memory(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn theme_switch_persists() {
        let state = test_util::dummy_state();
        let id = state.assistant.sessions().create().await;
        let res = build_router(state.clone())
            .oneshot(form("/theme", format!("session_id={id}&theme=yonsei")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(state.assistant.sessions().snapshot(id).await.unwrap().theme, Theme::Yonsei);
    }

    #[tokio::test]
    async fn unknown_theme_rejected() {
        let state = test_util::dummy_state();
        let id = state.assistant.sessions().create().await;
        let res = build_router(state).oneshot(form("/theme", format!("session_id={id}&theme=dark"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
