//! HTML rendering for the chat page.
//!
//! Every piece of user or model text goes through [`escape_html`]. Assistant
//! turns are stored raw and post-processed here on every render.

use uuid::Uuid;

use super::theme::{Theme, theme_css};
use crate::subsystems::agents::postprocess::{self, Answer};
use crate::subsystems::memory::{Turn, TurnRole};

pub const APP_TITLE: &str = "물어보연세";
pub const LINKS_CAPTION: &str = "📚 관련 링크 바로가기";
const INPUT_PLACEHOLDER: &str = "질문을 입력하세요...";
const LOVE_YONSEI_URL: &str = "https://www.youtube.com/watch?v=cGdOCYiQNyg&list=RDcGdOCYiQNyg&start_radio=1";

const LAYOUT_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, -apple-system, sans-serif; color: #333; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 18rem; padding: 1.5rem; flex-shrink: 0; }
.sidebar .info { background: #e8f0fe; border-radius: 8px; padding: 0.8rem; margin: 1rem 0; }
.sidebar .warning { background: #fdecea; border-radius: 8px; padding: 0.8rem; color: #b00020 !important; }
.sidebar form button { display: block; width: 100%; padding: 0.5rem; margin-bottom: 0.5rem; border-radius: 8px; cursor: pointer; }
.app { position: relative; flex: 1; padding: 2rem 3rem; }
.title-row { display: flex; align-items: center; justify-content: space-between; }
.love-link { display: inline-block; text-decoration: none; background-color: #003876; border-radius: 8px; border: 2px solid white; padding: 0.5rem 1rem; font-weight: bold; }
.chat-message { display: flex; gap: 0.8rem; margin: 1rem 0; }
.chat-message .avatar { font-size: 1.5rem; }
.chat-message .body { flex: 1; }
.chat-message .refined-query { font-size: 0.85rem; color: #666; margin-bottom: 0.4rem; }
.link-row { display: flex; gap: 0.5rem; }
.link-row a.link-button { flex: 1; text-align: center; padding: 0.5rem; }
.error-banner { background: #fdecea; border-radius: 8px; padding: 1rem; margin: 1rem 0; }
.ask-form { display: flex; gap: 0.5rem; margin-top: 2rem; }
.ask-form input[name=question] { flex: 1; padding: 0.7rem; border-radius: 8px; border: 1px solid #ccc; }
"#;

/// Failed turn shown above the question form.
#[derive(Debug, Clone)]
pub struct ErrorBanner {
    pub message: String,
    pub detail: String,
}

/// Everything needed to render one page.
pub struct PageView<'a> {
    pub session_id: Uuid,
    pub theme: Theme,
    /// Base64 background photo for the `yonsei` theme; may be empty.
    pub background_b64: &'a str,
    pub turns: &'a [Turn],
    pub error: Option<&'a ErrorBanner>,
}

/// Escape text for HTML element and attribute context.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_multiline(s: &str) -> String {
    escape_html(s).replace('\n', "<br>")
}

/// Answer box plus up to four link buttons.
pub fn render_answer(answer: &Answer) -> String {
    let mut html = format!("<div class=\"answer-box\">{}</div>", escape_multiline(&answer.text));
    if !answer.links.is_empty() {
        html.push_str(&format!("<p class=\"caption\">{LINKS_CAPTION}</p><div class=\"link-row\">"));
        for link in &answer.links {
            html.push_str(&format!(
                "<a class=\"link-button\" href=\"{}\" target=\"_blank\" rel=\"noopener\" title=\"{}\">{}</a>",
                escape_html(&link.url),
                escape_html(&link.label),
                escape_html(&link.display_label()),
            ));
        }
        html.push_str("</div>");
    }
    html
}

fn render_turn(turn: &Turn) -> String {
    match turn.role {
        TurnRole::User => format!(
            "<div class=\"chat-message user\"><span class=\"avatar\">👤</span><div class=\"body\">{}</div></div>",
            escape_multiline(&turn.content)
        ),
        TurnRole::Assistant => {
            let caption = turn
                .refined_query
                .as_deref()
                .map(|q| format!("<div class=\"refined-query\">🦅 '{}' 정보 확인 결과</div>", escape_html(q)))
                .unwrap_or_default();
            format!(
                "<div class=\"chat-message assistant\"><span class=\"avatar\">🦅</span><div class=\"body\">{caption}{}</div></div>",
                render_answer(&postprocess::process(&turn.content))
            )
        }
    }
}

fn render_title(theme: Theme) -> String {
    match theme {
        Theme::Yonsei => format!(
            "<div class=\"title-row\"><h1>🦅 <span id=\"yonsei-title-prefix\" style=\"font-size: 50%;\">무엇이든</span> {APP_TITLE}</h1>\
             <a class=\"love-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\"><span id=\"love-yonsei-text\">나는 연세를 사랑한다</span></a></div>",
            escape_html(LOVE_YONSEI_URL)
        ),
        Theme::Default => {
            format!("<div class=\"title-row\"><h1>🦅 <span style=\"font-size: 50%;\">무엇이든</span> {APP_TITLE}</h1></div>")
        }
    }
}

fn render_sidebar(session_id: Uuid) -> String {
    format!(
        r#"<aside class="sidebar">
<h1>🦅 {APP_TITLE}</h1>
<div class="info">연세대학교와 관련된 정보를 물어보면 답해드립니다!</div>
<div class="warning">질문 답변중 모드를 바꾸지 마세요.</div>
<hr>
<h3>화면 스타일 설정</h3>
<form method="post" action="/theme">
<input type="hidden" name="session_id" value="{session_id}">
<button type="submit" name="theme" value="default">기본 모드</button>
<button type="submit" name="theme" value="yonsei">연세 모드</button>
</form>
</aside>"#
    )
}

/// Render the full chat page.
pub fn render_page(view: &PageView<'_>) -> String {
    let mut main = render_title(view.theme);
    main.push_str("<hr>");
    for turn in view.turns {
        main.push_str(&render_turn(turn));
    }
    if let Some(err) = view.error {
        main.push_str(&format!(
            "<div class=\"error-banner\"><strong>{}</strong><pre>{}</pre></div>",
            escape_html(&err.message),
            escape_html(&err.detail)
        ));
    }
    main.push_str(&format!(
        "<form class=\"ask-form\" method=\"post\" action=\"/ask\">\
         <input type=\"hidden\" name=\"session_id\" value=\"{}\">\
         <input type=\"text\" name=\"question\" placeholder=\"{INPUT_PLACEHOLDER}\" autocomplete=\"off\" autofocus required>\
         <button type=\"submit\">➤</button></form>",
        view.session_id
    ));

    format!(
        r#"<!doctype html>
<html lang="ko">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{APP_TITLE}</title>
<style>{LAYOUT_CSS}{theme}</style>
</head>
<body>
<div class="layout">
{sidebar}
<main class="app">{main}</main>
</div>
</body>
</html>
"#,
        theme = theme_css(view.theme, view.background_b64),
        sidebar = render_sidebar(view.session_id),
    )
}
