//! Page themes and their CSS.
//!
//! Two themes: `default` (green link buttons) and `yonsei` (navy buttons,
//! full-page background photo, Noto Sans KR). The sidebar looks the same in
//! both.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Yonsei,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Yonsei => "yonsei",
        }
    }

    /// Link button background colour.
    pub fn button_color(self) -> &'static str {
        match self {
            Theme::Default => "#28a745",
            Theme::Yonsei => "#003876",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "yonsei" => Ok(Theme::Yonsei),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Base64 of the file at `path`, or `""` when it is absent or unreadable.
pub fn load_background_image(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => STANDARD.encode(bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "background image unavailable");
            String::new()
        }
    }
}

const SIDEBAR_CSS: &str = r#"
.sidebar {
    background-color: #ffffff !important;
    border-right: 1px solid #e0e0e0 !important;
}
.sidebar h1, .sidebar h2, .sidebar h3, .sidebar p, .sidebar span, .sidebar div, .sidebar label {
    color: #333333 !important;
    text-shadow: none !important;
}
.sidebar button {
    background-color: #ffffff !important;
    color: #333333 !important;
    border: 1px solid #ccc !important;
}
.sidebar button:hover {
    background-color: #f0f0f0 !important;
    border-color: #999 !important;
}
"#;

const DEFAULT_CSS: &str = r#"
.answer-box {
    padding: 1.2rem;
    border-radius: 10px;
    background-color: #f8f9fa;
    border-left: 5px solid #003876;
    margin-bottom: 1rem;
    font-size: 1.05rem;
    line-height: 1.6;
    color: #333;
}
"#;

const YONSEI_CSS: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Noto+Sans+KR:wght@700;900&display=swap');

.app::before {
    content: "";
    position: fixed;
    top: 0; left: 0; width: 100%; height: 100%;
    background-color: rgba(255, 255, 255, 0.85);
    z-index: -1;
}
.app, .app p, .app h2, .app h3, .app li, .app span, .app div {
    color: #003876 !important;
    font-family: 'Noto Sans KR', sans-serif !important;
    font-weight: 700 !important;
}
.caption { color: #ffffff !important; }
h1 {
    color: #ffffff !important;
    font-family: 'Noto Sans KR', sans-serif !important;
    text-shadow: 2px 2px 4px rgba(0,0,0,0.5);
}
#yonsei-title-prefix { color: #ffffff !important; }
#love-yonsei-text { color: #FFD700 !important; }
.answer-box {
    padding: 1.2rem;
    border-radius: 10px;
    background-color: rgba(248, 249, 250, 0.95);
    border: 1px solid #003876 !important;
    border-left: 5px solid #003876 !important;
    margin-bottom: 1rem;
    font-size: 1.05rem;
    line-height: 1.6;
    color: #003876 !important;
    font-family: 'Noto Sans KR', sans-serif !important;
}
"#;

fn button_css(bg: &str, fg: &str) -> String {
    format!(
        r#"
a.link-button {{
    background-color: {bg} !important;
    color: {fg} !important;
    border: none !important;
    font-weight: bold !important;
    border-radius: 8px !important;
    text-decoration: none !important;
}}
a.link-button * {{ color: {fg} !important; }}
a.link-button:hover {{
    background-color: {bg} !important;
    filter: brightness(0.9);
    color: {fg} !important;
}}
"#
    )
}

/// Full stylesheet for `theme`. `background_b64` is only used by `yonsei`;
/// an empty string leaves the page without a background photo.
pub fn theme_css(theme: Theme, background_b64: &str) -> String {
    let mut css = String::from(SIDEBAR_CSS);
    css.push_str(&button_css(theme.button_color(), "#ffffff"));
    match theme {
        Theme::Default => css.push_str(DEFAULT_CSS),
        Theme::Yonsei => {
            if !background_b64.is_empty() {
                css.push_str(&format!(
                    ".app {{\n    background-image: url('data:image/jpg;base64,{background_b64}');\n    \
                     background-size: cover;\n    background-position: center;\n    background-attachment: fixed;\n}}\n"
                ));
            }
            css.push_str(YONSEI_CSS);
        }
    }
    css
}
