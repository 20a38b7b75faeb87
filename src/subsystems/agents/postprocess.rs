//! Response post-processing: turn raw agent output into display text plus
//! link buttons.
//!
//! The agent answers in free text that may contain markdown links and ends
//! with a `||SOURCE:<url>` marker. [`process`] strips both from the visible
//! text, merges the URLs (inline links first, then marker URLs not already
//! seen), drops denylisted URLs and keeps the first [`MAX_LINKS`].
//!
//! Everything after the first marker is discarded from the display text,
//! including any prose the model wrote after it.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Literal token that introduces the source URL.
pub const SOURCE_MARKER: &str = "||SOURCE:";

/// Substring that identifies the university's own sites.
pub const UNIVERSITY_DOMAIN: &str = "yonsei.ac.kr";

/// URLs containing any of these are never shown.
pub const URL_DENYLIST: &[&str] = &["login", "auth", "member", "facebook", "instagram", "band.us"];

/// Max link buttons per answer.
pub const MAX_LINKS: usize = 4;

/// Display labels longer than this (in chars) are truncated.
pub const LABEL_MAX_CHARS: usize = 10;

const LABEL_ELLIPSIS: &str = "..";

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\((https?://[^)]+)\)").expect("markdown link pattern is valid")
});

static SOURCE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|\|SOURCE:(https?://\S+)").expect("source marker pattern is valid")
});

// ── Types ─────────────────────────────────────────────────────────────────────

/// Coarse classification of a URL, by substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    OfficialSite,
    Location,
    ApplicationForm,
    Related,
}

impl LinkKind {
    /// First match wins: university domain, then `map`, then Google Forms.
    pub fn classify(url: &str) -> Self {
        if url.contains(UNIVERSITY_DOMAIN) {
            LinkKind::OfficialSite
        } else if url.contains("map") {
            LinkKind::Location
        } else if url.contains("google") && url.contains("forms") {
            LinkKind::ApplicationForm
        } else {
            LinkKind::Related
        }
    }

    /// Button label used when the model gave none (source-marker URLs).
    pub fn label(self) -> &'static str {
        match self {
            LinkKind::OfficialSite => "🦅 공식 홈페이지",
            LinkKind::Location => "📍 지도/위치",
            LinkKind::ApplicationForm => "📝 신청 폼",
            LinkKind::Related => "관련 자료",
        }
    }
}

/// A link button candidate extracted from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCandidate {
    /// Full label: the markdown link text, or [`LinkKind::label`] for marker URLs.
    pub label: String,
    pub url: String,
    pub kind: LinkKind,
}

impl LinkCandidate {
    fn inline(text: &str, url: &str) -> Self {
        Self { label: text.to_string(), url: url.to_string(), kind: LinkKind::classify(url) }
    }

    fn from_marker(url: &str) -> Self {
        let kind = LinkKind::classify(url);
        Self { label: kind.label().to_string(), url: url.to_string(), kind }
    }

    /// Label as shown on the button: at most [`LABEL_MAX_CHARS`] chars plus `..`.
    pub fn display_label(&self) -> String {
        if self.label.chars().count() > LABEL_MAX_CHARS {
            let head: String = self.label.chars().take(LABEL_MAX_CHARS).collect();
            format!("{head}{LABEL_ELLIPSIS}")
        } else {
            self.label.clone()
        }
    }

    fn is_denied(&self) -> bool {
        URL_DENYLIST.iter().any(|bad| self.url.contains(bad))
    }
}

/// Post-processed agent answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Filtered, ordered, at most [`MAX_LINKS`].
    pub links: Vec<LinkCandidate>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Split a raw agent response into clean text and link candidates.
pub fn process(response: &str) -> Answer {
    let inline: Vec<LinkCandidate> = MARKDOWN_LINK
        .captures_iter(response)
        .map(|c| LinkCandidate::inline(&c[1], &c[2]))
        .collect();
    let without_links = MARKDOWN_LINK.replace_all(response, "$1");

    let marker_urls: Vec<&str> = SOURCE_LINK
        .captures_iter(&without_links)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    let text = match without_links.find(SOURCE_MARKER) {
        Some(idx) => &without_links[..idx],
        None => &without_links[..],
    }
    .trim()
    .to_string();

    let mut links = inline;
    for url in marker_urls {
        if !links.iter().any(|l| l.url == url) {
            links.push(LinkCandidate::from_marker(url));
        }
    }

    let links = links.into_iter().filter(|l| !l.is_denied()).take(MAX_LINKS).collect();

    Answer { text, links }
}
