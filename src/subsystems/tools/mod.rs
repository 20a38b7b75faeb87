//! Web search tool: the only tool the agent loop can call.
//!
//! `SearchProvider` follows the same enum-dispatch pattern as
//! [`LlmProvider`](crate::llm::LlmProvider): one variant per backend, built
//! once at startup by [`build`], cloned freely afterwards.

pub mod tavily;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::{MAX_SEARCH_RESULTS, SearchConfig};
use crate::llm::ToolSpec;

/// Name the model uses to call the search tool.
pub const WEB_SEARCH_TOOL: &str = "web_search";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unknown search provider: {0}")]
    UnknownProvider(String),
    #[error("missing API key: {0}")]
    MissingApiKey(&'static str),
    #[error("search request failed: {0}")]
    Request(String),
    #[error("search response malformed: {0}")]
    Parse(String),
}

// ── Types ─────────────────────────────────────────────────────────────────────

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Result snippet; serialised as `content` to match what the model sees
    /// from most search APIs.
    #[serde(rename = "content")]
    pub snippet: String,
}

/// Arguments the model passes to [`WEB_SEARCH_TOOL`].
#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum SearchProvider {
    /// Offline provider: every query yields no results.
    Dummy,
    Tavily(tavily::TavilyProvider),
}

impl SearchProvider {
    pub fn name(&self) -> &'static str {
        match self {
            SearchProvider::Dummy => "dummy",
            SearchProvider::Tavily(_) => "tavily",
        }
    }

    /// Run `query` and return at most the configured number of hits.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        match self {
            SearchProvider::Dummy => Ok(Vec::new()),
            SearchProvider::Tavily(p) => p.search(query).await,
        }
    }
}

/// Construct the configured search provider.
///
/// `api_key` comes from `TAVILY_API_KEY`; Tavily refuses to start without it.
pub fn build(config: &SearchConfig, api_key: Option<String>) -> Result<SearchProvider, SearchError> {
    match config.provider.as_str() {
        "dummy" => Ok(SearchProvider::Dummy),
        "tavily" => {
            let key = api_key.ok_or(SearchError::MissingApiKey("TAVILY_API_KEY"))?;
            let t = &config.tavily;
            let p = tavily::TavilyProvider::new(
                t.api_url.clone(),
                key,
                config.max_results.min(MAX_SEARCH_RESULTS),
                t.search_depth.clone(),
                t.timeout_seconds,
            )?;
            Ok(SearchProvider::Tavily(p))
        }
        other => Err(SearchError::UnknownProvider(other.to_string())),
    }
}

/// Function-calling schema for [`WEB_SEARCH_TOOL`].
pub fn web_search_spec() -> ToolSpec {
    ToolSpec {
        name: WEB_SEARCH_TOOL.to_string(),
        description: "Search the web for current information. Input is a keyword query; \
                      output is a JSON list of {title, url, content} results."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "search query" }
            },
            "required": ["query"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn tavily_requires_key() {
        let mut cfg = Config::test_default();
        cfg.search.provider = "tavily".into();
        let err = build(&cfg.search, None).unwrap_err();
        assert!(err.to_string().contains("TAVILY_API_KEY"));
    }

    #[test]
    fn unknown_provider_errors() {
        let mut cfg = Config::test_default();
        cfg.search.provider = "bing".into();
        assert!(matches!(build(&cfg.search, None), Err(SearchError::UnknownProvider(_))));
    }

    #[tokio::test]
    async fn dummy_returns_nothing() {
        let cfg = Config::test_default();
        let p = build(&cfg.search, None).unwrap();
        assert_eq!(p.name(), "dummy");
        assert!(p.search("anything").await.unwrap().is_empty());
    }

    #[test]
    fn spec_requires_query() {
        let spec = web_search_spec();
        assert_eq!(spec.name, WEB_SEARCH_TOOL);
        assert_eq!(spec.parameters["required"][0], "query");
    }

    #[test]
    fn hit_serialises_snippet_as_content() {
        let hit = SearchHit { title: "t".into(), url: "https://u".into(), snippet: "s".into() };
        let v = serde_json::to_value(&hit).unwrap();
        assert_eq!(v["content"], "s");
    }
}
