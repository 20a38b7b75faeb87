//! Tavily search API client (`POST /search`).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{SearchError, SearchHit};

#[derive(Debug, Clone)]
pub struct TavilyProvider {
    client: Client,
    api_url: String,
    api_key: String,
    max_results: usize,
    search_depth: String,
}

impl TavilyProvider {
    pub fn new(
        api_url: String,
        api_key: String,
        max_results: usize,
        search_depth: String,
        timeout_seconds: u64,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| SearchError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_url, api_key, max_results, search_depth })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let body = SearchRequest {
            query,
            max_results: self.max_results,
            search_depth: &self.search_depth,
            include_answer: false,
            include_raw_content: false,
        };

        debug!(%query, max_results = self.max_results, "tavily search");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_url, error = %e, "tavily request failed (transport)");
                SearchError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(%status, "tavily returned HTTP error");
            return Err(SearchError::Request(format!("HTTP {status}: {text}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .filter_map(|r| {
                let url = r.url.trim().to_string();
                if url.is_empty() {
                    return None;
                }
                Some(SearchHit {
                    title: r.title.unwrap_or_else(|| "Untitled".to_string()),
                    url,
                    snippet: r.content.unwrap_or_default(),
                })
            })
            .take(self.max_results)
            .collect();

        debug!(hits = hits.len(), "tavily search done");
        Ok(hits)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
}
