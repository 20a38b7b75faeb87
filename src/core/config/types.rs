//! Public configuration structs consumed by subsystems.

use std::path::PathBuf;

/// Axum channel configuration.
#[derive(Debug, Clone)]
pub struct AxumChannelConfig {
    /// Socket address to bind the web UI / API listener to.
    pub bind: String,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub axum_channel: AxumChannelConfig,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM subsystem configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`).
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Tavily search API configuration (`[search.tavily]`).
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_url: String,
    /// `"basic"` or `"advanced"`.
    pub search_depth: String,
    pub timeout_seconds: u64,
}

/// Web search tool configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Which provider is active (`"dummy"`, `"tavily"`).
    pub provider: String,
    /// Result cap per query, clamped to [`MAX_SEARCH_RESULTS`].
    pub max_results: usize,
    pub tavily: TavilyConfig,
}

/// Hard ceiling on search results per tool call.
pub const MAX_SEARCH_RESULTS: usize = 15;

/// Agent loop configuration (`[agent]`).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum model calls per turn before the loop gives up.
    pub max_iterations: usize,
    /// Directory holding prompt template overrides.
    pub prompts_dir: PathBuf,
}

/// Web UI configuration (`[ui]`).
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Background image used by the `yonsei` theme. Missing file is tolerated.
    pub background_image: Option<PathBuf>,
}

/// Session memory configuration (`[memory]`).
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    /// Max conversation turns kept per session; `None` = unbounded.
    pub transcript_cap: Option<usize>,
    /// Max live sessions; the least recently active one is evicted when a
    /// new session would exceed it. `None` (configured as 0) = unbounded.
    pub max_sessions: Option<usize>,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    pub comms: CommsConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub agent: AgentConfig,
    pub ui: UiConfig,
    pub memory: MemoryConfig,
    /// From `LLM_API_KEY` (fallback `OPENAI_API_KEY`). Never sourced from TOML.
    pub llm_api_key: Option<String>,
    /// From `TAVILY_API_KEY`. Never sourced from TOML.
    pub search_api_key: Option<String>,
}
