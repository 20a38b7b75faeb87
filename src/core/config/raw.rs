//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape: serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub app: RawApp,
    #[serde(default)]
    pub comms: RawComms,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub search: RawSearch,
    #[serde(default)]
    pub agent: RawAgent,
    #[serde(default)]
    pub ui: RawUi,
    #[serde(default)]
    pub memory: RawMemory,
}

#[derive(Deserialize)]
pub(super) struct RawApp {
    pub name: String,
    pub log_level: String,
}

// ── Comms ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawComms {
    #[serde(default)]
    pub axum_channel: RawAxumChannel,
}

#[derive(Deserialize)]
pub(super) struct RawAxumChannel {
    #[serde(default = "default_http_bind")]
    pub bind: String,
}

impl Default for RawAxumChannel {
    fn default() -> Self {
        Self { bind: default_http_bind() }
    }
}

// ── LLM ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ── Search ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawSearch {
    #[serde(rename = "default", default = "default_search_provider")]
    pub provider: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub tavily: RawTavilyConfig,
}

impl Default for RawSearch {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            max_results: default_max_results(),
            tavily: RawTavilyConfig::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawTavilyConfig {
    #[serde(default = "default_tavily_api_url")]
    pub api_url: String,
    #[serde(default = "default_tavily_search_depth")]
    pub search_depth: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawTavilyConfig {
    fn default() -> Self {
        Self {
            api_url: default_tavily_api_url(),
            search_depth: default_tavily_search_depth(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ── Agent / UI / memory ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawAgent {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
}

impl Default for RawAgent {
    fn default() -> Self {
        Self { max_iterations: default_max_iterations(), prompts_dir: default_prompts_dir() }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawUi {
    #[serde(default)]
    pub background_image: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct RawMemory {
    #[serde(default)]
    pub transcript_cap: Option<usize>,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for RawMemory {
    fn default() -> Self {
        Self { transcript_cap: None, max_sessions: default_max_sessions() }
    }
}

// ── Defaults ────────────────────────────────────────────────────────────────

pub(super) fn default_http_bind() -> String { "127.0.0.1:8501".to_string() }
fn default_max_sessions() -> usize { 1000 }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o".to_string() }
fn default_openai_temperature() -> f32 { 0.0 }
fn default_timeout_seconds() -> u64 { 60 }
fn default_search_provider() -> String { "dummy".to_string() }
fn default_max_results() -> usize { 15 }
fn default_tavily_api_url() -> String { "https://api.tavily.com/search".to_string() }
fn default_tavily_search_depth() -> String { "basic".to_string() }
fn default_max_iterations() -> usize { 15 }
fn default_prompts_dir() -> String { "config/prompts".to_string() }
