//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `ASK_YONSEI_LOG_LEVEL` and `ASK_YONSEI_BIND` env overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::raw::RawConfig;
use super::types::*;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Used when neither `-f` nor `config/default.toml` is available.
const MINIMAL_TOML: &str = r#"
[app]
name = "ask-yonsei"
log_level = "info"
"#;

/// Deep-merge two TOML values.
/// Tables are merged recursively: the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    if let Some(base_str) = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
    {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_toml(base_val, overlay_val))
    } else {
        Ok(overlay_val)
    }
}

/// Env-sourced values layered over the TOML.
///
/// Collected once in [`load`]; tests build this directly instead of mutating
/// the process environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub bind: Option<String>,
    pub llm_api_key: Option<String>,
    pub search_api_key: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("ASK_YONSEI_LOG_LEVEL").ok(),
            bind: env::var("ASK_YONSEI_BIND").ok(),
            llm_api_key: env::var("LLM_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            search_api_key: env::var("TAVILY_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env-var overrides.
/// If no path is given and `config/default.toml` does not exist, falls back to
/// built-in defaults (dummy providers).
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        let value: toml::Value = toml::from_str(MINIMAL_TOML)
            .map_err(|e| AppError::Config(format!("built-in defaults: {e}")))?;
        resolve(value, &overrides)
    }
}

/// Internal loader: accepts an explicit path and pre-collected overrides.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let mut visited = HashSet::new();
    let merged = load_raw_merged(path, &mut visited)?;
    resolve(merged, overrides)
}

fn resolve(merged: toml::Value, overrides: &Overrides) -> Result<Config, AppError> {
    let parsed: RawConfig = merged
        .try_into()
        .map_err(|e| AppError::Config(format!("invalid config: {e}")))?;

    if parsed.agent.max_iterations == 0 {
        return Err(AppError::Config("agent.max_iterations must be at least 1".into()));
    }

    let log_level = overrides.log_level.clone().unwrap_or(parsed.app.log_level);
    let bind = overrides.bind.clone().unwrap_or(parsed.comms.axum_channel.bind);

    Ok(Config {
        app_name: parsed.app.name,
        log_level,
        comms: CommsConfig {
            axum_channel: AxumChannelConfig { bind },
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        search: SearchConfig {
            provider: parsed.search.provider,
            max_results: parsed.search.max_results.clamp(1, MAX_SEARCH_RESULTS),
            tavily: TavilyConfig {
                api_url: parsed.search.tavily.api_url,
                search_depth: parsed.search.tavily.search_depth,
                timeout_seconds: parsed.search.tavily.timeout_seconds,
            },
        },
        agent: AgentConfig {
            max_iterations: parsed.agent.max_iterations,
            prompts_dir: expand_home(&parsed.agent.prompts_dir),
        },
        ui: UiConfig {
            background_image: parsed.ui.background_image.as_deref().map(expand_home),
        },
        memory: MemoryConfig {
            transcript_cap: parsed.memory.transcript_cap,
            max_sessions: Some(parsed.memory.max_sessions).filter(|&n| n > 0),
        },
        llm_api_key: overrides.llm_api_key.clone(),
        search_api_key: overrides.search_api_key.clone(),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
