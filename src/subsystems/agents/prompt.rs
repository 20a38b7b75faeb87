//! Layered prompt builder for the refinement step and the agent loop.
//!
//! Prompts are plain-text templates stored under `config/prompts/`. Each
//! template ships embedded in the binary as well, so a missing or unreadable
//! prompts directory falls back to the built-in text instead of failing the
//! turn.
//!
//! ## Templates
//!
//! ```text
//! refine.md       : query rewriting rules; {{abbreviations}}
//! search_agent.md : persona + decision tree; {{today}}
//! ```
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const SEPARATOR: &str = "\n\n";

pub const REFINE_PROMPT: &str = "refine.md";
pub const SEARCH_AGENT_PROMPT: &str = "search_agent.md";

pub const BUILTIN_REFINE: &str = include_str!("../../../config/prompts/refine.md");
pub const BUILTIN_SEARCH_AGENT: &str = include_str!("../../../config/prompts/search_agent.md");

/// Fluent builder that assembles a prompt from template files.
///
/// ```rust
/// use ask_yonsei::subsystems::agents::prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new("config/prompts")
///     .append("Today is {{today}}.")
///     .var("today", "2025년 03월 02일")
///     .build();
/// assert_eq!(prompt, "Today is 2025년 03월 02일.");
/// ```
pub struct PromptBuilder {
    prompts_dir: PathBuf,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    /// Create a builder rooted at `prompts_dir` (e.g. `"config/prompts"`).
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append a layer loaded from `filename` in the prompts directory, or
    /// `fallback` when the file is missing or empty.
    pub fn layer_or(mut self, filename: &str, fallback: &str) -> Self {
        match self.read(filename) {
            Some(text) if !text.trim().is_empty() => self.push(text),
            _ => {
                tracing::debug!(%filename, "prompt: using built-in template");
                self.push(fallback.to_string());
            }
        }
        self
    }

    /// Directly append a text fragment.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        self.push(text.into());
        self
    }

    /// Register a single variable.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Join all layers with blank lines and apply variable substitution.
    pub fn build(self) -> String {
        let mut prompt = self.parts.join(SEPARATOR);
        for (k, v) in &self.vars {
            let placeholder = format!("{{{{{}}}}}", k);
            prompt = prompt.replace(&placeholder, v);
        }
        prompt
    }

    fn read(&self, filename: &str) -> Option<String> {
        let path = self.prompts_dir.join(filename);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(_) => {
                tracing::debug!("prompt: layer '{}' not found — skipped", path.display());
                None
            }
        }
    }

    fn push(&mut self, text: String) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
    }
}
