//! Query refinement: rewrite a raw question into a search-engine keyword
//! string before the agent loop sees it.

use std::path::Path;

use tracing::{debug, warn};

use super::AgentError;
use super::prompt::{BUILTIN_REFINE, PromptBuilder, REFINE_PROMPT};
use crate::llm::{ChatMessage, LlmProvider};

/// Campus shorthand and the official name it expands to.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("언기도", "연세대학교 언더우드기념도서관"),
    ("중도", "연세대학교 중앙도서관"),
    ("학관", "연세대학교 학생회관"),
    ("공라", "연세대학교 공학원 도서관"),
    ("국캠/송도", "연세대학교 국제캠퍼스"),
    ("신촌", "연세대학교 신촌캠퍼스"),
    ("복전", "연세대학교 복수전공"),
];

/// The dictionary block substituted for `{{abbreviations}}`.
pub fn render_abbreviations() -> String {
    let mut out = String::from("[약어 사전]");
    for (short, full) in ABBREVIATIONS {
        out.push_str(&format!("\n- {short} -> {full}"));
    }
    out
}

/// Load the refinement system prompt with the dictionary filled in.
pub fn refine_system_prompt(prompts_dir: &Path) -> String {
    PromptBuilder::new(prompts_dir)
        .layer_or(REFINE_PROMPT, BUILTIN_REFINE)
        .var("abbreviations", render_abbreviations())
        .build()
}

/// Rewrite `question` into a search string.
///
/// `memory` is replayed between the system prompt and the question, oldest
/// first. Call failures propagate; nothing is retried.
pub async fn refine_query(
    llm: &LlmProvider,
    system_prompt: &str,
    question: &str,
    memory: &[ChatMessage],
) -> Result<String, AgentError> {
    let mut messages = Vec::with_capacity(memory.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(memory.iter().cloned());
    messages.push(ChatMessage::user(question));

    let reply = llm.complete(&messages).await?;
    let refined = reply.trim();
    if refined.is_empty() {
        warn!("refinement returned blank text; using the raw question");
        return Ok(question.trim().to_string());
    }

    debug!(%question, %refined, history = memory.len(), "query refined");
    Ok(refined.to_string())
}
