//! Dummy LLM provider: echoes the last user message back prefixed with `[echo]`.
//! Lets the whole turn pipeline run offline without an API key.

use crate::llm::{ChatMessage, LlmResponse, ProviderError, Role, ToolSpec};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> Result<LlmResponse, ProviderError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(LlmResponse {
            text: format!("[echo] {last_user}"),
            tool_calls: Vec::new(),
            usage: None,
        })
    }
}
