//! Search-augmented agent loop.
//!
//! The model is offered a single `web_search` tool and called repeatedly:
//! every tool call it makes is executed and fed back as a `tool` message,
//! until it replies with plain text. That text is the answer, expected to end
//! with a `||SOURCE:<url>` marker.
//!
//! Tool failures never abort the loop. Bad arguments, unknown tool names and
//! search errors are returned to the model as the tool result so it can
//! correct itself. Only provider errors and the iteration bound end a turn
//! early.

use std::path::Path;

use chrono::Local;
use tracing::{debug, info, trace, warn};

use super::AgentError;
use super::prompt::{BUILTIN_SEARCH_AGENT, PromptBuilder, SEARCH_AGENT_PROMPT};
use crate::llm::{ChatMessage, LlmProvider, LlmUsage, ToolCall};
use crate::subsystems::tools::{SearchProvider, WEB_SEARCH_TOOL, WebSearchArgs, web_search_spec};

/// Date format embedded in the system prompt.
pub const PROMPT_DATE_FORMAT: &str = "%Y년 %m월 %d일";

#[derive(Debug, Clone)]
pub struct SearchAgent {
    llm: LlmProvider,
    search: SearchProvider,
    /// Unrendered template; `{{today}}` is filled per run.
    template: String,
    max_iterations: usize,
}

impl SearchAgent {
    pub fn new(llm: LlmProvider, search: SearchProvider, prompts_dir: &Path, max_iterations: usize) -> Self {
        let template = PromptBuilder::new(prompts_dir)
            .layer_or(SEARCH_AGENT_PROMPT, BUILTIN_SEARCH_AGENT)
            .build();
        Self { llm, search, template, max_iterations }
    }

    /// System prompt with `today` substituted.
    pub fn system_prompt(&self, today: &str) -> String {
        PromptBuilder::new("")
            .append(self.template.as_str())
            .var("today", today)
            .build()
    }

    /// Run the loop on a refined query and return the model's final text.
    pub async fn run(&self, query: &str) -> Result<String, AgentError> {
        let today = Local::now().format(PROMPT_DATE_FORMAT).to_string();
        let tools = [web_search_spec()];
        let mut messages = vec![ChatMessage::system(self.system_prompt(&today)), ChatMessage::user(query)];
        let mut usage = LlmUsage::default();

        for iteration in 1..=self.max_iterations {
            let response = self.llm.chat(&messages, &tools).await?;
            if let Some(u) = response.usage {
                usage.input_tokens += u.input_tokens;
                usage.output_tokens += u.output_tokens;
            }

            if response.tool_calls.is_empty() {
                if response.text.is_empty() {
                    warn!(iteration, "agent returned an empty answer");
                    return Err(AgentError::EmptyAnswer);
                }
                info!(
                    iteration,
                    chars = response.text.len(),
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "agent loop finished"
                );
                trace!(answer = %response.text, "agent final answer");
                return Ok(response.text);
            }

            debug!(iteration, calls = response.tool_calls.len(), "agent requested tools");
            let calls = response.tool_calls.clone();
            messages.push(ChatMessage::assistant_tool_calls(response.text, response.tool_calls));

            for call in &calls {
                let output = self.execute(call).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), output));
            }
        }

        warn!(
            max_iterations = self.max_iterations,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "agent loop hit iteration limit"
        );
        Err(AgentError::IterationLimit(self.max_iterations))
    }

    /// Execute one tool call; the returned string is what the model sees.
    async fn execute(&self, call: &ToolCall) -> String {
        if call.name != WEB_SEARCH_TOOL {
            warn!(tool = %call.name, "model called unknown tool");
            return format!("Error: unknown tool '{}'. Available tools: {WEB_SEARCH_TOOL}", call.name);
        }

        let args: WebSearchArgs = match serde_json::from_str(&call.arguments) {
            Ok(a) => a,
            Err(e) => {
                warn!(arguments = %call.arguments, error = %e, "invalid web_search arguments");
                return format!("Error: invalid arguments for {WEB_SEARCH_TOOL}: {e}");
            }
        };

        match self.search.search(&args.query).await {
            Ok(hits) => {
                debug!(query = %args.query, hits = hits.len(), "web_search done");
                serde_json::to_string(&hits).unwrap_or_else(|_| "[]".to_string())
            }
            Err(e) => {
                warn!(query = %args.query, error = %e, "web_search failed");
                format!("Error: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;
    use crate::subsystems::tools::tavily::TavilyProvider;
    use crate::test_support::{MockServer, Recorded};
    use serde_json::{Value, json};

    fn tool_call_reply(id: &str, arguments: &str) -> Value {
        json!({
            "choices": [{ "message": {
                "content": null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": { "name": "web_search", "arguments": arguments }
                }]
            }}]
        })
    }

    fn text_reply(text: &str) -> Value {
        json!({ "choices": [{ "message": { "content": text } }] })
    }

    fn llm(server: &MockServer) -> LlmProvider {
        LlmProvider::OpenAiCompatible(
            OpenAiCompatibleProvider::new(server.url("/v1/chat/completions"), "gpt-4o".into(), 0.0, 5, None)
                .unwrap(),
        )
    }

    fn agent(llm: LlmProvider, search: SearchProvider, max_iterations: usize) -> SearchAgent {
        SearchAgent::new(llm, search, Path::new("/nonexistent"), max_iterations)
    }

    #[tokio::test]
    async fn executes_search_then_returns_final_text() {
        let llm_calls = Recorded::default();
        let llm_server = MockServer::start(llm_calls.route_sequence(vec![
            tool_call_reply("call_1", r#"{"query":"연세대학교 중앙도서관 운영시간"}"#),
            text_reply("09:00~22:00 운영합니다. ||SOURCE:https://library.yonsei.ac.kr"),
        ]))
        .await;

        let search_calls = Recorded::default();
        let search_server = MockServer::start(search_calls.route_json(json!({
            "results": [{ "title": "중앙도서관", "url": "https://library.yonsei.ac.kr", "content": "운영시간" }]
        })))
        .await;
        let search = SearchProvider::Tavily(
            TavilyProvider::new(search_server.url("/search"), "tvly".into(), 15, "basic".into(), 5).unwrap(),
        );

        let out = agent(llm(&llm_server), search, 15).run("연세대학교 중앙도서관 운영시간 최신").await.unwrap();
        assert_eq!(out, "09:00~22:00 운영합니다. ||SOURCE:https://library.yonsei.ac.kr");

        assert_eq!(search_calls.last().await["query"], "연세대학교 중앙도서관 운영시간");

        let requests = llm_calls.all().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["tools"][0]["function"]["name"], "web_search");
        let second = requests[1]["messages"].as_array().unwrap();
        assert_eq!(second.len(), 4);
        assert_eq!(second[1]["content"], "연세대학교 중앙도서관 운영시간 최신");
        assert_eq!(second[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(second[3]["role"], "tool");
        assert_eq!(second[3]["tool_call_id"], "call_1");
        let tool_output: Value = serde_json::from_str(second[3]["content"].as_str().unwrap()).unwrap();
        assert_eq!(tool_output[0]["url"], "https://library.yonsei.ac.kr");
        assert_eq!(tool_output[0]["content"], "운영시간");
    }

    #[tokio::test]
    async fn malformed_arguments_are_reported_to_model() {
        let llm_calls = Recorded::default();
        let llm_server = MockServer::start(llm_calls.route_sequence(vec![
            tool_call_reply("call_x", "not json"),
            text_reply("죄송합니다. ||SOURCE:https://www.yonsei.ac.kr"),
        ]))
        .await;

        let out = agent(llm(&llm_server), SearchProvider::Dummy, 15).run("q").await.unwrap();
        assert!(out.starts_with("죄송합니다."));

        let requests = llm_calls.all().await;
        let tool_msg = &requests[1]["messages"][3];
        assert_eq!(tool_msg["role"], "tool");
        assert!(tool_msg["content"].as_str().unwrap().contains("invalid arguments"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_model() {
        let llm_calls = Recorded::default();
        let llm_server = MockServer::start(llm_calls.route_sequence(vec![
            json!({ "choices": [{ "message": { "content": null, "tool_calls": [{
                "id": "c1", "type": "function",
                "function": { "name": "calculator", "arguments": "{}" }
            }]}}]}),
            text_reply("done"),
        ]))
        .await;

        agent(llm(&llm_server), SearchProvider::Dummy, 15).run("q").await.unwrap();
        let requests = llm_calls.all().await;
        let content = requests[1]["messages"][3]["content"].as_str().unwrap().to_string();
        assert!(content.contains("unknown tool 'calculator'"));
    }

    #[tokio::test]
    async fn search_failure_is_reported_to_model() {
        let llm_calls = Recorded::default();
        let llm_server = MockServer::start(llm_calls.route_sequence(vec![
            tool_call_reply("c1", r#"{"query":"x"}"#),
            text_reply("done"),
        ]))
        .await;
        let search = SearchProvider::Tavily(
            TavilyProvider::new("http://127.0.0.1:9/search".into(), "tvly".into(), 15, "basic".into(), 1).unwrap(),
        );

        let out = agent(llm(&llm_server), search, 15).run("q").await.unwrap();
        assert_eq!(out, "done");
        let requests = llm_calls.all().await;
        assert!(requests[1]["messages"][3]["content"].as_str().unwrap().starts_with("Error:"));
    }

    #[tokio::test]
    async fn iteration_limit_enforced() {
        let llm_calls = Recorded::default();
        let llm_server =
            MockServer::start(llm_calls.route_json(tool_call_reply("loop", r#"{"query":"again"}"#))).await;

        let err = agent(llm(&llm_server), SearchProvider::Dummy, 3).run("q").await.unwrap_err();
        assert!(matches!(err, AgentError::IterationLimit(3)));
        assert_eq!(llm_calls.all().await.len(), 3);
    }

    #[tokio::test]
    async fn blank_final_answer_is_an_error() {
        let llm_calls = Recorded::default();
        let llm_server = MockServer::start(llm_calls.route_json(text_reply("  \n"))).await;

        let err = agent(llm(&llm_server), SearchProvider::Dummy, 5).run("q").await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyAnswer));
        assert_eq!(llm_calls.all().await.len(), 1);
    }

    #[tokio::test]
    async fn dummy_provider_answers_immediately() {
        let out = agent(LlmProvider::Dummy(DummyProvider), SearchProvider::Dummy, 15)
            .run("연세대학교 학생회관")
            .await
            .unwrap();
        assert_eq!(out, "[echo] 연세대학교 학생회관");
    }

    #[test]
    fn system_prompt_carries_persona_and_date() {
        let a = agent(LlmProvider::Dummy(DummyProvider), SearchProvider::Dummy, 15);
        let prompt = a.system_prompt("2025년 03월 02일");
        assert!(prompt.contains("연수리"));
        assert!(prompt.contains("(현재: 2025년 03월 02일)"));
        assert!(prompt.contains("||SOURCE:"));
        assert!(!prompt.contains("{{today}}"));
    }

    #[test]
    fn date_format_is_zero_padded() {
        let d = chrono::NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(d.format(PROMPT_DATE_FORMAT).to_string(), "2025년 03월 02일");
    }
}
