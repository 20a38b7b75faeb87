//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `ASK_YONSEI_*` env overrides. API keys come from the
//! environment only.
//!
//! # Module layout
//!
//! - **types**: Public configuration structs consumed by subsystems.
//! - **raw**: Raw TOML deserialization types; kept private.
//! - **load**: Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{Overrides, expand_home, load, load_from};
pub use types::*;

impl Config {
    /// Safe `Config` for tests: dummy providers, no API keys, no external calls.
    pub fn test_default() -> Self {
        Self {
            app_name: "test".into(),
            log_level: "info".into(),
            comms: CommsConfig {
                axum_channel: AxumChannelConfig { bind: raw::default_http_bind() },
            },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            search: SearchConfig {
                provider: "dummy".into(),
                max_results: MAX_SEARCH_RESULTS,
                tavily: TavilyConfig {
                    api_url: "http://localhost:0/search".into(),
                    search_depth: "basic".into(),
                    timeout_seconds: 1,
                },
            },
            agent: AgentConfig {
                max_iterations: 15,
                prompts_dir: std::path::PathBuf::from("config/prompts"),
            },
            ui: UiConfig { background_image: None },
            memory: MemoryConfig::default(),
            llm_api_key: None,
            search_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[app]
name = "test-bot"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.app_name, "test-bot");
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.llm.openai.model, "gpt-4o");
        assert_eq!(cfg.llm.openai.temperature, 0.0);
        assert_eq!(cfg.search.provider, "dummy");
        assert_eq!(cfg.search.max_results, 15);
        assert_eq!(cfg.agent.max_iterations, 15);
        assert_eq!(cfg.comms.axum_channel.bind, "127.0.0.1:8501");
        assert!(cfg.ui.background_image.is_none());
        assert!(cfg.memory.transcript_cap.is_none());
        assert_eq!(cfg.memory.max_sessions, Some(1000));
    }

    #[test]
    fn zero_max_sessions_means_unbounded() {
        let f = write_toml(&format!("{MINIMAL_TOML}\n[memory]\nmax_sessions = 0\ntranscript_cap = 50\n"));
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert!(cfg.memory.max_sessions.is_none());
        assert_eq!(cfg.memory.transcript_cap, Some(50));
    }

    #[test]
    fn max_results_clamped_to_ceiling() {
        let f = write_toml(&format!("{MINIMAL_TOML}\n[search]\nmax_results = 40\n"));
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.search.max_results, MAX_SEARCH_RESULTS);
    }

    #[test]
    fn zero_iterations_rejected() {
        let f = write_toml(&format!("{MINIMAL_TOML}\n[agent]\nmax_iterations = 0\n"));
        let err = load_from(f.path(), &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("max_iterations"));
    }

    #[test]
    fn missing_app_section_errors() {
        let f = write_toml("[llm]\ndefault = \"openai\"\n");
        assert!(load_from(f.path(), &Overrides::default()).is_err());
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &Overrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn overrides_take_precedence() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = Overrides {
            log_level: Some("debug".into()),
            bind: Some("0.0.0.0:9000".into()),
            llm_api_key: Some("sk-test".into()),
            search_api_key: Some("tvly-test".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.comms.axum_channel.bind, "0.0.0.0:9000");
        assert_eq!(cfg.llm_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.search_api_key.as_deref(), Some("tvly-test"));
    }

    #[test]
    fn base_chain_merges_tables() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("base.toml"),
            "[app]\nname = \"base\"\nlog_level = \"info\"\n[llm]\ndefault = \"openai\"\n[llm.openai]\nmodel = \"gpt-4o\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("dev.toml"),
            "[meta]\nbase = \"base.toml\"\n[llm.openai]\nmodel = \"gpt-4o-mini\"\n",
        )
        .unwrap();

        let cfg = load_from(&dir.path().join("dev.toml"), &Overrides::default()).unwrap();
        assert_eq!(cfg.app_name, "base");
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn circular_base_detected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.toml"), "[meta]\nbase = \"b.toml\"\n").unwrap();
        std::fs::write(dir.path().join("b.toml"), "[meta]\nbase = \"a.toml\"\n").unwrap();
        let err = load_from(&dir.path().join("a.toml"), &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    #[test]
    fn shipped_default_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let cfg = load_from(&path, &Overrides::default()).unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.search.provider, "tavily");
    }

    #[test]
    fn shipped_dev_config_inherits_default() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/dev.toml");
        let cfg = load_from(&path, &Overrides::default()).unwrap();
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.search.provider, "dummy");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.llm.openai.model, "gpt-4o");
        assert_eq!(cfg.comms.axum_channel.bind, "127.0.0.1:8501");
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.ask-yonsei");
        assert!(expanded.starts_with(&home));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("relative/path"), PathBuf::from("relative/path"));
    }
}
