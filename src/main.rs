//! 물어보연세: server entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Build LLM and search providers
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run the axum channel until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use ask_yonsei::subsystems::agents::Assistant;
use ask_yonsei::subsystems::memory::SessionStore;
use ask_yonsei::subsystems::{comms, tools};
use ask_yonsei::{config, error, llm, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present: ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level)?;

    info!(
        app_name = %config.app_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let llm = llm::providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| error::AppError::Llm(e.to_string()))?;
    let search = tools::build(&config.search, config.search_api_key.clone())
        .map_err(|e| error::AppError::Search(e.to_string()))?;

    info!(
        llm_provider = llm.name(),
        model = %config.llm.openai.model,
        search_provider = search.name(),
        max_results = config.search.max_results,
        max_iterations = config.agent.max_iterations,
        "providers ready"
    );

    let sessions = SessionStore::new(config.memory.transcript_cap).with_max_sessions(config.memory.max_sessions);
    let assistant = Arc::new(Assistant::new(llm, search, sessions, &config.agent));

    // Shared shutdown token: Ctrl-C cancels it, the channel watches it.
    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    println!("🦅 {} listening on http://{}", config.app_name, config.comms.axum_channel.bind);

    let channel = comms::start(&config, assistant, shutdown.clone());
    let result = channel
        .await
        .map_err(|e| error::AppError::Comms(format!("channel task panicked: {e}")))?;

    shutdown.cancel();
    result
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: ask-yonsei [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs { log_level: logger::verbosity_level(verbosity), config_path }
}
