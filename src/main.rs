//! Rolegate entry point
//!
//! Loads configuration, seeds the in-memory store, wires the command
//! pipeline, and serves the HTTP API until the process is stopped.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use rolegate::command::CommandProcessor;
use rolegate::core::config::AppConfig;
use rolegate::core::error::Result;
use rolegate::llm::{Completion, IntentClassifier, LlmClient};
use rolegate::server::{self, AppState};
use rolegate::store::{seed_demo_data, MemoryStore};

#[derive(Parser, Debug)]
#[command(
    name = "rolegate",
    version,
    about = "RBAC administration through natural language commands"
)]
struct Cli {
    /// TOML config file; environment variables override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "rolegate=info,tower_http=info".to_string()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env(),
    };
    if let Err(problem) = config.validate() {
        tracing::error!(%problem, "invalid configuration");
        std::process::exit(1);
    }

    let store = Arc::new(MemoryStore::new());
    if config.seed {
        seed_demo_data(store.as_ref()).await?;
    }

    let completion: Option<Arc<dyn Completion>> = match LlmClient::from_config(&config.llm) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            tracing::warn!(error = %err, "no language model configured, pattern fallback only");
            None
        }
    };
    let classifier = IntentClassifier::new(completion);

    let processor = Arc::new(CommandProcessor::new(store, classifier));
    let state = AppState::new(processor, config.session_token.clone());

    server::serve(&config.listen_addr, state).await
}
