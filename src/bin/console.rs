//! Interactive console for the command pipeline
//!
//! Runs the same pipeline as the HTTP API against a local in-memory
//! store, so commands can be tried without starting the server.

use std::io::{self, Write};
use std::sync::Arc;

use rolegate::command::{CommandOutcome, CommandProcessor, CommandResponse};
use rolegate::core::error::Result;
use rolegate::llm::{Completion, IntentClassifier, LlmClient};
use rolegate::store::{seed_demo_data, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "rolegate=warn".to_string()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    seed_demo_data(store.as_ref()).await?;

    let completion: Option<Arc<dyn Completion>> = LlmClient::from_env()
        .ok()
        .map(|client| Arc::new(client) as Arc<dyn Completion>);
    if completion.is_none() {
        println!("LLM_API_KEY not set - running with the pattern fallback only");
    }
    let processor = CommandProcessor::new(store, IntentClassifier::new(completion));

    println!("\n=== ROLEGATE CONSOLE ===");
    println!("Manage roles and permissions in plain language");
    println!();
    println!("Try:");
    println!("  create permission edit_posts");
    println!("  create role editor");
    println!("  give editor the permission edit_posts");
    println!("  describe role editor");
    println!("  list roles");
    println!("  quit / q");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        match processor.handle(input).await {
            CommandResponse::Single(outcome) => print_outcome(&outcome),
            CommandResponse::Batch(batch) => {
                println!("{} command(s):", batch.results.len());
                for outcome in &batch.results {
                    print_outcome(outcome);
                }
            }
        }
        println!();
    }

    println!("\nGoodbye!");
    Ok(())
}

fn print_outcome(outcome: &CommandOutcome) {
    if outcome.success {
        if let Some(message) = &outcome.message {
            println!("  {}", message);
        }
    } else if let Some(error) = &outcome.error {
        println!("  Failed: {}", error);
        if let Some(confidence) = outcome.confidence {
            println!("    confidence: {:.0}%", confidence * 100.0);
        }
    }
    for suggestion in &outcome.suggestions {
        println!("    hint: {}", suggestion);
    }
    if let Some(items) = outcome.data.as_ref().and_then(|data| data.as_array()) {
        for item in items {
            if let Some(name) = item.get("name").and_then(|name| name.as_str()) {
                println!("    - {}", name);
            }
        }
    }
}
