//! Natural language command pipeline
//!
//! Raw text flows through here in stages: split compound input into
//! standalone commands, classify each into an intent, resolve entity
//! mentions against what the store knows, then execute. Every stage
//! degrades on its own, so the pipeline always produces an answer.

pub mod executor;
pub mod fallback;
pub mod intent;
pub mod outcome;
pub mod processor;
pub mod resolver;
pub mod splitter;

pub use executor::CommandExecutor;
pub use intent::{CommandAction, CommandIntent, IntentEntities};
pub use outcome::{BatchOutcome, CommandOutcome, CommandResponse, OutcomeKind};
pub use processor::CommandProcessor;
pub use resolver::EntityResolver;
