//! Language model integration
//!
//! Everything that talks to (or stands in for) the model lives here:
//! the HTTP client, the store snapshot given to prompts, reply
//! parsing, and the classifier that the command pipeline calls.

pub mod classifier;
pub mod client;
pub mod context;
pub mod reply;

pub use classifier::IntentClassifier;
pub use client::{Completion, LlmClient};
pub use context::EntityContext;
