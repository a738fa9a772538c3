//! Intent classification - turns raw text into a `CommandIntent`
//!
//! The classifier prefers the language model and degrades to the
//! pattern fallback whenever the model is absent, unreachable, or
//! returns something unparseable. Callers always get an intent back.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::command::fallback;
use crate::command::intent::CommandIntent;
use crate::command::outcome::generic_suggestions;
use crate::command::resolver::EntityResolver;
use crate::command::splitter;
use crate::core::error::Result;
use crate::llm::client::Completion;
use crate::llm::context::EntityContext;
use crate::llm::reply::parse_structured_reply;

const PARSE_SYSTEM_PROMPT: &str = r#"You are a command parser for an RBAC (role-based access control) admin tool. Turn the user's natural language command into a structured action.

Respond ONLY with valid JSON in this exact format:
{
  "action": "create_permission" | "create_role" | "assign_permission" | "remove_permission" | "list_roles" | "list_permissions" | "describe_role" | "unknown",
  "entities": {
    "roleName": "role name, if one is mentioned",
    "permissionName": "permission name, if one is mentioned",
    "description": "description text, if any is given"
  },
  "confidence": 0.0 to 1.0,
  "suggestions": ["up to 3 rephrasing hints, only when confidence is below 0.7"]
}

Rules:
- BE GENEROUS with confidence: if the action is clear, use 0.8 or higher.
- "assign", "give", "grant" or "add" together with a permission means assign_permission.
- "remove", "revoke" or "take" together with a permission means remove_permission.
- If both a role name and a permission name are present, use 0.9 or higher.
- Copy names exactly as the user wrote them. Do not invent entities.
- Prefer names from the known entities list when the user clearly means one of them.

Examples:
"create permission edit_posts" -> {"action": "create_permission", "entities": {"permissionName": "edit_posts"}, "confidence": 0.95}
"make a new role called editor" -> {"action": "create_role", "entities": {"roleName": "editor"}, "confidence": 0.9}
"assign editor edit_posts" -> {"action": "assign_permission", "entities": {"roleName": "editor", "permissionName": "edit_posts"}, "confidence": 0.85}
"give the role Content Editor the permission to edit posts" -> {"action": "assign_permission", "entities": {"roleName": "Content Editor", "permissionName": "edit posts"}, "confidence": 0.9}
"what can admin do" -> {"action": "describe_role", "entities": {"roleName": "admin"}, "confidence": 0.9}
"show me all the roles" -> {"action": "list_roles", "entities": {}, "confidence": 0.95}"#;

const SPLIT_SYSTEM_PROMPT: &str = r#"You are a command splitter for an RBAC admin tool. Decide whether the input contains several commands and split it into standalone commands when it does.

Respond ONLY with valid JSON in this exact format:
{
  "isMultiCommand": true or false,
  "commands": ["each standalone command, in order"]
}

Rules:
- Split on connectors like "and", "then", "also" and commas that join separate commands.
- Do NOT split a single command that merely mentions several names.
- Rewrite pronouns like "it" so every command stands alone.

Examples:
"create permission view_dashboard" -> {"isMultiCommand": false, "commands": []}
"first create permission view_dashboard then assign it to admin" -> {"isMultiCommand": true, "commands": ["create permission view_dashboard", "assign admin the permission view_dashboard"]}"#;

const SUGGEST_SYSTEM_PROMPT: &str = r#"You are a helpful RBAC assistant. A command failed and the user needs practical next steps.

Respond ONLY with a JSON array of exactly 3 short suggestion strings.

Example:
["Create the role first using: create role editor", "Check if the permission name is spelled correctly", "Use quotes around names with spaces"]"#;

/// Shape of the model's multi-command verdict
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultiCommandReply {
    is_multi_command: bool,
    #[serde(default)]
    commands: Vec<String>,
}

/// Classifies commands, with or without a language model behind it
#[derive(Clone)]
pub struct IntentClassifier {
    completion: Option<Arc<dyn Completion>>,
}

impl IntentClassifier {
    pub fn new(completion: Option<Arc<dyn Completion>>) -> Self {
        Self { completion }
    }

    /// Classifier that only uses the pattern fallback
    pub fn without_model() -> Self {
        Self { completion: None }
    }

    pub fn has_model(&self) -> bool {
        self.completion.is_some()
    }

    /// Classify one command into an intent
    ///
    /// Model failures are absorbed here: the caller cannot tell a model
    /// parse from a pattern parse except through the confidence score.
    pub async fn classify(&self, command: &str, context: &EntityContext) -> CommandIntent {
        if let Some(model) = &self.completion {
            match Self::model_classify(model.as_ref(), command, context).await {
                Ok(intent) => return EntityResolver::new(context).resolve_intent(intent),
                Err(err) => {
                    warn!(error = %err, "intent model unavailable, using pattern fallback");
                }
            }
        }
        fallback::parse(command, context)
    }

    /// Split possibly-compound input into standalone commands
    ///
    /// Never returns an empty list.
    pub async fn split(&self, command: &str) -> Vec<String> {
        if !splitter::has_separators(command) {
            return vec![command.to_string()];
        }
        let Some(model) = &self.completion else {
            return splitter::split(command);
        };
        match Self::model_split(model.as_ref(), command).await {
            Ok(reply) => {
                let commands: Vec<String> = reply
                    .commands
                    .into_iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
                if reply.is_multi_command && !commands.is_empty() {
                    commands
                } else {
                    vec![command.to_string()]
                }
            }
            Err(err) => {
                warn!(error = %err, "split model unavailable, using separator heuristic");
                splitter::split(command)
            }
        }
    }

    /// Ask the model for recovery hints after a failed command
    pub async fn suggest_corrections(&self, command: &str, error: &str) -> Vec<String> {
        let Some(model) = &self.completion else {
            return generic_suggestions();
        };
        match Self::model_suggest(model.as_ref(), command, error).await {
            Ok(suggestions) if !suggestions.is_empty() => suggestions,
            Ok(_) => generic_suggestions(),
            Err(err) => {
                warn!(error = %err, "suggestion model unavailable");
                generic_suggestions()
            }
        }
    }

    async fn model_classify(
        model: &dyn Completion,
        command: &str,
        context: &EntityContext,
    ) -> Result<CommandIntent> {
        let user = format!(
            "Known entities:\n{}\n\nUser command: \"{}\"",
            context.summary(),
            command
        );
        let reply = model.complete(PARSE_SYSTEM_PROMPT, &user).await?;
        let mut intent: CommandIntent = parse_structured_reply(&reply)?;
        intent.entities = intent.entities.clean();
        Ok(intent.clamped())
    }

    async fn model_split(model: &dyn Completion, command: &str) -> Result<MultiCommandReply> {
        let user = format!("Input: \"{}\"", command);
        let reply = model.complete(SPLIT_SYSTEM_PROMPT, &user).await?;
        parse_structured_reply(&reply)
    }

    async fn model_suggest(
        model: &dyn Completion,
        command: &str,
        error: &str,
    ) -> Result<Vec<String>> {
        let user = format!("Command: \"{}\"\nError: {}", command, error);
        let reply = model.complete(SUGGEST_SYSTEM_PROMPT, &user).await?;
        let suggestions: Vec<String> = parse_structured_reply(&reply)?;
        Ok(suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(3)
            .collect())
    }
}
