//! Pipeline front door - one raw input line in, one response out
//!
//! The processor owns sequencing: it splits compound input, classifies
//! each piece against a fresh store snapshot, executes, and wraps
//! multi-command runs in a batch envelope. Sub-commands see the writes
//! of the ones before them.

use std::sync::Arc;

use tracing::{info, warn};

use crate::command::executor::CommandExecutor;
use crate::command::outcome::{BatchOutcome, CommandOutcome, CommandResponse, OutcomeKind};
use crate::llm::classifier::IntentClassifier;
use crate::llm::context::EntityContext;
use crate::store::EntityStore;

pub struct CommandProcessor {
    store: Arc<dyn EntityStore>,
    classifier: IntentClassifier,
    executor: CommandExecutor,
}

impl CommandProcessor {
    pub fn new(store: Arc<dyn EntityStore>, classifier: IntentClassifier) -> Self {
        let executor = CommandExecutor::new(store.clone());
        Self {
            store,
            classifier,
            executor,
        }
    }

    /// Handle one raw input line end to end
    ///
    /// A split that yields a single command answers in the single
    /// shape, even when the input contained separators.
    pub async fn handle(&self, command: &str) -> CommandResponse {
        let command = command.trim();
        let commands = self.classifier.split(command).await;

        if commands.len() == 1 {
            return CommandResponse::Single(self.run_one(&commands[0]).await);
        }

        let mut results = Vec::with_capacity(commands.len());
        for (index, sub) in commands.iter().enumerate() {
            let outcome = self.run_one(sub).await.with_index(index);
            results.push(outcome);
        }
        CommandResponse::Batch(BatchOutcome::new(results))
    }

    async fn run_one(&self, command: &str) -> CommandOutcome {
        let context = self.snapshot().await;
        let intent = self.classifier.classify(command, &context).await;
        info!(
            action = %intent.action,
            confidence = intent.confidence,
            "executing command"
        );
        let outcome = self.executor.execute(&intent, command).await;
        self.enrich(outcome, command).await
    }

    /// Snapshot the store for classification, degrading to an empty
    /// context when the read fails
    async fn snapshot(&self) -> EntityContext {
        match EntityContext::from_store(self.store.as_ref()).await {
            Ok(context) => context,
            Err(err) => {
                warn!(error = %err, "context snapshot failed, classifying without it");
                EntityContext::empty()
            }
        }
    }

    /// Swap in model-generated corrections on not-found failures
    async fn enrich(&self, outcome: CommandOutcome, command: &str) -> CommandOutcome {
        if outcome.success
            || outcome.kind != Some(OutcomeKind::NotFound)
            || !self.classifier.has_model()
        {
            return outcome;
        }
        let error = outcome.error.clone().unwrap_or_default();
        let suggestions = self.classifier.suggest_corrections(command, &error).await;
        outcome.with_suggestions(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{RbacError, Result};
    use crate::llm::client::Completion;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedCompletion {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedCompletion {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl Completion for ScriptedCompletion {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| RbacError::LlmError("script exhausted".to_string()))
        }
    }

    fn offline() -> (Arc<MemoryStore>, CommandProcessor) {
        let store = Arc::new(MemoryStore::new());
        let processor = CommandProcessor::new(store.clone(), IntentClassifier::without_model());
        (store, processor)
    }

    #[tokio::test]
    async fn test_single_command_without_model() {
        let (store, processor) = offline();

        let response = processor.handle("create permission edit_posts").await;

        let CommandResponse::Single(outcome) = response else {
            panic!("expected single response");
        };
        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Permission \"edit_posts\" created successfully")
        );
        assert!(store.find_permission("edit_posts").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let (_, processor) = offline();

        let response = processor.handle("  list roles  ").await;

        let CommandResponse::Single(outcome) = response else {
            panic!("expected single response");
        };
        assert_eq!(outcome.message.as_deref(), Some("Found 0 roles"));
    }

    #[tokio::test]
    async fn test_batch_sees_earlier_writes() {
        let (store, processor) = offline();
        store.create_permission("edit_posts", None).await.unwrap();

        let response = processor
            .handle("create role editor and give editor the permission edit_posts")
            .await;

        let CommandResponse::Batch(batch) = response else {
            panic!("expected batch response");
        };
        assert!(batch.success);
        assert!(batch.is_multi_command);
        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.results[0].index, Some(0));
        assert_eq!(batch.results[1].index, Some(1));
        assert!(batch.results[1].success, "{:?}", batch.results[1].error);

        let detail = store.role_detail("editor").await.unwrap().unwrap();
        assert_eq!(detail.permissions.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_keeps_going_after_failure() {
        let (_, processor) = offline();

        let response = processor
            .handle("give ghost the permission edit_posts and create role editor")
            .await;

        let CommandResponse::Batch(batch) = response else {
            panic!("expected batch response");
        };
        assert!(!batch.success);
        assert_eq!(batch.status(), 207);
        assert!(!batch.results[0].success);
        assert_eq!(batch.results[0].kind, Some(OutcomeKind::NotFound));
        assert!(batch.results[1].success);
    }

    #[tokio::test]
    async fn test_not_found_gets_model_corrections() {
        let store = Arc::new(MemoryStore::new());
        store.create_permission("edit_posts", None).await.unwrap();
        let script = ScriptedCompletion::new(&[
            r#"{"action": "assign_permission", "entities": {"roleName": "editor", "permissionName": "edit_posts"}, "confidence": 0.9}"#,
            r#"["Create the role first using: create role editor", "Check if the permission name is spelled correctly", "Use quotes around names with spaces"]"#,
        ]);
        let processor =
            CommandProcessor::new(store, IntentClassifier::new(Some(script)));

        let response = processor.handle("assign editor edit_posts").await;

        let CommandResponse::Single(outcome) = response else {
            panic!("expected single response");
        };
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Role \"editor\" not found"));
        assert_eq!(outcome.suggestions.len(), 3);
        assert!(outcome.suggestions[0].contains("create role editor"));
    }

    #[tokio::test]
    async fn test_split_verdict_of_one_skips_envelope() {
        let store = Arc::new(MemoryStore::new());
        let script = ScriptedCompletion::new(&[
            r#"{"isMultiCommand": false, "commands": []}"#,
            r#"{"action": "create_role", "entities": {"roleName": "reporting and analytics lead"}, "confidence": 0.9}"#,
        ]);
        let processor =
            CommandProcessor::new(store, IntentClassifier::new(Some(script)));

        let response = processor
            .handle("create role reporting and analytics lead")
            .await;

        let CommandResponse::Single(outcome) = response else {
            panic!("expected single response");
        };
        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Role \"reporting and analytics lead\" created successfully")
        );
    }
}
