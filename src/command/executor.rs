//! Command execution - applies validated intents to the store
//!
//! The executor is the only component that mutates anything, and it is
//! total: store failures, conflicts, and bad intents all come back as
//! structured outcomes so batches aggregate uniformly instead of
//! aborting halfway.

use std::sync::Arc;

use tracing::warn;

use crate::command::intent::{CommandAction, CommandIntent};
use crate::command::outcome::{generic_suggestions, CommandOutcome, OutcomeKind};
use crate::core::config::CONFIDENCE_THRESHOLD;
use crate::core::error::{RbacError, Result};
use crate::store::EntityStore;

/// Description recorded when a create command does not give one
const DEFAULT_PERMISSION_NOTE: &str = "Created via assistant command";

const UNKNOWN_COMMAND_HELP: &str = "Could not understand the command. Try commands like: \
\"Create a permission called edit_posts\" or \
\"Give the role Content Editor the permission to edit_posts\"";

/// Executes intents against the entity store
pub struct CommandExecutor {
    store: Arc<dyn EntityStore>,
}

impl CommandExecutor {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Execute one intent, returning a structured outcome
    ///
    /// Never touches the store for unknown or below-threshold intents.
    pub async fn execute(&self, intent: &CommandIntent, command: &str) -> CommandOutcome {
        let outcome = match self.run(intent, command).await {
            Ok(outcome) => outcome,
            Err(err) => Self::absorb(err, command),
        };
        outcome.with_confidence(intent.confidence)
    }

    async fn run(&self, intent: &CommandIntent, command: &str) -> Result<CommandOutcome> {
        if intent.action == CommandAction::Unknown {
            return Ok(CommandOutcome::failure(command, UNKNOWN_COMMAND_HELP)
                .with_suggestions(Self::intent_suggestions(intent)));
        }
        if intent.confidence < CONFIDENCE_THRESHOLD {
            return Ok(
                CommandOutcome::failure(command, "Not confident enough to act on this command")
                    .with_kind(OutcomeKind::LowConfidence)
                    .with_suggestions(Self::intent_suggestions(intent)),
            );
        }

        match intent.action {
            CommandAction::CreatePermission => self.create_permission(intent, command).await,
            CommandAction::CreateRole => self.create_role(intent, command).await,
            CommandAction::AssignPermission => self.assign_permission(intent, command).await,
            CommandAction::RemovePermission => self.remove_permission(intent, command).await,
            CommandAction::ListRoles => self.list_roles(command).await,
            CommandAction::ListPermissions => self.list_permissions(command).await,
            CommandAction::DescribeRole => self.describe_role(intent, command).await,
            CommandAction::Unknown => unreachable!("handled above"),
        }
    }

    async fn create_permission(
        &self,
        intent: &CommandIntent,
        command: &str,
    ) -> Result<CommandOutcome> {
        let Some(name) = &intent.entities.permission_name else {
            return Ok(Self::validation(command, "Permission name is required"));
        };
        let description = intent
            .entities
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_PERMISSION_NOTE.to_string());

        let permission = self
            .store
            .create_permission(name, Some(&description))
            .await?;
        Ok(
            CommandOutcome::success(command, format!("Permission {:?} created successfully", name))
                .with_data(serde_json::to_value(&permission)?),
        )
    }

    async fn create_role(&self, intent: &CommandIntent, command: &str) -> Result<CommandOutcome> {
        let Some(name) = &intent.entities.role_name else {
            return Ok(Self::validation(command, "Role name is required"));
        };
        let role = self.store.create_role(name).await?;
        Ok(
            CommandOutcome::success(command, format!("Role {:?} created successfully", name))
                .with_data(serde_json::to_value(&role)?),
        )
    }

    async fn assign_permission(
        &self,
        intent: &CommandIntent,
        command: &str,
    ) -> Result<CommandOutcome> {
        let (Some(role_name), Some(permission_name)) = (
            &intent.entities.role_name,
            &intent.entities.permission_name,
        ) else {
            return Ok(Self::validation(
                command,
                "Role and permission names are required",
            ));
        };

        let Some(role) = self.store.find_role(role_name).await? else {
            return Ok(Self::not_found(
                command,
                format!("Role {:?} not found", role_name),
                vec!["Check role names with: list roles".to_string()],
            ));
        };
        let Some(permission) = self.store.find_permission(permission_name).await? else {
            return Ok(Self::not_found(
                command,
                format!("Permission {:?} not found", permission_name),
                vec!["Check permission names with: list permissions".to_string()],
            ));
        };

        if self.store.assignment_exists(role.id, permission.id).await? {
            return Ok(CommandOutcome::success(
                command,
                format!(
                    "Permission {:?} is already assigned to role {:?}",
                    permission.name, role.name
                ),
            )
            .with_kind(OutcomeKind::AlreadyInDesiredState)
            .with_suggestions(vec![
                format!("Remove it with: remove {} from {}", permission.name, role.name),
                format!("See the role with: describe role {}", role.name),
            ]));
        }

        let assignment = self.store.create_assignment(role.id, permission.id).await?;
        Ok(CommandOutcome::success(
            command,
            format!(
                "Permission {:?} assigned to role {:?}",
                permission.name, role.name
            ),
        )
        .with_data(serde_json::to_value(&assignment)?))
    }

    async fn remove_permission(
        &self,
        intent: &CommandIntent,
        command: &str,
    ) -> Result<CommandOutcome> {
        let (Some(role_name), Some(permission_name)) = (
            &intent.entities.role_name,
            &intent.entities.permission_name,
        ) else {
            return Ok(Self::validation(
                command,
                "Role and permission names are required",
            ));
        };

        let Some(role) = self.store.find_role(role_name).await? else {
            return Ok(Self::not_found(
                command,
                format!("Role {:?} not found", role_name),
                vec!["Check role names with: list roles".to_string()],
            ));
        };
        let Some(permission) = self.store.find_permission(permission_name).await? else {
            return Ok(Self::not_found(
                command,
                format!("Permission {:?} not found", permission_name),
                vec!["Check permission names with: list permissions".to_string()],
            ));
        };

        let removed = self.store.delete_assignment(role.id, permission.id).await?;
        if removed == 0 {
            return Ok(CommandOutcome::success(
                command,
                format!(
                    "Permission {:?} was not assigned to role {:?}",
                    permission.name, role.name
                ),
            )
            .with_kind(OutcomeKind::AlreadyInDesiredState)
            .with_suggestions(vec![
                format!("Assign it with: give {} the permission {}", role.name, permission.name),
                format!("See the role with: describe role {}", role.name),
            ]));
        }

        Ok(CommandOutcome::success(
            command,
            format!(
                "Permission {:?} removed from role {:?}",
                permission.name, role.name
            ),
        ))
    }

    async fn list_roles(&self, command: &str) -> Result<CommandOutcome> {
        let roles = self.store.list_roles().await?;
        let noun = if roles.len() == 1 { "role" } else { "roles" };
        Ok(
            CommandOutcome::success(command, format!("Found {} {}", roles.len(), noun))
                .with_data(serde_json::to_value(&roles)?),
        )
    }

    async fn list_permissions(&self, command: &str) -> Result<CommandOutcome> {
        let permissions = self.store.list_permissions().await?;
        let noun = if permissions.len() == 1 {
            "permission"
        } else {
            "permissions"
        };
        Ok(
            CommandOutcome::success(command, format!("Found {} {}", permissions.len(), noun))
                .with_data(serde_json::to_value(&permissions)?),
        )
    }

    async fn describe_role(&self, intent: &CommandIntent, command: &str) -> Result<CommandOutcome> {
        let Some(role_name) = &intent.entities.role_name else {
            return Ok(Self::validation(command, "Role name is required"));
        };
        let Some(detail) = self.store.role_detail(role_name).await? else {
            return Ok(Self::not_found(
                command,
                format!("Role {:?} not found", role_name),
                vec!["Check role names with: list roles".to_string()],
            ));
        };

        let noun = if detail.permissions.len() == 1 {
            "permission"
        } else {
            "permissions"
        };
        Ok(CommandOutcome::success(
            command,
            format!(
                "Role {:?} has {} {}",
                detail.role.name,
                detail.permissions.len(),
                noun
            ),
        )
        .with_data(serde_json::to_value(&detail)?))
    }

    /// Convert an escaped store error into a failure outcome
    fn absorb(err: RbacError, command: &str) -> CommandOutcome {
        match err {
            RbacError::Conflict(_) => CommandOutcome::failure(command, "Item already exists")
                .with_kind(OutcomeKind::Conflict),
            other => {
                warn!(error = %other, "command execution failed");
                CommandOutcome::failure(command, "Internal server error")
                    .with_kind(OutcomeKind::Internal)
            }
        }
    }

    fn validation(command: &str, error: &str) -> CommandOutcome {
        CommandOutcome::failure(command, error).with_kind(OutcomeKind::Validation)
    }

    fn not_found(command: &str, error: String, guidance: Vec<String>) -> CommandOutcome {
        CommandOutcome::failure(command, error)
            .with_kind(OutcomeKind::NotFound)
            .with_suggestions(guidance)
    }

    fn intent_suggestions(intent: &CommandIntent) -> Vec<String> {
        if intent.suggestions.is_empty() {
            generic_suggestions()
        } else {
            intent.suggestions.clone()
        }
    }
}
