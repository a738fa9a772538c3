//! Structured command intents
//!
//! Free-form text is classified into a [`CommandIntent`] before anything
//! touches the store. The classifier produces these, the executor
//! consumes them, and nothing in between persists them.

use serde::{Deserialize, Serialize};

/// Operations a command can request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    /// Create a new permission
    CreatePermission,
    /// Create a new role
    CreateRole,
    /// Link an existing permission to an existing role
    AssignPermission,
    /// Unlink a permission from a role
    RemovePermission,
    /// List every role with its permissions
    ListRoles,
    /// List every permission
    ListPermissions,
    /// Show one role and what it can do
    DescribeRole,
    /// Could not determine intent
    Unknown,
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatePermission => "create_permission",
            Self::CreateRole => "create_role",
            Self::AssignPermission => "assign_permission",
            Self::RemovePermission => "remove_permission",
            Self::ListRoles => "list_roles",
            Self::ListPermissions => "list_permissions",
            Self::DescribeRole => "describe_role",
            Self::Unknown => "unknown",
        }
    }

    /// Whether executing this action writes to the store
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreatePermission
                | Self::CreateRole
                | Self::AssignPermission
                | Self::RemovePermission
        )
    }
}

impl std::fmt::Display for CommandAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity names extracted from a command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentEntities {
    /// Role mentioned by the command, if any
    pub role_name: Option<String>,
    /// Permission mentioned by the command, if any
    pub permission_name: Option<String>,
    /// Description text for create commands
    pub description: Option<String>,
}

impl IntentEntities {
    /// Drop blank extractions so "present" always means usable
    pub fn clean(mut self) -> Self {
        let tidy = |field: &mut Option<String>| {
            if let Some(value) = field {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    *field = None;
                } else if trimmed.len() != value.len() {
                    *field = Some(trimmed.to_string());
                }
            }
        };
        tidy(&mut self.role_name);
        tidy(&mut self.permission_name);
        tidy(&mut self.description);
        self
    }
}

/// A classified command with extraction confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandIntent {
    /// The operation requested
    pub action: CommandAction,
    /// Names the command referred to
    #[serde(default)]
    pub entities: IntentEntities,
    /// Classifier's confidence in the interpretation (0.0 - 1.0)
    pub confidence: f32,
    /// Alternative phrasings offered when confidence is low
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Default for CommandIntent {
    fn default() -> Self {
        Self {
            action: CommandAction::Unknown,
            entities: IntentEntities::default(),
            confidence: 0.0,
            suggestions: Vec::new(),
        }
    }
}

impl CommandIntent {
    /// Keep confidence inside [0, 1] no matter what the model said
    pub fn clamped(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&CommandAction::AssignPermission).unwrap();
        assert_eq!(json, "\"assign_permission\"");
    }

    #[test]
    fn test_action_deserialization() {
        let action: CommandAction = serde_json::from_str("\"describe_role\"").unwrap();
        assert_eq!(action, CommandAction::DescribeRole);
    }

    #[test]
    fn test_unlisted_action_is_rejected() {
        let result: Result<CommandAction, _> = serde_json::from_str("\"drop_table\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_intent_default() {
        let intent = CommandIntent::default();
        assert_eq!(intent.action, CommandAction::Unknown);
        assert_eq!(intent.confidence, 0.0);
        assert!(intent.suggestions.is_empty());
    }

    #[test]
    fn test_full_intent_deserialization() {
        let json = r#"{
            "action": "assign_permission",
            "entities": {
                "roleName": "content_editor",
                "permissionName": "can_view_dashboard",
                "description": null
            },
            "confidence": 0.92,
            "suggestions": ["assign content_editor can_view_dashboard"]
        }"#;
        let intent: CommandIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.action, CommandAction::AssignPermission);
        assert_eq!(intent.entities.role_name.as_deref(), Some("content_editor"));
        assert_eq!(
            intent.entities.permission_name.as_deref(),
            Some("can_view_dashboard")
        );
        assert!(intent.entities.description.is_none());
        assert!((intent.confidence - 0.92).abs() < 0.001);
        assert_eq!(intent.suggestions.len(), 1);
    }

    #[test]
    fn test_missing_entities_defaults() {
        let json = r#"{"action": "list_roles", "confidence": 1.0}"#;
        let intent: CommandIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.action, CommandAction::ListRoles);
        assert_eq!(intent.entities, IntentEntities::default());
    }

    #[test]
    fn test_missing_confidence_is_rejected() {
        let json = r#"{"action": "create_role", "entities": {"roleName": "x"}}"#;
        let result: Result<CommandIntent, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_entities_clean_drops_blanks() {
        let entities = IntentEntities {
            role_name: Some("  admin  ".into()),
            permission_name: Some("   ".into()),
            description: None,
        }
        .clean();
        assert_eq!(entities.role_name.as_deref(), Some("admin"));
        assert!(entities.permission_name.is_none());
    }

    #[test]
    fn test_clamped_confidence() {
        let intent = CommandIntent {
            confidence: 3.2,
            ..Default::default()
        }
        .clamped();
        assert_eq!(intent.confidence, 1.0);
    }

    #[test]
    fn test_mutation_actions() {
        assert!(CommandAction::CreateRole.is_mutation());
        assert!(CommandAction::RemovePermission.is_mutation());
        assert!(!CommandAction::ListRoles.is_mutation());
        assert!(!CommandAction::Unknown.is_mutation());
    }
}
