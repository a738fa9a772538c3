//! Structured command outcomes
//!
//! Everything the pipeline reports flows through these types: one
//! [`CommandOutcome`] per executed command, wrapped in a
//! [`BatchOutcome`] envelope when an input split into several.

use serde::Serialize;
use serde_json::Value;

/// Failure categories, used for status mapping and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// A well-formed intent was missing a required entity name
    Validation,
    /// A referenced role or permission does not exist
    NotFound,
    /// Unique-name or unique-assignment violation
    Conflict,
    /// Assign-when-assigned or remove-when-unassigned no-op
    AlreadyInDesiredState,
    /// Intent confidence fell below the acceptance threshold
    LowConfidence,
    /// Unexpected store failure
    Internal,
}

/// Result of executing one command
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub success: bool,
    /// The command text this outcome answers
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The created or found record, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Position within a batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip)]
    pub kind: Option<OutcomeKind>,
}

impl CommandOutcome {
    pub fn success(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            command: command.into(),
            message: Some(message.into()),
            error: None,
            data: None,
            suggestions: Vec::new(),
            confidence: None,
            index: None,
            kind: None,
        }
    }

    pub fn failure(command: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            command: command.into(),
            message: None,
            error: Some(error.into()),
            data: None,
            suggestions: Vec::new(),
            confidence: None,
            index: None,
            kind: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_kind(mut self, kind: OutcomeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// HTTP status this outcome maps to
    pub fn status(&self) -> u16 {
        if self.success {
            return 200;
        }
        match self.kind {
            Some(OutcomeKind::NotFound) => 404,
            Some(OutcomeKind::Internal) => 500,
            _ => 400,
        }
    }
}

/// Aggregated outcomes for a multi-command input
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub success: bool,
    pub is_multi_command: bool,
    pub results: Vec<CommandOutcome>,
}

impl BatchOutcome {
    pub fn new(results: Vec<CommandOutcome>) -> Self {
        let success = results.iter().all(|r| r.success);
        Self {
            success,
            is_multi_command: true,
            results,
        }
    }

    /// 200 when everything succeeded, 207 for a partial batch, 400 when
    /// nothing did
    pub fn status(&self) -> u16 {
        if self.success {
            200
        } else if self.results.iter().any(|r| r.success) {
            207
        } else {
            400
        }
    }
}

/// What a processed command returns: one outcome, or a batch envelope
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Single(CommandOutcome),
    Batch(BatchOutcome),
}

impl CommandResponse {
    pub fn status(&self) -> u16 {
        match self {
            Self::Single(outcome) => outcome.status(),
            Self::Batch(batch) => batch.status(),
        }
    }

    pub fn succeeded(&self) -> bool {
        match self {
            Self::Single(outcome) => outcome.success,
            Self::Batch(batch) => batch.success,
        }
    }
}

/// Static guidance used when no model-generated corrections exist
pub fn generic_suggestions() -> Vec<String> {
    vec![
        "Please check if the role or permission exists".to_string(),
        "Try using simpler command structure".to_string(),
        "Make sure names are spelled correctly".to_string(),
    ]
}
