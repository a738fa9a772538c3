//! Runtime configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose
//! and how they interact with each other.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::{RbacError, Result};

/// Minimum classification confidence for a command to be executed
///
/// Intents scoring below this are rejected before any store mutation
/// happens, and the caller gets correction suggestions instead. Raising
/// it makes the assistant more cautious; lowering it lets vaguer
/// phrasings through at the cost of more misfires.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Confidence floor applied once both entities of an assignment resolve
///
/// When an assign-permission intent names a role and a permission that
/// both match stored records, the command is unambiguous regardless of
/// how hesitant the model was, so confidence is raised to at least this
/// value. Only resolution justifies the boost; unresolved mentions keep
/// the model's original score.
pub const ENTITY_CONFIDENCE_FLOOR: f32 = 0.85;

/// Confidence reported by the deterministic fallback parser
///
/// Pattern matches are precise but cannot see context, so they score
/// high yet stay below a fully confident 1.0.
pub const FALLBACK_CONFIDENCE: f32 = 0.85;

/// Confidence for fallback-parsed list commands, which take no entities
pub const LIST_FALLBACK_CONFIDENCE: f32 = 0.9;

/// Seconds to wait for a model completion before giving up
///
/// Interactive commands should fail over to the deterministic parser
/// quickly rather than leave the caller hanging.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 5;

/// Address the HTTP server binds when none is configured
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Top-level application configuration
///
/// Loaded from a TOML file when one is given, then overridden by
/// environment variables. Every field has a default so an empty file
/// (or no file at all) yields a working configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Socket address the HTTP server listens on
    pub listen_addr: String,

    /// Session token required in the `token` cookie
    ///
    /// When unset, the auth check is skipped entirely and every request
    /// is accepted. Set it in any deployment that faces other people.
    pub session_token: Option<String>,

    /// Whether to load the demo roles and permissions into an empty store
    pub seed: bool,

    /// Model connection settings, all optional
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            session_token: None,
            seed: true,
            llm: LlmConfig::default(),
        }
    }
}

/// Model connection settings
///
/// Any field left unset falls back to the matching `LLM_*` environment
/// variable, so a config file is never required to reach a model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply env overrides
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: AppConfig =
            toml::from_str(&text).map_err(|e| RbacError::ConfigError(e.to_string()))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Build configuration from defaults and environment variables only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = get("ROLEGATE_LISTEN") {
            self.listen_addr = addr;
        }
        if let Some(token) = get("ROLEGATE_SESSION_TOKEN") {
            self.session_token = Some(token);
        }
        if let Some(key) = get("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("LLM_API_URL") {
            self.llm.api_url = Some(url);
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = Some(model);
        }
    }

    /// Validate configuration consistency
    ///
    /// Returns an error message describing the first problem found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }
        if let Some(token) = &self.session_token {
            if token.is_empty() {
                return Err("session_token must not be empty when set".to_string());
            }
        }
        if self.llm.timeout_secs == Some(0) {
            return Err("llm.timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_listen_addr() {
        let config = AppConfig {
            listen_addr: "not-an-address".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_session_token() {
        let config = AppConfig {
            session_token: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = AppConfig {
            llm: LlmConfig {
                timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_win() {
        let mut env = HashMap::new();
        env.insert("ROLEGATE_LISTEN", "0.0.0.0:8080");
        env.insert("LLM_MODEL", "test-model");
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.llm.model.as_deref(), Some("test-model"));
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str("listen_addr = \"127.0.0.1:9000\"").unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert!(config.seed);
        assert!(config.llm.model.is_none());
    }
}
