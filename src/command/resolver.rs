//! Entity resolution - maps loose mentions onto stored names
//!
//! Operators rarely type names verbatim ("view dashboard" for
//! `can_view_dashboard`), so lookups go through tiered matching against
//! the current vocabulary before the executor sees them.

use crate::command::intent::{CommandAction, CommandIntent};
use crate::core::config::ENTITY_CONFIDENCE_FLOOR;
use crate::llm::context::EntityContext;

/// Substring tiers only fire for mentions at least this long, so a stray
/// two-letter extraction cannot swallow half the vocabulary
const SUBSTRING_MIN_LEN: usize = 3;

/// Filler words dropped when a mention fails to match as written
const STOPWORDS: &[&str] = &["the", "a", "an", "to", "of", "for"];

/// How a mention matched a canonical name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    ExactName,
    Substring,
    Convention,
}

/// A matched canonical name
#[derive(Debug, Clone)]
pub struct NameMatch {
    pub name: String,
    pub reason: MatchReason,
}

/// Lowercase a mention and fold spaces/hyphens to underscores
pub fn normalize(mention: &str) -> String {
    mention.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Resolve a mention against canonical names, best match or none
pub fn resolve<S: AsRef<str>>(mention: &str, candidates: &[S]) -> Option<String> {
    resolve_match(mention, candidates).map(|m| m.name)
}

/// Resolve a mention, reporting which tier matched
///
/// Tiers, first hit wins: exact, substring in either direction,
/// `can_<name>`/`<name>_permission` convention forms. A second pass with
/// filler words stripped catches phrasings like "view the dashboard".
pub fn resolve_match<S: AsRef<str>>(mention: &str, candidates: &[S]) -> Option<NameMatch> {
    let normalized = normalize(mention);
    if normalized.is_empty() {
        return None;
    }
    if let Some(hit) = match_normalized(&normalized, candidates) {
        return Some(hit);
    }

    let stripped = strip_stopwords(&normalized);
    if !stripped.is_empty() && stripped != normalized {
        return match_normalized(&stripped, candidates);
    }
    None
}

fn match_normalized<S: AsRef<str>>(mention: &str, candidates: &[S]) -> Option<NameMatch> {
    if let Some(candidate) = candidates
        .iter()
        .find(|c| normalize(c.as_ref()) == mention)
    {
        return Some(NameMatch {
            name: candidate.as_ref().to_string(),
            reason: MatchReason::ExactName,
        });
    }

    if mention.len() >= SUBSTRING_MIN_LEN {
        // Canonical name contains the mention: prefer the tightest fit
        let containing = candidates
            .iter()
            .filter(|c| {
                c.as_ref().len() >= SUBSTRING_MIN_LEN && normalize(c.as_ref()).contains(mention)
            })
            .min_by_key(|c| c.as_ref().len());
        if let Some(candidate) = containing {
            return Some(NameMatch {
                name: candidate.as_ref().to_string(),
                reason: MatchReason::Substring,
            });
        }

        // Mention contains a canonical name: prefer the longest one
        let contained = candidates
            .iter()
            .filter(|c| {
                let normalized = normalize(c.as_ref());
                normalized.len() >= SUBSTRING_MIN_LEN && mention.contains(&normalized)
            })
            .max_by_key(|c| c.as_ref().len());
        if let Some(candidate) = contained {
            return Some(NameMatch {
                name: candidate.as_ref().to_string(),
                reason: MatchReason::Substring,
            });
        }
    }

    let convention = candidates.iter().find(|c| {
        let normalized = normalize(c.as_ref());
        normalized == format!("can_{}", mention)
            || normalized == format!("{}_permission", mention)
            || mention == format!("can_{}", normalized)
            || mention == format!("{}_permission", normalized)
    });
    convention.map(|candidate| NameMatch {
        name: candidate.as_ref().to_string(),
        reason: MatchReason::Convention,
    })
}

fn strip_stopwords(normalized: &str) -> String {
    normalized
        .split('_')
        .filter(|token| !token.is_empty() && !STOPWORDS.contains(token))
        .collect::<Vec<_>>()
        .join("_")
}

/// Resolves intent entity mentions against the current vocabulary
pub struct EntityResolver<'a> {
    context: &'a EntityContext,
}

impl<'a> EntityResolver<'a> {
    pub fn new(context: &'a EntityContext) -> Self {
        Self { context }
    }

    /// Best canonical role name for a mention
    pub fn resolve_role(&self, mention: &str) -> Option<String> {
        resolve(mention, &self.context.role_names)
    }

    /// Best canonical permission name for a mention
    pub fn resolve_permission(&self, mention: &str) -> Option<String> {
        resolve(mention, &self.context.permission_names())
    }

    /// Rewrite an intent's lookup mentions to canonical names
    ///
    /// Only lookup actions are rewritten; create commands keep the name
    /// exactly as typed, since creation is what defines the canonical
    /// spelling. Unresolved mentions pass through in normalized form for
    /// the executor to report as not found.
    ///
    /// Assign/remove intents whose role and permission BOTH resolve get
    /// their confidence raised to the entity floor. Resolution success is
    /// the gate here, not mere presence of two names: two tokens that
    /// match nothing are no evidence the interpretation is right.
    pub fn resolve_intent(&self, mut intent: CommandIntent) -> CommandIntent {
        let wants_role = matches!(
            intent.action,
            CommandAction::AssignPermission
                | CommandAction::RemovePermission
                | CommandAction::DescribeRole
        );
        let wants_permission = matches!(
            intent.action,
            CommandAction::AssignPermission | CommandAction::RemovePermission
        );

        let mut role_resolved = false;
        if wants_role {
            if let Some(mention) = intent.entities.role_name.take() {
                match self.resolve_role(&mention) {
                    Some(hit) => {
                        intent.entities.role_name = Some(hit);
                        role_resolved = true;
                    }
                    None => intent.entities.role_name = Some(normalize(&mention)),
                }
            }
        }

        let mut permission_resolved = false;
        if wants_permission {
            if let Some(mention) = intent.entities.permission_name.take() {
                match self.resolve_permission(&mention) {
                    Some(hit) => {
                        intent.entities.permission_name = Some(hit);
                        permission_resolved = true;
                    }
                    None => intent.entities.permission_name = Some(normalize(&mention)),
                }
            }
        }

        if wants_permission
            && role_resolved
            && permission_resolved
            && intent.confidence < ENTITY_CONFIDENCE_FLOOR
        {
            intent.confidence = ENTITY_CONFIDENCE_FLOOR;
        }

        intent
    }
}
