//! Deterministic fallback intent parser
//!
//! Used whenever the classifier is unreachable or returns something
//! unusable. Pattern matching over word tokens, no model involved, and
//! total: every input comes back as a [`CommandIntent`], worst case
//! `unknown` with a generic suggestion.

use crate::command::intent::{CommandAction, CommandIntent, IntentEntities};
use crate::command::resolver::EntityResolver;
use crate::core::config::{FALLBACK_CONFIDENCE, LIST_FALLBACK_CONFIDENCE};
use crate::llm::context::EntityContext;

const ASSIGN_VERBS: &[&str] = &["assign", "give", "add", "grant"];
const REMOVE_VERBS: &[&str] = &["remove", "revoke", "take"];
const CREATE_VERBS: &[&str] = &["create", "make", "add"];
const QUERY_VERBS: &[&str] = &["list", "show", "display", "what"];

/// Words skipped when collecting an entity mention
const FILLERS: &[&str] = &["the", "a", "an", "new", "role", "permission", "away"];

/// Parse a command with text patterns alone
///
/// Captured mentions go through the entity resolver, so near-miss
/// phrasings land on stored names here just as they do on the model
/// path.
pub fn parse(command: &str, context: &EntityContext) -> CommandIntent {
    let intent = match_patterns(command).unwrap_or_else(|| CommandIntent {
        action: CommandAction::Unknown,
        entities: IntentEntities::default(),
        confidence: 0.0,
        suggestions: vec!["Please rephrase your command more clearly".to_string()],
    });
    EntityResolver::new(context).resolve_intent(intent)
}

fn match_patterns(command: &str) -> Option<CommandIntent> {
    let words = Words::new(command);
    if words.lower.is_empty() {
        return None;
    }
    match_assign(&words)
        .or_else(|| match_remove(&words))
        .or_else(|| match_create(&words))
        .or_else(|| match_list(&words))
        .or_else(|| match_describe(&words))
}

/// `assign/give/add/grant [role] X [the] permission [to] Y`, plus the
/// permission-first form `give permission [to X to] Y`
fn match_assign(words: &Words) -> Option<CommandIntent> {
    let verb = words.position(0, |t| ASSIGN_VERBS.contains(&t))?;
    let keyword = words.position(verb + 1, |t| t == "permission" || t == "permissions")?;

    let role_before = words.phrase_filtered(verb + 1, keyword);
    let after: Vec<usize> = (keyword + 1..words.lower.len()).collect();

    let (role, permission) = if !role_before.is_empty() {
        // role sits between the verb and "permission"
        let start = words.skip_leading(keyword + 1, &["to", "the"]);
        (role_before, words.phrase(start, words.lower.len()))
    } else if words.lower.get(keyword + 1).map(String::as_str) == Some("to") {
        // "give permission to <role> to <permission>"
        let last_to = after
            .iter()
            .rev()
            .find(|&&i| i > keyword + 1 && words.lower[i] == "to")?;
        (
            words.phrase(keyword + 2, *last_to),
            words.phrase(last_to + 1, words.lower.len()),
        )
    } else {
        // "give permission <permission> to <role>"
        let to = words.position(keyword + 1, |t| t == "to")?;
        (
            words.phrase_filtered(to + 1, words.lower.len()),
            words.phrase(keyword + 1, to),
        )
    };

    if role.is_empty() || permission.is_empty() {
        return None;
    }
    Some(intent_with(
        CommandAction::AssignPermission,
        IntentEntities {
            role_name: Some(role),
            permission_name: Some(permission),
            description: None,
        },
        FALLBACK_CONFIDENCE,
    ))
}

/// `remove/revoke/take [the] [permission] X from [the] [role] Y`
fn match_remove(words: &Words) -> Option<CommandIntent> {
    let verb = words.position(0, |t| REMOVE_VERBS.contains(&t))?;
    let from = words.position(verb + 1, |t| t == "from")?;

    let permission = words.phrase_filtered(verb + 1, from);
    let role = words.phrase_filtered(from + 1, words.lower.len());
    if role.is_empty() || permission.is_empty() {
        return None;
    }
    Some(intent_with(
        CommandAction::RemovePermission,
        IntentEntities {
            role_name: Some(role),
            permission_name: Some(permission),
            description: None,
        },
        FALLBACK_CONFIDENCE,
    ))
}

/// `create/make/add [a] [new] permission|role [called] X
/// [with description "..."]`
fn match_create(words: &Words) -> Option<CommandIntent> {
    let verb = words.position(0, |t| CREATE_VERBS.contains(&t))?;
    let kind = words.position(verb + 1, |t| {
        t == "permission" || t == "permissions" || t == "role" || t == "roles"
    })?;
    // only article fillers may sit between the verb and the kind word
    for i in verb + 1..kind {
        if !["a", "an", "new", "the"].contains(&words.lower[i].as_str()) {
            return None;
        }
    }

    let name_start = words.skip_leading(kind + 1, &["called", "named"]);
    let (name_end, description) = match words.description_marker(name_start) {
        Some((marker, desc_start)) => (
            marker,
            Some(words.phrase(desc_start, words.lower.len())).filter(|d| !d.is_empty()),
        ),
        None => (words.lower.len(), None),
    };
    let name = words.phrase(name_start, name_end);
    if name.is_empty() {
        return None;
    }

    let entities = if words.lower[kind].starts_with("permission") {
        IntentEntities {
            permission_name: Some(name),
            description,
            ..Default::default()
        }
    } else {
        IntentEntities {
            role_name: Some(name),
            ..Default::default()
        }
    };
    let action = if words.lower[kind].starts_with("permission") {
        CommandAction::CreatePermission
    } else {
        CommandAction::CreateRole
    };
    Some(intent_with(action, entities, FALLBACK_CONFIDENCE))
}

/// `list/show [all] roles|permissions`
fn match_list(words: &Words) -> Option<CommandIntent> {
    let first = words.lower.first()?.as_str();
    if !QUERY_VERBS.contains(&first) {
        return None;
    }
    // "what can X do" and "what permissions does X have" are describes
    if first == "what" && words.lower.iter().any(|t| t == "can" || t == "does") {
        return None;
    }
    let action = if words.lower.iter().any(|t| t == "permissions") {
        CommandAction::ListPermissions
    } else if words.lower.iter().any(|t| t == "roles") {
        CommandAction::ListRoles
    } else {
        return None;
    };
    Some(intent_with(
        action,
        IntentEntities::default(),
        LIST_FALLBACK_CONFIDENCE,
    ))
}

/// `describe [role] X`, `show role X`, `what can X do`, or
/// `what permissions does X have`
fn match_describe(words: &Words) -> Option<CommandIntent> {
    let first = words.lower.first()?.as_str();
    let name = if first == "describe" {
        words.phrase_filtered(1, words.lower.len())
    } else if first == "show" {
        // the singular form only; "show roles" is a list command
        let kind = words.position(1, |t| t == "role")?;
        words.phrase_filtered(kind + 1, words.lower.len())
    } else if first == "what" {
        let last = words.lower.len().checked_sub(1)?;
        if let Some(can) = words.position(1, |t| t == "can") {
            if words.lower[last] != "do" || can + 1 >= last {
                return None;
            }
            words.phrase_filtered(can + 1, last)
        } else {
            let does = words.position(1, |t| t == "does")?;
            if words.lower[last] != "have" || does + 1 >= last {
                return None;
            }
            words.phrase_filtered(does + 1, last)
        }
    } else {
        return None;
    };

    if name.is_empty() {
        return None;
    }
    Some(intent_with(
        CommandAction::DescribeRole,
        IntentEntities {
            role_name: Some(name),
            ..Default::default()
        },
        FALLBACK_CONFIDENCE,
    ))
}

fn intent_with(action: CommandAction, entities: IntentEntities, confidence: f32) -> CommandIntent {
    CommandIntent {
        action,
        entities: entities.clean(),
        confidence,
        suggestions: Vec::new(),
    }
}

/// Command text split into cleaned tokens, original casing kept for
/// captures
struct Words<'a> {
    raw: Vec<&'a str>,
    lower: Vec<String>,
}

impl<'a> Words<'a> {
    fn new(command: &'a str) -> Self {
        let raw: Vec<&str> = command
            .split_whitespace()
            .map(clean_token)
            .filter(|t| !t.is_empty())
            .collect();
        let lower = raw.iter().map(|t| t.to_lowercase()).collect();
        Self { raw, lower }
    }

    fn position(&self, from: usize, pred: impl Fn(&str) -> bool) -> Option<usize> {
        (from..self.lower.len()).find(|&i| pred(&self.lower[i]))
    }

    /// First index at or after `from` whose token is not in `skip`
    fn skip_leading(&self, from: usize, skip: &[&str]) -> usize {
        let mut i = from;
        while i < self.lower.len() && skip.contains(&self.lower[i].as_str()) {
            i += 1;
        }
        i
    }

    /// Original-cased tokens in `[start, end)` joined with spaces
    fn phrase(&self, start: usize, end: usize) -> String {
        let end = end.min(self.raw.len());
        if start >= end {
            return String::new();
        }
        self.raw[start..end].join(" ")
    }

    /// Like `phrase`, with filler words dropped
    fn phrase_filtered(&self, start: usize, end: usize) -> String {
        let end = end.min(self.raw.len());
        if start >= end {
            return String::new();
        }
        (start..end)
            .filter(|&i| !FILLERS.contains(&self.lower[i].as_str()))
            .map(|i| self.raw[i])
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Find `with description ...` or `described as ...` after `from`
    ///
    /// Returns (marker index, index where the description text starts).
    fn description_marker(&self, from: usize) -> Option<(usize, usize)> {
        for i in from..self.lower.len().saturating_sub(1) {
            if self.lower[i] == "with" && self.lower[i + 1] == "description" {
                return Some((i, i + 2));
            }
            if self.lower[i] == "described" && self.lower[i + 1] == "as" {
                return Some((i, i + 2));
            }
        }
        None
    }
}

fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, ',' | '.' | '!' | '?' | ';' | '"' | '\''))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::context::KnownPermission;

    fn context() -> EntityContext {
        EntityContext {
            role_names: vec!["Admin".into(), "content_editor".into()],
            permissions: vec![
                KnownPermission {
                    name: "can_view_dashboard".into(),
                    description: None,
                },
                KnownPermission {
                    name: "edit_posts".into(),
                    description: None,
                },
            ],
        }
    }

    #[test]
    fn test_assign_role_before_keyword() {
        let intent = parse("assign content_editor the permission edit_posts", &context());
        assert_eq!(intent.action, CommandAction::AssignPermission);
        assert_eq!(intent.entities.role_name.as_deref(), Some("content_editor"));
        assert_eq!(intent.entities.permission_name.as_deref(), Some("edit_posts"));
        assert!((intent.confidence - FALLBACK_CONFIDENCE).abs() < 0.001);
    }

    #[test]
    fn test_assign_with_articles_and_to() {
        let intent = parse(
            "give the role content_editor the permission to edit_posts",
            &context(),
        );
        assert_eq!(intent.action, CommandAction::AssignPermission);
        assert_eq!(intent.entities.role_name.as_deref(), Some("content_editor"));
        assert_eq!(intent.entities.permission_name.as_deref(), Some("edit_posts"));
    }

    #[test]
    fn test_assign_permission_first_form() {
        let intent = parse(
            "give permission to content editor to view dashboard",
            &context(),
        );
        assert_eq!(intent.action, CommandAction::AssignPermission);
        assert_eq!(intent.entities.role_name.as_deref(), Some("content_editor"));
        assert_eq!(
            intent.entities.permission_name.as_deref(),
            Some("can_view_dashboard")
        );
    }

    #[test]
    fn test_assign_resolves_loose_permission_mention() {
        let intent = parse("grant Admin the permission view dashboard", &context());
        assert_eq!(intent.action, CommandAction::AssignPermission);
        assert_eq!(
            intent.entities.permission_name.as_deref(),
            Some("can_view_dashboard")
        );
    }

    #[test]
    fn test_remove_pattern() {
        let intent = parse(
            "remove the permission edit_posts from the role content_editor",
            &context(),
        );
        assert_eq!(intent.action, CommandAction::RemovePermission);
        assert_eq!(intent.entities.role_name.as_deref(), Some("content_editor"));
        assert_eq!(intent.entities.permission_name.as_deref(), Some("edit_posts"));
    }

    #[test]
    fn test_create_permission() {
        let intent = parse("create a permission called publish_posts", &context());
        assert_eq!(intent.action, CommandAction::CreatePermission);
        assert_eq!(
            intent.entities.permission_name.as_deref(),
            Some("publish_posts")
        );
        assert!(intent.entities.description.is_none());
    }

    #[test]
    fn test_create_permission_with_description() {
        let intent = parse(
            "create permission audit_log with description \"Track admin actions\"",
            &context(),
        );
        assert_eq!(intent.action, CommandAction::CreatePermission);
        assert_eq!(intent.entities.permission_name.as_deref(), Some("audit_log"));
        assert_eq!(
            intent.entities.description.as_deref(),
            Some("Track admin actions")
        );
    }

    #[test]
    fn test_create_role_multi_word_name() {
        let intent = parse("create a role called Content Editor", &context());
        assert_eq!(intent.action, CommandAction::CreateRole);
        assert_eq!(intent.entities.role_name.as_deref(), Some("Content Editor"));
    }

    #[test]
    fn test_add_a_new_role() {
        let intent = parse("add a new role called guest", &context());
        assert_eq!(intent.action, CommandAction::CreateRole);
        assert_eq!(intent.entities.role_name.as_deref(), Some("guest"));
    }

    #[test]
    fn test_make_new_permission_without_called() {
        let intent = parse("make a new permission view_reports", &context());
        assert_eq!(intent.action, CommandAction::CreatePermission);
        assert_eq!(
            intent.entities.permission_name.as_deref(),
            Some("view_reports")
        );
    }

    #[test]
    fn test_list_roles() {
        let intent = parse("list all roles", &context());
        assert_eq!(intent.action, CommandAction::ListRoles);
        assert!((intent.confidence - LIST_FALLBACK_CONFIDENCE).abs() < 0.001);
    }

    #[test]
    fn test_show_permissions() {
        let intent = parse("show permissions", &context());
        assert_eq!(intent.action, CommandAction::ListPermissions);
    }

    #[test]
    fn test_describe_role() {
        let intent = parse("describe role Admin", &context());
        assert_eq!(intent.action, CommandAction::DescribeRole);
        assert_eq!(intent.entities.role_name.as_deref(), Some("Admin"));
    }

    #[test]
    fn test_what_can_form() {
        let intent = parse("what can the content editor do", &context());
        assert_eq!(intent.action, CommandAction::DescribeRole);
        assert_eq!(intent.entities.role_name.as_deref(), Some("content_editor"));
    }

    #[test]
    fn test_what_permissions_does_form() {
        let intent = parse("what permissions does content_editor have", &context());
        assert_eq!(intent.action, CommandAction::DescribeRole);
        assert_eq!(intent.entities.role_name.as_deref(), Some("content_editor"));
    }

    #[test]
    fn test_show_role_form() {
        let intent = parse("show role Admin", &context());
        assert_eq!(intent.action, CommandAction::DescribeRole);
        assert_eq!(intent.entities.role_name.as_deref(), Some("Admin"));
    }

    #[test]
    fn test_unmatched_input_is_unknown_with_suggestion() {
        let intent = parse("frobnicate the widgets", &context());
        assert_eq!(intent.action, CommandAction::Unknown);
        assert_eq!(intent.confidence, 0.0);
        assert!(!intent.suggestions.is_empty());
    }

    #[test]
    fn test_empty_input_is_unknown() {
        let intent = parse("", &context());
        assert_eq!(intent.action, CommandAction::Unknown);
    }

    #[test]
    fn test_assign_missing_permission_name_is_unknown() {
        let intent = parse("assign content_editor the permission", &context());
        assert_eq!(intent.action, CommandAction::Unknown);
    }

    #[test]
    fn test_unresolved_mentions_pass_through() {
        let intent = parse("assign ghost the permission phantom_power", &context());
        assert_eq!(intent.action, CommandAction::AssignPermission);
        assert_eq!(intent.entities.role_name.as_deref(), Some("ghost"));
        assert_eq!(
            intent.entities.permission_name.as_deref(),
            Some("phantom_power")
        );
    }
}
