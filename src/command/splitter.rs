//! Deterministic multi-command splitting
//!
//! The cheap half of the command splitter: a lexical pre-check that
//! decides whether the classifier is worth consulting at all, and a
//! conjunction split used when it is not available. The semantic split
//! (pronoun rewriting, uneven phrasing) lives with the classifier.

const SEPARATORS: &[&str] = &[" and ", " then ", ", ", " also "];

const CONJUNCTIONS: &[&str] = &["and", "then", "also"];

/// Verbs that make a comma read as a command boundary
const BOUNDARY_VERBS: &[&str] = &[
    "create", "make", "add", "assign", "give", "grant", "remove", "revoke", "take", "list",
    "show", "display", "describe",
];

/// Whether the text carries any separator worth a semantic split
///
/// Commands without one are passed through untouched, skipping the
/// model call entirely.
pub fn has_separators(command: &str) -> bool {
    let lower = command.to_lowercase();
    SEPARATORS.iter().any(|sep| lower.contains(sep)) || command.contains("  ")
}

/// Split on conjunction tokens, dropping empty segments
///
/// A comma only counts as a boundary when a command verb or conjunction
/// follows it, so "create role a, create role b" splits while a comma
/// inside a name phrase does not. The verb stays with its segment. Never
/// returns zero segments: unsplittable input comes back whole.
pub fn split(command: &str) -> Vec<String> {
    let tokens: Vec<&str> = command.split_whitespace().collect();
    let mut segments: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let lower = token.to_lowercase();
        if CONJUNCTIONS.contains(&lower.as_str()) {
            flush(&mut segments, &mut current);
            continue;
        }
        if let Some(stripped) = token.strip_suffix(',') {
            // An Oxford comma ("x, and create y") sheds its comma too
            let next_is_boundary = tokens
                .get(idx + 1)
                .map(|next| {
                    let next = next.to_lowercase();
                    BOUNDARY_VERBS.contains(&next.as_str()) || CONJUNCTIONS.contains(&next.as_str())
                })
                .unwrap_or(false);
            if next_is_boundary {
                if !stripped.is_empty() {
                    current.push(stripped);
                }
                flush(&mut segments, &mut current);
                continue;
            }
        }
        current.push(token);
    }
    flush(&mut segments, &mut current);

    if segments.is_empty() {
        vec![command.to_string()]
    } else {
        segments
    }
}

fn flush(segments: &mut Vec<String>, current: &mut Vec<&str>) {
    if !current.is_empty() {
        segments.push(current.join(" "));
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_separators_in_plain_command() {
        assert!(!has_separators("create a role called moderator"));
    }

    #[test]
    fn test_separator_detection() {
        assert!(has_separators("create role a and create role b"));
        assert!(has_separators("create x then assign it"));
        assert!(has_separators("create role a, create role b"));
        assert!(has_separators("list roles also list permissions"));
        assert!(has_separators("create  role"));
    }

    #[test]
    fn test_word_inside_token_is_not_a_separator() {
        assert!(!has_separators("create permission sandwich_repair"));
    }

    #[test]
    fn test_single_command_stays_whole() {
        assert_eq!(
            split("create a role called moderator"),
            vec!["create a role called moderator"]
        );
    }

    #[test]
    fn test_split_on_and() {
        assert_eq!(
            split("create a role called moderator and create role guest"),
            vec!["create a role called moderator", "create role guest"]
        );
    }

    #[test]
    fn test_split_on_then_preserves_order() {
        assert_eq!(
            split("create permission view_dashboard then assign it to admin"),
            vec!["create permission view_dashboard", "assign it to admin"]
        );
    }

    #[test]
    fn test_comma_before_verb_keeps_verb() {
        assert_eq!(
            split("create role editor, create role guest"),
            vec!["create role editor", "create role guest"]
        );
    }

    #[test]
    fn test_oxford_comma_is_dropped() {
        assert_eq!(
            split("create role editor, and create role guest"),
            vec!["create role editor", "create role guest"]
        );
    }

    #[test]
    fn test_comma_without_verb_is_kept() {
        assert_eq!(
            split("create a role called alpha, beta"),
            vec!["create a role called alpha, beta"]
        );
    }

    #[test]
    fn test_never_returns_zero_segments() {
        assert_eq!(split("and"), vec!["and"]);
        assert_eq!(split(""), vec![""]);
    }

    #[test]
    fn test_uppercase_conjunction() {
        assert_eq!(
            split("list roles AND list permissions"),
            vec!["list roles", "list permissions"]
        );
    }
}
