//! Extract structured JSON from model replies
//!
//! Models wrap JSON in prose or markdown fences no matter how firmly the
//! prompt forbids it, so every structured reply goes through here before
//! serde sees it.

use serde::de::DeserializeOwned;

use crate::core::error::{RbacError, Result};

/// Extract the JSON document from a model reply (handles surrounding text)
///
/// Accepts either an object or an array at the top level.
pub fn extract_json(reply: &str) -> Result<&str> {
    let body = strip_fences(reply);

    let obj = body.find('{');
    let arr = body.find('[');
    let (start, close) = match (obj, arr) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => {
            return Err(RbacError::LlmError("No JSON found in response".into()));
        }
    };
    let end = body
        .rfind(close)
        .filter(|&end| end >= start)
        .ok_or_else(|| RbacError::LlmError("No closing bracket found in response".into()))?;
    Ok(&body[start..=end])
}

/// Extract and deserialize the JSON document from a model reply
pub fn parse_structured_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let json_str = extract_json(reply)?;
    serde_json::from_str(json_str).map_err(|e| {
        RbacError::LlmError(format!("Failed to parse reply: {} - Response: {}", e, reply))
    })
}

/// Drop leading/trailing markdown code fences if present
fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_extract_json_simple() {
        let reply = r#"{"action": "create_role", "confidence": 0.9}"#;
        assert_eq!(extract_json(reply).unwrap(), reply);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let reply = r#"Here is the parsed command:
{"action": "create_role", "confidence": 0.9}
Let me know if you need anything else."#;
        let json = extract_json(reply).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("create_role"));
    }

    #[test]
    fn test_extract_json_strips_markdown_fences() {
        let reply = "```json\n{\"action\": \"list_roles\"}\n```";
        assert_eq!(extract_json(reply).unwrap(), "{\"action\": \"list_roles\"}");
    }

    #[test]
    fn test_extract_json_array() {
        let reply = "The commands are: [\"create a role\", \"list roles\"]";
        let json = extract_json(reply).unwrap();
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(extract_json("I don't understand that command").is_err());
    }

    #[test]
    fn test_extract_json_unclosed_brace() {
        assert!(extract_json("{\"action\": \"oops\"").is_err());
    }

    #[test]
    fn test_parse_structured_reply() {
        let reply = "```json\n{\"isMultiCommand\": true, \"commands\": [\"a\", \"b\"]}\n```";
        let value: Value = parse_structured_reply(reply).unwrap();
        assert_eq!(value["isMultiCommand"], true);
        assert_eq!(value["commands"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_structured_reply_type_mismatch() {
        let result: Result<Vec<String>> = parse_structured_reply("{\"not\": \"a list\"}");
        assert!(result.is_err());
    }
}
