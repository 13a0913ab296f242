//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap their JSON in prose or code fences. These helpers cut out the
//! outermost `{...}` object before deserializing.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Longest raw excerpt included in error messages
const MAX_RAW_IN_ERROR: usize = 200;

/// Slice from the first `{` to the last `}` of a response
pub fn extract_json(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            truncate(response)
        ))),
    }
}

/// Extract and deserialize the JSON object embedded in a model reply
pub fn parse_json_response<T: DeserializeOwned>(response: &str) -> Result<T> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from AI: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_RAW_IN_ERROR {
        format!("{}...", s.chars().take(MAX_RAW_IN_ERROR).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        category: String,
        confidence: f64,
    }

    #[test]
    fn test_parse_plain_json() {
        let reply: Reply = parse_json_response(r#"{"category":"food","confidence":0.9}"#).unwrap();
        assert_eq!(reply.category, "food");
    }

    #[test]
    fn test_parse_json_with_surrounding_text() {
        let response = "Sure! Here you go:\n```json\n{\"category\": \"transport\", \"confidence\": 0.8}\n```\nAnything else?";
        let reply: Reply = parse_json_response(response).unwrap();
        assert_eq!(
            reply,
            Reply {
                category: "transport".to_string(),
                confidence: 0.8
            }
        );
    }

    #[test]
    fn test_nested_objects_keep_outer_braces() {
        let json = extract_json(r#"x {"a": {"b": 1}} y"#).unwrap();
        assert_eq!(json, r#"{"a": {"b": 1}}"#);
    }

    #[test]
    fn test_no_json() {
        let result: Result<Reply> = parse_json_response("I cannot help with that");
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_invalid_json_error_is_truncated() {
        let long = format!("{{\"category\": {}}}", "x".repeat(500));
        let err = parse_json_response::<Reply>(&long).unwrap_err().to_string();
        assert!(err.contains("Invalid JSON from AI"));
        assert!(err.ends_with("..."));
    }
}
