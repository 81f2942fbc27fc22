use crate::error::{GuardError, Result};
use crate::mcp::protocol::ToolResultPart;
use tracing::{trace, warn};

const FENCE: &str = "```";

/// Parse the JSON document carried by the first text part of a tool result.
///
/// Only the first `"text"` part is considered; everything after it, and every
/// part of another type, is ignored.
pub fn extract_payload(parts: &[ToolResultPart]) -> Result<serde_json::Value> {
    let text = parts
        .iter()
        .find(|p| p.is_text())
        .and_then(|p| p.text.as_deref())
        .filter(|t| !t.is_empty())
        .ok_or(GuardError::NoTextContent)?;

    trace!("Tool output: {}", text);

    let cleaned = strip_code_fence(text);
    serde_json::from_str(cleaned).map_err(|e| {
        warn!("Failed to parse JSON from tool output: {}", text);
        GuardError::MalformedPayload(e)
    })
}

/// Remove a leading ```` ``` ```` fence (with an optional language tag such
/// as `json`) and a trailing ```` ``` ```` fence, then trim surrounding
/// whitespace.
///
/// A tag is only consumed when a line break follows it, or when it is `json`.
pub fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let (tag, body) = rest.split_at(tag_len);
        s = if let Some(body) = strip_line_break(body) {
            body
        } else if tag.eq_ignore_ascii_case("json") {
            body
        } else {
            rest
        };
    }
    if let Some(rest) = s.strip_suffix(FENCE) {
        s = rest;
    }
    s.trim()
}

fn strip_line_break(s: &str) -> Option<&str> {
    s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn part(kind: &str, text: Option<&str>) -> ToolResultPart {
        ToolResultPart {
            kind: kind.to_string(),
            text: text.map(String::from),
        }
    }

    #[test]
    fn test_fenced_payload() {
        let parts = vec![ToolResultPart::text("```json\n{\"a\":1}\n```")];
        assert_eq!(extract_payload(&parts).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_unfenced_payload() {
        let parts = vec![ToolResultPart::text("  {\"a\": [1, 2]}  ")];
        assert_eq!(extract_payload(&parts).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_fence_without_newline() {
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\r\n{}\r\n```"), "{}");
    }

    #[test]
    fn test_fence_without_language_tag() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```JSON\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```javascript\n{}\n```"), "{}");

        let parts = vec![ToolResultPart::text("```\n{\"a\":1}\n```")];
        assert_eq!(extract_payload(&parts).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_first_text_part_wins() {
        let parts = vec![
            part("image", None),
            part("text", Some("{\"first\":true}")),
            part("text", Some("{\"second\":true}")),
        ];
        assert_eq!(extract_payload(&parts).unwrap(), json!({"first": true}));
    }

    #[test]
    fn test_no_text_part() {
        let parts = vec![part("image", None), part("resource", Some("{}"))];
        assert!(matches!(
            extract_payload(&parts),
            Err(GuardError::NoTextContent)
        ));
    }

    #[test]
    fn test_text_part_without_text() {
        let parts = vec![part("text", None), part("text", Some("{}"))];
        assert!(matches!(
            extract_payload(&parts),
            Err(GuardError::NoTextContent)
        ));
    }

    #[test]
    fn test_non_string_text_does_not_fall_through() {
        let result = json!({"content": [
            {"type": "text", "text": 5},
            {"type": "text", "text": "{\"later\":true}"}
        ]});
        let parts = crate::mcp::client::content_parts(&result).unwrap();
        assert!(matches!(
            extract_payload(&parts),
            Err(GuardError::NoTextContent)
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let parts = vec![ToolResultPart::text("not json")];
        let err = extract_payload(&parts).unwrap_err();
        assert!(matches!(err, GuardError::MalformedPayload(_)));
        assert!(err.to_string().contains("did not return valid JSON"));
    }
}
