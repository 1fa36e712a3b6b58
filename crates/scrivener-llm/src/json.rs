//! Lenient JSON extraction from model output

use serde_json::Value;

/// Strip a surrounding markdown code fence, if any
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    // Skip the opening fence line (```json or ```) and the closing fence
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return "",
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a JSON object from model output
///
/// Tries the whole (fence-stripped) text first, then the largest
/// `{ ... }` substring. Returns `None` unless the result is an object.
pub fn parse_json_object(response: &str) -> Option<Value> {
    let text = strip_code_fence(response);
    if text.is_empty() {
        return None;
    }
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let value = parse_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_fenced_object() {
        let value = parse_json_object("```json\n{\"a\": [1, 2]}\n```").unwrap();
        assert_eq!(value["a"][1], 2);
    }

    #[test]
    fn test_object_inside_prose() {
        let value = parse_json_object("Here you go: {\"ok\": true} hope it helps").unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(parse_json_object("[1, 2, 3]").is_none());
        assert!(parse_json_object("not json").is_none());
        assert!(parse_json_object("").is_none());
        assert!(parse_json_object("} {").is_none());
    }
}
