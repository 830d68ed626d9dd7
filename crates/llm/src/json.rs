//! Helpers for JSON-mode model output

/// Strip markdown code fences from an LLM JSON response
///
/// Handles the common formats:
/// - ```` ```json ... ``` ````
/// - ```` ``` ... ``` ````
/// - plain JSON
pub fn clean_json_response(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = match rest.find("```") {
            Some(end) => &rest[..end],
            None => rest,
        };
    } else if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        assert_eq!(clean_json_response("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_json_fence() {
        assert_eq!(clean_json_response("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_bare_fence() {
        assert_eq!(clean_json_response("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(clean_json_response("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_trailing_fence_only() {
        assert_eq!(clean_json_response("{\"a\": 1}\n```"), "{\"a\": 1}");
    }
}
