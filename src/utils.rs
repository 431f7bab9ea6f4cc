//! Small helpers for logging model output.

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` bytes are cut at the nearest char boundary at or
/// below `max`, with `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When the LLM response is cut off (e.g., due to token limits), the
/// resulting JSON fails to parse with an EOF error.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        // 'é' is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_for_log("aéb", 2), "a…(+3 bytes)");
    }

    #[test]
    fn test_looks_truncated() {
        let eof = serde_json::from_str::<serde_json::Value>(r#"{"field": "value"#).unwrap_err();
        assert!(looks_truncated(&eof));

        let syntax = serde_json::from_str::<serde_json::Value>(r#"{"field": }"#).unwrap_err();
        assert!(!looks_truncated(&syntax));
    }
}
