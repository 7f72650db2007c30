/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Trim and strip characters that have no place in single-line user text.
///
/// Removes ASCII control characters and angle brackets, collapses runs of
/// whitespace into one space.
pub fn sanitize_inline_text(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() && *c != '<' && *c != '>')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`sanitize_inline_text`] but keeps line breaks for notes.
pub fn sanitize_multiline_text(input: &str) -> String {
    input
        .lines()
        .map(sanitize_inline_text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Sanitize an optional field, mapping blank results to `None`.
pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_inline_text)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_inline_text() {
        assert_eq!(sanitize_inline_text("  Table   4 "), "Table 4");
        assert_eq!(
            sanitize_inline_text("<script>alert(1)</script>"),
            "scriptalert(1)/script"
        );
        assert_eq!(sanitize_inline_text("a\u{0}b\tc"), "abc");
        assert_eq!(sanitize_inline_text("a\u{7}b   c"), "ab c");
    }

    #[test]
    fn test_sanitize_multiline_keeps_lines() {
        assert_eq!(
            sanitize_multiline_text(" no onions \n  extra <b>spicy</b> "),
            "no onions\nextra bspicy/b"
        );
    }

    #[test]
    fn test_sanitize_optional_blank_is_none() {
        assert_eq!(sanitize_optional(Some("   ")), None);
        assert_eq!(sanitize_optional(Some(" x ")), Some("x".to_string()));
        assert_eq!(sanitize_optional(None), None);
    }
}
