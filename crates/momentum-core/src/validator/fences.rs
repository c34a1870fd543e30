const FENCE: &str = "```";

/// Remove a Markdown code fence wrapped around a model response.
///
/// Handles an optional language tag on the opening fence (```` ```json ````)
/// and a missing closing fence. Text without a leading fence is only
/// trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            // Single-line fence: skip the tag directly.
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        };
    }

    let trimmed = text.trim_end();
    let trimmed = trimmed.strip_suffix(FENCE).unwrap_or(trimmed);
    trimmed.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_is_untouched() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn tagged_fence_is_removed() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn untagged_fence_is_removed() {
        let raw = "\n```\n[1, 2]\n```\n\n";
        assert_eq!(strip_code_fences(raw), "[1, 2]");
    }

    #[test]
    fn missing_closing_fence() {
        assert_eq!(strip_code_fences("```json\n{}"), "{}");
    }

    #[test]
    fn single_line_fence() {
        assert_eq!(strip_code_fences("```json{\"a\":true}```"), "{\"a\":true}");
    }

    #[test]
    fn empty_input() {
        assert_eq!(strip_code_fences(""), "");
        assert_eq!(strip_code_fences("```\n```"), "");
    }
}
