//! Structured-payload extraction from free-text backend responses.
//!
//! Generative backends routinely wrap their JSON in prose or markdown fences.
//! The contract boundary only cares about the outermost object: everything
//! before the first `{` and after the last `}` is discarded.

/// Extract the first-`{`-to-last-`}` substring of `raw`, if any.
///
/// Returns `None` when no opening brace exists, no closing brace exists, or
/// the last closing brace precedes the first opening brace. The extracted
/// substring is not guaranteed to be valid JSON; parsing happens later.
pub fn extract_payload(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_object() {
        assert_eq!(extract_payload("{\"a\": 1}"), Some("{\"a\": 1}"));
    }

    #[test]
    fn strips_prose_and_markdown_fences() {
        let raw = "Sure! Here is the decision:\n```json\n{\"a\": 1}\n```\nLet me know.";
        assert_eq!(extract_payload(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn spans_nested_objects_to_last_brace() {
        let raw = "prefix {\"outer\": {\"inner\": 2}} suffix";
        assert_eq!(extract_payload(raw), Some("{\"outer\": {\"inner\": 2}}"));
    }

    #[test]
    fn rejects_text_without_delimiters() {
        assert_eq!(extract_payload("no structure here"), None);
        assert_eq!(extract_payload(""), None);
        assert_eq!(extract_payload("only open {"), None);
        assert_eq!(extract_payload("only close }"), None);
    }

    #[test]
    fn rejects_close_before_open() {
        assert_eq!(extract_payload("} backwards {"), None);
    }
}
