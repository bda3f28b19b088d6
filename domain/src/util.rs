//! Shared utility functions.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview of a tool input for logs.
///
/// Newlines are flattened and anything past `max_bytes` is replaced by `...`.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let cut = truncate_str(s, max_bytes);
    let mut out = cut.replace(['\n', '\r'], " ");
    if cut.len() < s.len() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        let s = "あのね";
        assert_eq!(truncate_str(s, 4), "あ");
        assert_eq!(truncate_str(s, 9), "あのね");
    }

    #[test]
    fn truncate_empty() {
        assert_eq!(truncate_str("", 10), "");
    }

    #[test]
    fn preview_short_input_unchanged() {
        assert_eq!(preview(r#"{"a":1}"#, 80), r#"{"a":1}"#);
    }

    #[test]
    fn preview_marks_truncation() {
        assert_eq!(preview("abcdefgh", 3), "abc...");
    }

    #[test]
    fn preview_flattens_newlines() {
        assert_eq!(preview("line1\nline2", 80), "line1 line2");
    }
}
