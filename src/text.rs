//! Small text helpers shared across the pipeline.

/// Safely truncates a string to a maximum character length (not bytes).
///
/// UTF-8 safe; will not panic on multi-byte characters.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Truncates HTML-escaped text to a maximum character length without leaving
/// a dangling partial entity (e.g. `&am`) at the cut point.
#[must_use]
pub fn truncate_escaped(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out = truncate_chars(s, max_chars);
    if let Some(pos) = out.rfind('&') {
        if !out[pos..].contains(';') {
            out.truncate(pos);
        }
    }
    out
}

/// Strips characters that are unsafe in a suggested filename.
#[must_use]
pub fn sanitize_filename(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim().to_string();
    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_unicode() {
        let s = "Привет, мир!";
        assert_eq!(truncate_chars(s, 6), "Привет");
        assert_eq!(truncate_chars(s, 50), "Привет, мир!");
    }

    #[test]
    fn test_truncate_chars_exact_boundary() {
        assert_eq!(truncate_chars("abcd", 4), "abcd");
        assert_eq!(truncate_chars("abcd", 3), "abc");
    }

    #[test]
    fn test_truncate_escaped_drops_partial_entity() {
        // A cut landing inside `&amp;` falls back to the preceding `&`
        assert_eq!(truncate_escaped("a&amp;b", 3), "a");
        assert_eq!(truncate_escaped("a&amp;b", 6), "a&amp;");
        assert_eq!(truncate_escaped("a&amp;b", 7), "a&amp;b");
        assert_eq!(truncate_escaped("plain text", 5), "plain");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my song.mp3"), "my song.mp3");
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("   "), "download");
    }
}
