//! Line-level helpers for the `key = value` settings format.

/// What: Remove trailing `//` or `#` comments from a value.
///
/// Inputs:
/// - `s`: Raw value text after the `=`
///
/// Output:
/// - Comment-free, trimmed value
pub(crate) fn strip_inline_comment(mut s: &str) -> &str {
    if let Some(i) = s.find("//") {
        s = &s[..i];
    }
    if let Some(i) = s.find('#') {
        s = &s[..i];
    }
    s.trim()
}

/// Normalize a settings key: lower-case, with `.`, `-` and spaces mapped to `_`.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['.', '-', ' '], "_")
}

/// What: Parse a boolean settings value.
///
/// Output:
/// - `Some(bool)` for `true/false`, `yes/no`, `on/off`, `1/0`; `None` otherwise
pub(crate) fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// What: Split a settings line into a normalized key and a comment-free value.
///
/// Output:
/// - `None` for blank lines, comment lines and lines without `=`
pub(crate) fn split_entry(line: &str) -> Option<(String, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return None;
    }
    let (raw_key, raw_val) = trimmed.split_once('=')?;
    Some((normalize_key(raw_key), strip_inline_comment(raw_val)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_entry_handles_comments_and_key_forms() {
        assert_eq!(
            split_entry("  Sort-Method = label # default"),
            Some(("sort_method".to_string(), "label"))
        );
        assert_eq!(
            split_entry("show.system=yes // later"),
            Some(("show_system".to_string(), "yes"))
        );
        assert_eq!(split_entry("# comment"), None);
        assert_eq!(split_entry("no equals sign"), None);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
