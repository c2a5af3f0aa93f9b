//! Validation and sanitization rules for directory names.
//!
//! Every function here is pure and total; callers decide how to surface
//! a `false` verdict.

/// Characters stripped from names: path separators plus the characters
/// reserved by common filesystems.
const ILLEGAL_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names that cannot be used as directory names.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Maximum sanitized name length in characters.
const MAX_NAME_LEN: usize = 255;

/// Maximum description length in characters.
const MAX_DESCRIPTION_LEN: usize = 1000;

/// Sanitize a directory name.
///
/// Strips illegal characters, collapses whitespace runs to a single
/// space, and trims leading/trailing spaces and dots. Deterministic and
/// idempotent; may return the empty string.
pub fn sanitize_name(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| !ILLEGAL_CHARS.contains(c)).collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c == ' ' || c == '.')
        .to_string()
}

/// Validate a directory name.
///
/// The name must already be in canonical form (sanitizing it must be a
/// no-op), non-empty, at most 255 characters, and not a reserved device
/// token.
pub fn validate_name(name: &str) -> bool {
    if sanitize_name(name) != name {
        return false;
    }
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return false;
    }
    !is_reserved_name(name)
}

/// Check whether a name matches a reserved device token.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Validate an optional description. Absent descriptions are valid.
pub fn validate_description(description: Option<&str>) -> bool {
    description.is_none_or(|d| d.chars().count() <= MAX_DESCRIPTION_LEN)
}

/// Validate an optional sort order. Absent values are valid.
pub fn validate_sort_order(sort_order: Option<i32>) -> bool {
    sort_order.is_none_or(|n| n >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_illegal_chars() {
        assert_eq!(sanitize_name("a/b\\c:d*e?f\"g<h>i|j"), "abcdefghij");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_name("  Getting \t\t Started  "), "Getting Started");
    }

    #[test]
    fn test_sanitize_trims_dots_and_spaces() {
        assert_eq!(sanitize_name(". release notes .."), "release notes");
        assert_eq!(sanitize_name("..."), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in [
            "  Docs / 2024  ",
            "a*b?c",
            "plain",
            "..dotted..",
            "tabs\tand\nnewlines",
        ] {
            let once = sanitize_name(raw);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_validate_name_accepts_clean_names() {
        assert!(validate_name("Guides"));
        assert!(validate_name("2024 Release Notes"));
        assert!(validate_name("a.b"));
    }

    #[test]
    fn test_validate_name_rejects_separators() {
        assert!(!validate_name("a/b"));
        assert!(!validate_name("a\\b"));
    }

    #[test]
    fn test_validate_name_rejects_unclean_input() {
        assert!(!validate_name(" padded "));
        assert!(!validate_name("double  space"));
        assert!(!validate_name("trailing."));
    }

    #[test]
    fn test_validate_name_rejects_empty_and_overlong() {
        assert!(!validate_name(""));
        assert!(!validate_name(&"x".repeat(256)));
        assert!(validate_name(&"x".repeat(255)));
    }

    #[test]
    fn test_validate_name_rejects_reserved_tokens() {
        assert!(!validate_name("CON"));
        assert!(!validate_name("con"));
        assert!(!validate_name("Lpt3"));
        assert!(validate_name("CONSOLE"));
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description(None));
        assert!(validate_description(Some("short")));
        assert!(validate_description(Some(&"d".repeat(1000))));
        assert!(!validate_description(Some(&"d".repeat(1001))));
    }

    #[test]
    fn test_validate_sort_order() {
        assert!(validate_sort_order(None));
        assert!(validate_sort_order(Some(0)));
        assert!(validate_sort_order(Some(42)));
        assert!(!validate_sort_order(Some(-1)));
    }
}
