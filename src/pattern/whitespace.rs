//! Whitespace handling for Sigma patterns
//!
//! Implements whitespace collapsing for non-regex patterns as per Sigma specification.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Global regex for whitespace collapsing
static WHITESPACE_COLLAPSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Handle whitespace in a string according to Sigma rules
///
/// If `no_collapse_ws` is false (default), collapses consecutive whitespace
/// characters into a single space. Otherwise returns the string unchanged.
pub fn handle_whitespace(s: &str, no_collapse_ws: bool) -> Cow<'_, str> {
    if no_collapse_ws || !needs_collapse(s) {
        Cow::Borrowed(s)
    } else {
        WHITESPACE_COLLAPSE.replace_all(s, " ")
    }
}

fn needs_collapse(s: &str) -> bool {
    let mut prev_ws = false;
    for c in s.chars() {
        let ws = c.is_whitespace();
        if ws && (prev_ws || c != ' ') {
            return true;
        }
        prev_ws = ws;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_whitespace() {
        assert_eq!(handle_whitespace("test", false), "test");
        assert_eq!(handle_whitespace("test", true), "test");
    }

    #[test]
    fn test_single_spaces_are_borrowed() {
        assert!(matches!(
            handle_whitespace("test string", false),
            Cow::Borrowed("test string")
        ));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(handle_whitespace("test  string", false), "test string");
        assert_eq!(handle_whitespace("test   string", false), "test string");
        assert_eq!(handle_whitespace("test\t\tstring", false), "test string");
        assert_eq!(handle_whitespace("test\tstring", false), "test string");
        assert_eq!(handle_whitespace("test \t \n string", false), "test string");
    }

    #[test]
    fn test_no_collapse_when_disabled() {
        assert_eq!(handle_whitespace("test  string", true), "test  string");
        assert_eq!(handle_whitespace("test\t\tstring", true), "test\t\tstring");
    }

    #[test]
    fn test_leading_trailing_whitespace() {
        assert_eq!(handle_whitespace("  test  ", false), " test ");
        assert_eq!(handle_whitespace("\t\ttest\n\n", false), " test ");
        assert_eq!(handle_whitespace("  test  ", true), "  test  ");
    }
}
