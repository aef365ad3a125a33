//! Escape handling for Sigma patterns
//!
//! Sigma values use `*` as the only wildcard. A backslash escapes a following
//! `*` or backslash; any other backslash is literal. Everything else that is
//! special to glob syntax is escaped so it matches itself.

use std::borrow::Cow;

const SIGMA_WILDCARD: char = '*';
const SIGMA_ESCAPE: char = '\\';

fn is_glob_special(c: char) -> bool {
    matches!(c, '?' | '[' | ']' | '{' | '}' | ',' | '!')
}

/// True when the value contains an unescaped `*`
pub fn has_wildcard(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            SIGMA_ESCAPE => match chars.clone().next() {
                Some(SIGMA_WILDCARD) | Some(SIGMA_ESCAPE) => {
                    chars.next();
                }
                _ => {}
            },
            SIGMA_WILDCARD => return true,
            _ => {}
        }
    }
    false
}

/// Remove Sigma escapes, producing the literal value
pub fn unescape_sigma(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains(SIGMA_ESCAPE) {
        return Cow::Borrowed(pattern);
    }
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == SIGMA_ESCAPE {
            if let Some(&next) = chars.peek() {
                if next == SIGMA_WILDCARD || next == SIGMA_ESCAPE {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Translate a Sigma value into globset syntax with backslash escapes enabled.
///
/// Runs of unescaped `*` collapse to a single `*`.
pub fn escape_sigma_for_glob(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    let mut last_was_wildcard = false;

    while let Some(c) = chars.next() {
        match c {
            SIGMA_ESCAPE => {
                match chars.peek() {
                    Some(&next) if next == SIGMA_WILDCARD || next == SIGMA_ESCAPE => {
                        out.push(SIGMA_ESCAPE);
                        out.push(next);
                        chars.next();
                    }
                    _ => out.push_str("\\\\"),
                }
                last_was_wildcard = false;
            }
            SIGMA_WILDCARD => {
                if !last_was_wildcard {
                    out.push(SIGMA_WILDCARD);
                }
                last_was_wildcard = true;
            }
            c if is_glob_special(c) => {
                out.push(SIGMA_ESCAPE);
                out.push(c);
                last_was_wildcard = false;
            }
            c => {
                out.push(c);
                last_was_wildcard = false;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_backslash_is_literal() {
        assert_eq!(escape_sigma_for_glob(r"*\bitsadmin.exe"), r"*\\bitsadmin.exe");
        assert_eq!(escape_sigma_for_glob(r"C:\Windows\"), r"C:\\Windows\\");
    }

    #[test]
    fn test_escaped_wildcard() {
        assert_eq!(escape_sigma_for_glob(r"foo\*bar"), r"foo\*bar");
        assert!(!has_wildcard(r"foo\*bar"));
        assert_eq!(unescape_sigma(r"foo\*bar"), "foo*bar");
    }

    #[test]
    fn test_escaped_backslash_before_wildcard() {
        assert_eq!(escape_sigma_for_glob(r"foo\\*"), r"foo\\*");
        assert!(has_wildcard(r"foo\\*"));
    }

    #[test]
    fn test_glob_specials_escaped() {
        assert_eq!(escape_sigma_for_glob("a?[b]{c}"), r"a\?\[b\]\{c\}");
    }

    #[test]
    fn test_wildcard_runs_collapse() {
        assert_eq!(escape_sigma_for_glob("**a***"), "*a*");
    }

    #[test]
    fn test_unescape_without_escapes_borrows() {
        assert!(matches!(unescape_sigma("plain"), Cow::Borrowed("plain")));
    }
}
