//! Factory functions for creating pattern matchers

use crate::parser::error::ParseError;
use crate::pattern::{
    escape::{escape_sigma_for_glob, has_wildcard, unescape_sigma},
    string_matcher::{
        ContentPattern, GlobPatternMatcher, PrefixPattern, RegexPattern, StringMatchers,
        StringMatchersConj, SuffixPattern,
    },
    traits::StringMatcher,
    whitespace::handle_whitespace,
    TextPatternModifier,
};
use globset::GlobBuilder;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Maximum compiled regex size (10 MB)
const MAX_REGEX_SIZE: usize = 10 * 1024 * 1024;

/// Maximum DFA cache size (2 MB)
const MAX_DFA_SIZE: usize = 2 * 1024 * 1024;

/// Compile a regex with bounded program and cache sizes
pub fn compile_regex(pattern: &str) -> Result<Regex, ParseError> {
    RegexBuilder::new(pattern)
        .size_limit(MAX_REGEX_SIZE)
        .dfa_size_limit(MAX_DFA_SIZE)
        .build()
        .map_err(|source| ParseError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compile a Sigma wildcard value into a glob matcher
pub fn compile_glob(
    pattern: &str,
    lowercase: bool,
    no_collapse_ws: bool,
) -> Result<GlobPatternMatcher, ParseError> {
    build_glob(&escape_sigma_for_glob(pattern), pattern, lowercase, no_collapse_ws)
}

fn build_glob(
    glob_pattern: &str,
    original: &str,
    lowercase: bool,
    no_collapse_ws: bool,
) -> Result<GlobPatternMatcher, ParseError> {
    let glob = GlobBuilder::new(glob_pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .case_insensitive(lowercase)
        .build()
        .map_err(|e| ParseError::InvalidGlobPattern {
            pattern: original.to_string(),
            error: e.to_string(),
        })?;
    Ok(GlobPatternMatcher {
        glob: glob.compile_matcher(),
        no_collapse_ws,
    })
}

fn ends_with_wildcard(glob_pattern: &str) -> bool {
    let Some(body) = glob_pattern.strip_suffix('*') else {
        return false;
    };
    body.chars().rev().take_while(|c| *c == '\\').count() % 2 == 0
}

/// Add unanchored wildcards around an already escaped glob
fn wrap_glob(escaped: &str, leading: bool, trailing: bool) -> String {
    let mut result = String::with_capacity(escaped.len() + 2);
    if leading && !escaped.starts_with('*') {
        result.push('*');
    }
    result.push_str(escaped);
    if trailing && !ends_with_wildcard(escaped) {
        result.push('*');
    }
    result
}

/// Create a new string matcher based on patterns and modifiers.
///
/// Patterns are ORed unless `all` is set. An empty pattern list yields a
/// matcher that never matches.
pub fn new_string_matcher(
    modifier: TextPatternModifier,
    lowercase: bool,
    all: bool,
    no_collapse_ws: bool,
    patterns: Vec<String>,
) -> Result<Box<dyn StringMatcher>, ParseError> {
    let mut matchers: Vec<Box<dyn StringMatcher>> = Vec::with_capacity(patterns.len());

    for pattern in patterns {
        let matcher: Box<dyn StringMatcher> = match modifier {
            TextPatternModifier::Regex => Box::new(RegexPattern {
                regex: compile_regex(&pattern)?,
            }),
            _ => {
                let pattern = handle_whitespace(&pattern, no_collapse_ws);
                literal_or_glob(modifier, &pattern, lowercase, no_collapse_ws)?
            }
        };
        matchers.push(matcher);
    }

    if matchers.len() == 1 {
        if let Some(single) = matchers.pop() {
            return Ok(single);
        }
    }
    if all {
        Ok(Box::new(StringMatchersConj::new(matchers)))
    } else {
        Ok(Box::new(StringMatchers::new(matchers)))
    }
}

fn literal_or_glob(
    modifier: TextPatternModifier,
    pattern: &str,
    lowercase: bool,
    no_collapse_ws: bool,
) -> Result<Box<dyn StringMatcher>, ParseError> {
    let glob = |leading: bool, trailing: bool| -> Result<Box<dyn StringMatcher>, ParseError> {
        let escaped = wrap_glob(&escape_sigma_for_glob(pattern), leading, trailing);
        Ok(Box::new(build_glob(&escaped, pattern, lowercase, no_collapse_ws)?))
    };

    match modifier {
        TextPatternModifier::Contains | TextPatternModifier::Keyword => return glob(true, true),
        _ if has_wildcard(pattern) => {
            return match modifier {
                TextPatternModifier::Prefix => glob(false, true),
                TextPatternModifier::Suffix => glob(true, false),
                _ => glob(false, false),
            };
        }
        _ => {}
    }

    let token: Arc<str> = Arc::from(unescape_sigma(pattern).as_ref());
    Ok(match modifier {
        TextPatternModifier::Prefix => Box::new(PrefixPattern {
            token,
            lowercase,
            no_collapse_ws,
        }),
        TextPatternModifier::Suffix => Box::new(SuffixPattern {
            token,
            lowercase,
            no_collapse_ws,
        }),
        _ => Box::new(ContentPattern {
            token,
            lowercase,
            no_collapse_ws,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(modifier: TextPatternModifier, lowercase: bool, patterns: &[&str]) -> Box<dyn StringMatcher> {
        new_string_matcher(
            modifier,
            lowercase,
            false,
            false,
            patterns.iter().map(|p| p.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_string_matcher_content() {
        let m = matcher(TextPatternModifier::None, false, &["test"]);
        assert!(m.string_match("test"));
        assert!(!m.string_match("Test"));
        assert!(!m.string_match("testing"));
    }

    #[test]
    fn test_new_string_matcher_prefix() {
        let m = matcher(TextPatternModifier::Prefix, false, &["test"]);
        assert!(m.string_match("test"));
        assert!(m.string_match("testing"));
        assert!(!m.string_match("pretest"));
    }

    #[test]
    fn test_new_string_matcher_contains() {
        let m = matcher(TextPatternModifier::Contains, false, &["test"]);
        assert!(m.string_match("test"));
        assert!(m.string_match("testing"));
        assert!(m.string_match("pretest"));
        assert!(m.string_match("pretesting"));
        assert!(!m.string_match("tes"));
    }

    #[test]
    fn test_new_string_matcher_regex() {
        let m = matcher(TextPatternModifier::Regex, false, &[r"^\d{3}-\d{4}$"]);
        assert!(m.string_match("555-1234"));
        assert!(!m.string_match("5551234"));
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let err = new_string_matcher(
            TextPatternModifier::Regex,
            false,
            false,
            false,
            vec!["(unclosed".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidRegex { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_wildcard_glob() {
        let m = matcher(TextPatternModifier::None, false, &[r"*\bitsadmin.exe"]);
        assert!(m.string_match(r"C:\test\bitsadmin.exe"));
        assert!(!m.string_match(r"C:\test\bitsadmin.exe.bak"));
        assert!(!m.string_match(r"C:\test\BITSADMIN.EXE"));

        let ci = matcher(TextPatternModifier::None, true, &[r"*\bitsadmin.exe"]);
        assert!(ci.string_match(r"C:\test\BITSADMIN.EXE"));
    }

    #[test]
    fn test_wildcard_spans_path_separators() {
        let m = matcher(TextPatternModifier::None, false, &["/usr/*/python*"]);
        assert!(m.string_match("/usr/local/bin/python3"));
    }

    #[test]
    fn test_question_mark_is_literal() {
        let m = matcher(TextPatternModifier::None, false, &["what?*"]);
        assert!(m.string_match("what? now"));
        assert!(!m.string_match("whatx now"));
    }

    #[test]
    fn test_escaped_star_is_literal() {
        let m = matcher(TextPatternModifier::None, false, &[r"a\*b"]);
        assert!(m.string_match("a*b"));
        assert!(!m.string_match("axb"));
    }

    #[test]
    fn test_contains_with_trailing_backslash() {
        let m = matcher(TextPatternModifier::Contains, false, &[r"\Windows\"]);
        assert!(m.string_match(r"C:\Windows\System32\cmd.exe"));
        assert!(!m.string_match(r"C:\Windows*"));
    }

    #[test]
    fn test_wrap_glob_avoids_double_wildcards() {
        assert_eq!(wrap_glob("*abc*", true, true), "*abc*");
        assert_eq!(wrap_glob(r"abc\*", true, true), r"*abc\**");
        assert_eq!(wrap_glob(r"abc\\*", false, true), r"abc\\*");
    }

    #[test]
    fn test_all_modifier() {
        let m = new_string_matcher(
            TextPatternModifier::Contains,
            false,
            true,
            false,
            vec!["-enc".to_string(), "-nop".to_string()],
        )
        .unwrap();
        assert!(m.string_match("powershell -nop -enc AAAA"));
        assert!(!m.string_match("powershell -enc AAAA"));
    }

    #[test]
    fn test_pattern_whitespace_collapsed() {
        let m = matcher(TextPatternModifier::None, false, &["net  user"]);
        assert!(m.string_match("net user"));
        assert!(m.string_match("net \t user"));
    }
}
