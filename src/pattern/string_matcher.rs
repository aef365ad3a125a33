//! String pattern matching implementations

use crate::pattern::traits::StringMatcher;
use crate::pattern::whitespace::handle_whitespace;
use globset::GlobMatcher;
use regex::Regex;
use std::sync::Arc;

/// Pattern for exact content matching
#[derive(Debug, Clone)]
pub struct ContentPattern {
    /// The token to match
    pub token: Arc<str>,
    /// Whether to perform case-insensitive matching
    pub lowercase: bool,
    /// Whether to preserve whitespace
    pub no_collapse_ws: bool,
}

impl StringMatcher for ContentPattern {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.no_collapse_ws);
        if self.lowercase {
            value.eq_ignore_ascii_case(&self.token)
        } else {
            *value == *self.token
        }
    }
}

/// Pattern for prefix matching
#[derive(Debug, Clone)]
pub struct PrefixPattern {
    /// The token to match as prefix
    pub token: Arc<str>,
    /// Whether to perform case-insensitive matching
    pub lowercase: bool,
    /// Whether to preserve whitespace
    pub no_collapse_ws: bool,
}

impl StringMatcher for PrefixPattern {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.no_collapse_ws);
        if self.lowercase {
            value
                .get(..self.token.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(&self.token))
        } else {
            value.starts_with(&*self.token)
        }
    }
}

/// Pattern for suffix matching
#[derive(Debug, Clone)]
pub struct SuffixPattern {
    /// The token to match as suffix
    pub token: Arc<str>,
    /// Whether to perform case-insensitive matching
    pub lowercase: bool,
    /// Whether to preserve whitespace
    pub no_collapse_ws: bool,
}

impl StringMatcher for SuffixPattern {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.no_collapse_ws);
        if self.lowercase {
            value
                .len()
                .checked_sub(self.token.len())
                .and_then(|start| value.get(start..))
                .map_or(false, |tail| tail.eq_ignore_ascii_case(&self.token))
        } else {
            value.ends_with(&*self.token)
        }
    }
}

/// Pattern for regular expression matching
#[derive(Debug)]
pub struct RegexPattern {
    /// The compiled regular expression
    pub regex: Regex,
}

impl StringMatcher for RegexPattern {
    fn string_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Pattern for glob matching
#[derive(Debug)]
pub struct GlobPatternMatcher {
    /// The compiled glob pattern
    pub glob: GlobMatcher,
    /// Whether to preserve whitespace
    pub no_collapse_ws: bool,
}

impl StringMatcher for GlobPatternMatcher {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.no_collapse_ws);
        self.glob.is_match(value.as_ref())
    }
}

/// Collection of string matchers (OR logic)
#[derive(Debug)]
pub struct StringMatchers {
    matchers: Vec<Box<dyn StringMatcher>>,
}

impl StringMatchers {
    /// Create a new collection of string matchers (OR logic)
    pub fn new(matchers: Vec<Box<dyn StringMatcher>>) -> Self {
        Self { matchers }
    }

    /// Number of wrapped matchers
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// True when no matcher is wrapped
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl StringMatcher for StringMatchers {
    fn string_match(&self, value: &str) -> bool {
        self.matchers.iter().any(|m| m.string_match(value))
    }
}

/// Collection of string matchers (AND logic)
#[derive(Debug)]
pub struct StringMatchersConj {
    matchers: Vec<Box<dyn StringMatcher>>,
}

impl StringMatchersConj {
    /// Create a new collection of string matchers (AND logic)
    pub fn new(matchers: Vec<Box<dyn StringMatcher>>) -> Self {
        Self { matchers }
    }
}

impl StringMatcher for StringMatchersConj {
    fn string_match(&self, value: &str) -> bool {
        self.matchers.iter().all(|m| m.string_match(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(token: &str, lowercase: bool) -> ContentPattern {
        ContentPattern {
            token: Arc::from(token),
            lowercase,
            no_collapse_ws: false,
        }
    }

    #[test]
    fn test_content_pattern() {
        assert!(content("cmd.exe", false).string_match("cmd.exe"));
        assert!(!content("cmd.exe", false).string_match("CMD.EXE"));
        assert!(content("cmd.exe", true).string_match("CMD.EXE"));
        assert!(!content("cmd.exe", true).string_match("xcmd.exe"));
    }

    #[test]
    fn test_content_pattern_collapses_value_whitespace() {
        assert!(content("net user", false).string_match("net   user"));
        let strict = ContentPattern {
            no_collapse_ws: true,
            ..content("net user", false)
        };
        assert!(!strict.string_match("net   user"));
    }

    #[test]
    fn test_prefix_suffix_case_insensitive() {
        let prefix = PrefixPattern {
            token: Arc::from("c:\\windows"),
            lowercase: true,
            no_collapse_ws: false,
        };
        assert!(prefix.string_match("C:\\Windows\\System32"));
        assert!(!prefix.string_match("C:"));

        let suffix = SuffixPattern {
            token: Arc::from(".EXE"),
            lowercase: true,
            no_collapse_ws: false,
        };
        assert!(suffix.string_match("whoami.exe"));
        assert!(!suffix.string_match("exe"));
    }

    #[test]
    fn test_prefix_on_multibyte_boundary() {
        let prefix = PrefixPattern {
            token: Arc::from("ab"),
            lowercase: true,
            no_collapse_ws: false,
        };
        assert!(!prefix.string_match("aäb"));
    }

    #[test]
    fn test_collections() {
        let or = StringMatchers::new(vec![
            Box::new(content("a", false)),
            Box::new(content("b", false)),
        ]);
        assert!(or.string_match("b"));
        assert!(!or.string_match("c"));
        assert_eq!(or.len(), 2);

        let and = StringMatchersConj::new(vec![
            Box::new(content("a", false)),
            Box::new(content("A", true)),
        ]);
        assert!(and.string_match("a"));
        assert!(!and.string_match("A"));
    }
}
