//! Pattern matching implementations for Sigma rules

pub mod coercion;
pub mod escape;
pub mod factory;
pub mod string_matcher;
pub mod traits;
pub mod whitespace;

pub use coercion::{coerce_for_string_match, coerce_pattern, value_matches};
pub use escape::{escape_sigma_for_glob, has_wildcard};
pub use factory::{compile_glob, compile_regex, new_string_matcher};
pub use string_matcher::*;
pub use traits::StringMatcher;
pub use whitespace::handle_whitespace;

/// Type of sigma detection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierType {
    /// Selection-style identifier (object with field matches)
    Selection,
    /// Keywords-style identifier (array of keywords)
    Keywords,
}

/// Text pattern modifiers for string matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPatternModifier {
    /// Exact value, `*` as wildcard
    None,
    /// `|contains`
    Contains,
    /// `|startswith`
    Prefix,
    /// `|endswith`
    Suffix,
    /// `|re`
    Regex,
    /// Unanchored keyword search
    Keyword,
}

impl TextPatternModifier {
    /// Parse a field-key modifier name. `all` is not a text modifier and
    /// yields `None` here.
    pub fn from_modifier(name: &str) -> Option<Self> {
        match name {
            "contains" => Some(Self::Contains),
            "startswith" => Some(Self::Prefix),
            "endswith" => Some(Self::Suffix),
            "re" => Some(Self::Regex),
            _ => None,
        }
    }
}
