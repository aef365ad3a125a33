use crate::lexer::error::LexError;
use crate::lexer::token::Item;
use thiserror::Error;

/// How a rule that failed to compile should be treated by a batch loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The rule uses a construct this engine does not implement
    Unsupported,
    /// The rule itself is malformed
    Broken,
}

/// Compile error for a single condition or search expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Lexer failed before producing a stream
    #[error("lexer error: {0}")]
    Lexer(#[from] LexError),

    /// Condition string is empty or only whitespace
    #[error("empty condition")]
    EmptyCondition,

    /// Condition is missing from detection section
    #[error("missing condition in detection")]
    MissingCondition,

    /// Token type is not supported in this context
    #[error("unsupported token '{value}' at position {position}")]
    UnsupportedToken {
        /// Raw text of the unsupported token
        value: String,
        /// Byte offset in the condition
        position: usize,
    },

    /// Invalid sequence of tokens found
    #[error("invalid token sequence at position {position}: {prev} -> {next}")]
    InvalidTokenSequence {
        /// Previous token in the sequence
        prev: Item,
        /// Next token that caused the invalid sequence
        next: Item,
        /// Byte offset of `next` in the condition
        position: usize,
    },

    /// Token sequence does not end with the end marker
    #[error("incomplete token sequence in expression '{expression}', last token: {last}")]
    IncompleteTokenSequence {
        /// Expression being parsed
        expression: String,
        /// Last token received
        last: Item,
    },

    /// A closing parenthesis without an opening one
    #[error("unmatched closing parenthesis at position {position}")]
    UnmatchedParenthesis {
        /// Byte offset of the offending parenthesis
        position: usize,
    },

    /// An opening parenthesis that is never closed
    #[error("unexpected end of condition, parenthesis opened at position {position} is not closed")]
    UnexpectedEndOfCondition {
        /// Byte offset of the unclosed parenthesis
        position: usize,
    },

    /// Referenced condition item is missing
    #[error("missing condition item: {key}")]
    MissingConditionItem {
        /// Key of the missing condition item
        key: String,
    },

    /// No detection name matched a wildcard identifier
    #[error("no detection item matches wildcard '{pattern}'")]
    NoMatchingWildcard {
        /// The wildcard pattern
        pattern: String,
    },

    /// `N of` asks for more items than the pattern can ever match
    #[error("quantifier requires {required} of '{pattern}' but only {available} match")]
    QuantifierUnsatisfiable {
        /// The name pattern
        pattern: String,
        /// Requested threshold
        required: usize,
        /// Number of matching names
        available: usize,
    },

    /// Quantifier keyword without a usable target
    #[error("invalid quantifier '{value}' at position {position}")]
    InvalidQuantifier {
        /// Raw text of the offending token
        value: String,
        /// Byte offset in the condition
        position: usize,
    },

    /// Field modifier is not implemented
    #[error("unsupported modifier '{modifier}' on field '{field}'")]
    UnsupportedModifier {
        /// Field the modifier is attached to
        field: String,
        /// The modifier
        modifier: String,
    },

    /// Value type is not supported
    #[error("unsupported value type {value_type} in '{name}'")]
    UnsupportedValueType {
        /// Search expression or field name
        name: String,
        /// The unsupported value type
        value_type: String,
    },

    /// Keyword construct is invalid
    #[error("invalid keyword construct '{name}': {reason}")]
    InvalidKeywordConstruct {
        /// Search expression name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Selection construct is invalid
    #[error("invalid selection construct '{name}': {reason}")]
    InvalidSelectionConstruct {
        /// Search expression name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Regular expression failed to compile
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        /// The regex pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Glob pattern is invalid
    #[error("invalid glob pattern: {pattern}, error: {error}")]
    InvalidGlobPattern {
        /// The invalid pattern
        pattern: String,
        /// Error description
        error: String,
    },

    /// Recursion depth limit exceeded during parsing
    #[error("recursion depth limit exceeded: {current} levels, limit: {limit}")]
    RecursionLimitExceeded {
        /// Current recursion depth
        current: usize,
        /// Maximum allowed depth
        limit: usize,
    },
}

impl ParseError {
    /// Create an unsupported token error
    pub fn unsupported_token(item: &Item) -> Self {
        Self::UnsupportedToken {
            value: item.value.clone(),
            position: item.position,
        }
    }

    /// Create an invalid sequence error
    pub fn invalid_sequence(prev: &Item, next: &Item) -> Self {
        Self::InvalidTokenSequence {
            prev: prev.clone(),
            next: next.clone(),
            position: next.position,
        }
    }

    /// Create a missing condition item error
    pub fn missing_condition_item(key: impl Into<String>) -> Self {
        Self::MissingConditionItem { key: key.into() }
    }

    /// Create an invalid selection error
    pub fn invalid_selection(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelectionConstruct {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid keyword error
    pub fn invalid_keyword(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKeywordConstruct {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error for batch loading.
    ///
    /// Unsupported errors name constructs the engine does not implement or
    /// detections the engine cannot complete; everything else is a broken rule.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedToken { .. }
            | Self::MissingConditionItem { .. }
            | Self::UnsupportedModifier { .. }
            | Self::UnsupportedValueType { .. } => ErrorClass::Unsupported,
            Self::Lexer(_)
            | Self::EmptyCondition
            | Self::MissingCondition
            | Self::InvalidTokenSequence { .. }
            | Self::IncompleteTokenSequence { .. }
            | Self::UnmatchedParenthesis { .. }
            | Self::UnexpectedEndOfCondition { .. }
            | Self::NoMatchingWildcard { .. }
            | Self::QuantifierUnsatisfiable { .. }
            | Self::InvalidQuantifier { .. }
            | Self::InvalidKeywordConstruct { .. }
            | Self::InvalidSelectionConstruct { .. }
            | Self::InvalidRegex { .. }
            | Self::InvalidGlobPattern { .. }
            | Self::RecursionLimitExceeded { .. } => ErrorClass::Broken,
        }
    }

    /// Shorthand for `class() == ErrorClass::Unsupported`
    pub fn is_unsupported(&self) -> bool {
        self.class() == ErrorClass::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::token::Token;

    #[test]
    fn test_unsupported_classification() {
        let item = Item::new(Token::Unsupported, "| count() > 5", 10);
        assert_eq!(
            ParseError::unsupported_token(&item).class(),
            ErrorClass::Unsupported
        );
        assert!(ParseError::missing_condition_item("filter").is_unsupported());
        assert!(ParseError::UnsupportedModifier {
            field: "Image".into(),
            modifier: "base64".into()
        }
        .is_unsupported());
    }

    #[test]
    fn test_broken_classification() {
        assert_eq!(ParseError::EmptyCondition.class(), ErrorClass::Broken);
        assert_eq!(
            ParseError::UnmatchedParenthesis { position: 3 }.class(),
            ErrorClass::Broken
        );
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err = ParseError::InvalidRegex {
            pattern: "(".into(),
            source: regex_err,
        };
        assert_eq!(err.class(), ErrorClass::Broken);
        assert!(err.to_string().contains("invalid regex '('"));
    }

    #[test]
    fn test_error_messages_carry_context() {
        let prev = Item::new(Token::Identifier, "sel1", 0);
        let next = Item::new(Token::Identifier, "sel2", 5);
        let err = ParseError::invalid_sequence(&prev, &next);
        assert_eq!(
            err.to_string(),
            "invalid token sequence: 'sel1' at 0 -> 'sel2' at 5"
        );
    }
}
