use thiserror::Error;

/// Errors that can occur during lexing.
///
/// Unrecognized input is not an error at this stage; it is carried as an
/// [`Unsupported`](crate::lexer::Token::Unsupported) token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Condition produced more tokens than allowed
    #[error("token limit exceeded: limit {limit}")]
    TokenLimitExceeded {
        /// Maximum allowed tokens
        limit: usize,
    },
}
