//! Lexical analysis module

/// Error types for lexer operations
pub mod error;
/// Lexer state management
pub mod state;
/// Token definitions and utilities
pub mod token;

pub use error::LexError;
pub use state::LexState;
pub use token::{Item, Token, TokenStream};

use tracing::debug;

/// Default upper bound on the number of tokens in one condition
pub const DEFAULT_MAX_TOKENS: usize = 10_000;

/// Tokenize a condition string with the default token limit
pub fn tokenize(condition: &str) -> Result<TokenStream, LexError> {
    Lexer::new(condition).scan()
}

/// Lexer for Sigma condition strings
/// Converts input string into a stream of tokens
pub struct Lexer<'a> {
    input: &'a str,
    start: usize,
    position: usize,
    width: usize,
    items: Vec<Item>,
    max_tokens: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer with the default token limit
    pub fn new(input: &'a str) -> Self {
        Self::with_max_tokens(input, DEFAULT_MAX_TOKENS)
    }

    /// Create a new lexer with a specific token limit
    pub fn with_max_tokens(input: &'a str, max_tokens: usize) -> Self {
        Lexer {
            input,
            start: 0,
            position: 0,
            width: 0,
            items: Vec::new(),
            max_tokens,
        }
    }

    /// Run the state machine to completion
    pub fn scan(mut self) -> Result<TokenStream, LexError> {
        let mut state = Some(LexState::Condition);
        while let Some(s) = state {
            state = self.process_state(s)?;
        }
        debug!(
            tokens = self.items.len(),
            condition = self.input,
            "condition tokenized"
        );
        Ok(TokenStream::new(self.items, self.input.len()))
    }

    /// Process the current state and return the next state
    fn process_state(&mut self, state: LexState) -> Result<Option<LexState>, LexError> {
        match state {
            LexState::Condition => self.lex_condition(),
            LexState::Word => self.lex_word(),
            LexState::Lpar => self.lex_lpar(),
            LexState::Rpar => self.lex_rpar(),
            LexState::Whitespace => self.lex_whitespace(),
            LexState::Pipe => self.lex_pipe(),
            LexState::Eof => self.lex_eof(),
        }
    }

    /// Get the next character from the input
    fn next_char(&mut self) -> Option<char> {
        match self.remaining().chars().next() {
            Some(ch) => {
                self.width = ch.len_utf8();
                self.position += self.width;
                Some(ch)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    /// Back up one character
    fn backup(&mut self) {
        if self.position > 0 && self.width > 0 {
            self.position = self.position.saturating_sub(self.width);
            self.width = 0;
        }
    }

    /// Ignore characters up to current position
    fn ignore(&mut self) {
        self.start = self.position;
    }

    /// Get the collected string from start to current position
    fn collected(&self) -> &'a str {
        &self.input[self.start..self.position]
    }

    /// Get the remaining string from current position
    fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Emit a token with the collected value
    fn emit(&mut self, token: Token) -> Result<(), LexError> {
        if self.items.len() >= self.max_tokens {
            return Err(LexError::TokenLimitExceeded {
                limit: self.max_tokens,
            });
        }
        let item = Item::new(token, self.collected(), self.start);
        self.items.push(item);
        self.ignore();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_creation() {
        let lexer = Lexer::new("test");
        assert_eq!(lexer.position, 0);
        assert_eq!(lexer.start, 0);
        assert_eq!(lexer.input, "test");
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let stream = tokenize("a and (b)").unwrap();
        let positions: Vec<usize> = stream.iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![0, 2, 6, 7, 8, 9]);
    }

    #[test]
    fn test_token_limit() {
        let condition = vec!["a"; 20].join(" or ");
        let result = Lexer::with_max_tokens(&condition, 10).scan();
        assert!(matches!(
            result,
            Err(LexError::TokenLimitExceeded { limit: 10 })
        ));
    }

    #[test]
    fn test_multibyte_identifier() {
        let stream = tokenize("auswahl_ä or b").unwrap();
        assert_eq!(stream.items()[0].value, "auswahl_ä");
        assert_eq!(stream.items()[1].position, "auswahl_ä ".len());
    }
}
