use crate::lexer::error::LexError;
use crate::lexer::{
    token::{check_keyword, Token},
    Lexer,
};

/// States in the lexer state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// Main condition scanning state
    Condition,
    /// Accumulating a word up to the next delimiter
    Word,
    /// Left parenthesis found
    Lpar,
    /// Right parenthesis found
    Rpar,
    /// Processing whitespace
    Whitespace,
    /// Pipe found, the rest is an aggregation expression
    Pipe,
    /// End of input reached
    Eof,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '|')
}

impl<'a> Lexer<'a> {
    /// Main lexing state - dispatches on the next character
    pub fn lex_condition(&mut self) -> Result<Option<LexState>, LexError> {
        match self.next_char() {
            None => Ok(Some(LexState::Eof)),
            Some('(') => Ok(Some(LexState::Lpar)),
            Some(')') => Ok(Some(LexState::Rpar)),
            Some('|') => Ok(Some(LexState::Pipe)),
            Some(c) if c.is_whitespace() => Ok(Some(LexState::Whitespace)),
            Some(_) => Ok(Some(LexState::Word)),
        }
    }

    /// Accumulate a word and classify it
    pub fn lex_word(&mut self) -> Result<Option<LexState>, LexError> {
        loop {
            match self.next_char() {
                None => break,
                Some(c) if is_delimiter(c) => {
                    self.backup();
                    break;
                }
                Some(_) => continue,
            }
        }
        let token = check_keyword(self.collected());
        self.emit(token)?;
        Ok(Some(LexState::Condition))
    }

    /// Lex left parenthesis
    pub fn lex_lpar(&mut self) -> Result<Option<LexState>, LexError> {
        self.emit(Token::SepLpar)?;
        Ok(Some(LexState::Condition))
    }

    /// Lex right parenthesis
    pub fn lex_rpar(&mut self) -> Result<Option<LexState>, LexError> {
        self.emit(Token::SepRpar)?;
        Ok(Some(LexState::Condition))
    }

    /// Skip a run of whitespace
    pub fn lex_whitespace(&mut self) -> Result<Option<LexState>, LexError> {
        loop {
            match self.next_char() {
                None => {
                    self.ignore();
                    return Ok(Some(LexState::Eof));
                }
                Some(c) if !c.is_whitespace() => {
                    self.backup();
                    self.ignore();
                    return Ok(Some(LexState::Condition));
                }
                Some(_) => continue,
            }
        }
    }

    /// Aggregations are not supported: the pipe and everything after it
    /// become one unsupported token
    pub fn lex_pipe(&mut self) -> Result<Option<LexState>, LexError> {
        self.position = self.input.len();
        self.emit(Token::Unsupported)?;
        Ok(Some(LexState::Eof))
    }

    /// Lex end of input
    pub fn lex_eof(&mut self) -> Result<Option<LexState>, LexError> {
        self.ignore();
        self.emit(Token::LitEof)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_word_stops_at_paren() {
        let mut lexer = Lexer::new("sel)");
        let next = lexer.lex_condition().expect("condition state");
        assert_eq!(next, Some(LexState::Word));
        let next = lexer.lex_word().expect("word state");
        assert_eq!(next, Some(LexState::Condition));
        assert_eq!(lexer.items[0].token, Token::Identifier);
        assert_eq!(lexer.items[0].value, "sel");
    }

    #[test]
    fn test_lex_pipe_consumes_rest() {
        let mut lexer = Lexer::new("| count() > 5");
        lexer.lex_condition().expect("condition state");
        let next = lexer.lex_pipe().expect("pipe state");
        assert_eq!(next, Some(LexState::Eof));
        assert_eq!(lexer.items[0].token, Token::Unsupported);
        assert_eq!(lexer.items[0].value, "| count() > 5");
    }
}
