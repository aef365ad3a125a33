use crate::lexer::token::{Item, Token, TokenStream};
use crate::parser::error::ParseError;

/// Validates that two tokens can appear in sequence
pub fn valid_token_sequence(t1: Token, t2: Token) -> bool {
    match t2 {
        Token::KeywordAll | Token::KeywordCount => matches!(
            t1,
            Token::Begin
                | Token::SepLpar
                | Token::KeywordAnd
                | Token::KeywordOr
                | Token::KeywordNot
        ),
        Token::KeywordOf => matches!(t1, Token::KeywordAll | Token::KeywordCount),
        Token::IdentifierAll => matches!(t1, Token::KeywordOf),
        Token::Identifier | Token::IdentifierWithWildcard => matches!(
            t1,
            Token::SepLpar
                | Token::Begin
                | Token::KeywordAnd
                | Token::KeywordOr
                | Token::KeywordNot
                | Token::KeywordOf
        ),
        Token::KeywordAnd | Token::KeywordOr => matches!(
            t1,
            Token::Identifier
                | Token::IdentifierAll
                | Token::IdentifierWithWildcard
                | Token::SepRpar
        ),
        Token::KeywordNot => matches!(
            t1,
            Token::KeywordAnd
                | Token::KeywordOr
                | Token::KeywordNot
                | Token::SepLpar
                | Token::Begin
        ),
        Token::SepLpar => matches!(
            t1,
            Token::KeywordAnd
                | Token::KeywordOr
                | Token::KeywordNot
                | Token::Begin
                | Token::SepLpar
        ),
        Token::SepRpar | Token::LitEof => matches!(
            t1,
            Token::Identifier
                | Token::IdentifierAll
                | Token::IdentifierWithWildcard
                | Token::SepRpar
        ),
        Token::Unsupported | Token::Nil | Token::Begin => false,
    }
}

/// Walk the stream and reject malformed token sequences.
///
/// Fails on the first unsupported token, on the first illegal adjacency, as
/// soon as the parenthesis balance goes negative, and when the stream does
/// not end with the end marker.
pub fn validate(stream: &TokenStream) -> Result<(), ParseError> {
    validate_items(stream.items())
}

pub(crate) fn validate_items(items: &[Item]) -> Result<(), ParseError> {
    let mut prev = Item::new(Token::Begin, "", 0);
    let mut depth: usize = 0;

    for item in items {
        if item.token == Token::Unsupported {
            return Err(ParseError::unsupported_token(item));
        }
        if !valid_token_sequence(prev.token, item.token) {
            return Err(ParseError::invalid_sequence(&prev, item));
        }
        match item.token {
            Token::SepLpar => depth += 1,
            Token::SepRpar => {
                depth = depth.checked_sub(1).ok_or(ParseError::UnmatchedParenthesis {
                    position: item.position,
                })?;
            }
            _ => {}
        }
        prev = item.clone();
    }

    if prev.token != Token::LitEof {
        return Err(ParseError::IncompleteTokenSequence {
            expression: items
                .iter()
                .map(|i| i.value.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            last: prev,
        });
    }
    Ok(())
}
