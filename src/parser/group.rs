//! Parenthesis group discovery

use crate::lexer::token::{Item, Token};
use crate::parser::error::ParseError;

/// A balanced-parenthesis region of a token slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpan {
    /// Index of the opening parenthesis
    pub start_offset: usize,
    /// Index of the matching closing parenthesis
    pub end_offset: usize,
    /// Nesting depth, 0 for top-level groups
    pub depth: usize,
}

impl GroupSpan {
    /// Index range of the tokens strictly inside the parentheses
    pub fn inner(&self) -> std::ops::Range<usize> {
        self.start_offset + 1..self.end_offset
    }

    /// True for groups not nested in another group
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }
}

/// Find every parenthesized group in `items`, ordered by opening offset.
///
/// The boolean is true when at least one group was found. A closing
/// parenthesis with no opener and an opener that is never closed are both
/// errors carrying the offending byte position.
pub fn find_groups(items: &[Item]) -> Result<(Vec<GroupSpan>, bool), ParseError> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans = Vec::new();

    for (offset, item) in items.iter().enumerate() {
        match item.token {
            Token::SepLpar => open.push(offset),
            Token::SepRpar => {
                let start_offset = open.pop().ok_or(ParseError::UnmatchedParenthesis {
                    position: item.position,
                })?;
                spans.push(GroupSpan {
                    start_offset,
                    end_offset: offset,
                    depth: open.len(),
                });
            }
            _ => {}
        }
    }

    if let Some(&unclosed) = open.first() {
        return Err(ParseError::UnexpectedEndOfCondition {
            position: items[unclosed].position,
        });
    }

    spans.sort_by_key(|s| s.start_offset);
    let found = !spans.is_empty();
    Ok((spans, found))
}

/// Only the groups not nested inside another group
pub fn top_level(spans: &[GroupSpan]) -> impl Iterator<Item = &GroupSpan> {
    spans.iter().filter(|s| s.is_top_level())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn groups(condition: &str) -> Result<(Vec<GroupSpan>, bool), ParseError> {
        let stream = tokenize(condition).unwrap();
        find_groups(stream.items())
    }

    #[test]
    fn test_no_groups() {
        let (spans, found) = groups("a and b").unwrap();
        assert!(spans.is_empty());
        assert!(!found);
    }

    #[test]
    fn test_sibling_groups() {
        let (spans, found) = groups("(a or b) and (c or d)").unwrap();
        assert!(found);
        assert_eq!(
            spans,
            vec![
                GroupSpan {
                    start_offset: 0,
                    end_offset: 4,
                    depth: 0
                },
                GroupSpan {
                    start_offset: 6,
                    end_offset: 10,
                    depth: 0
                },
            ]
        );
    }

    #[test]
    fn test_nested_groups_record_depth() {
        let (spans, _) = groups("(a and (b or (c)))").unwrap();
        let depths: Vec<usize> = spans.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(top_level(&spans).count(), 1);
        assert_eq!(spans[0].inner(), 1..10);
    }

    #[test]
    fn test_unclosed_group() {
        assert_eq!(
            groups("a and (b or c").unwrap_err(),
            ParseError::UnexpectedEndOfCondition { position: 6 }
        );
    }

    #[test]
    fn test_unmatched_close() {
        assert_eq!(
            groups("a) and (b").unwrap_err(),
            ParseError::UnmatchedParenthesis { position: 1 }
        );
    }
}
