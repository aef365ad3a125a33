use pretty_assertions::assert_eq;
use rstest::rstest;
use sigma_tree::lexer::{token::Token, tokenize, Lexer};
use sigma_tree::parser::{find_groups, validate, ParseError};

#[rstest]
#[case("selection", vec![Token::Identifier, Token::LitEof])]
#[case(
    "selection_1 and not filter_0",
    vec![
        Token::Identifier,
        Token::KeywordAnd,
        Token::KeywordNot,
        Token::Identifier,
        Token::LitEof,
    ]
)]
#[case(
    "((selection_1 and not filter_0) OR (keyword_0 and not filter1)) or idontcare",
    vec![
        Token::SepLpar,
        Token::SepLpar,
        Token::Identifier,
        Token::KeywordAnd,
        Token::KeywordNot,
        Token::Identifier,
        Token::SepRpar,
        Token::Identifier,
        Token::SepLpar,
        Token::Identifier,
        Token::KeywordAnd,
        Token::KeywordNot,
        Token::Identifier,
        Token::SepRpar,
        Token::SepRpar,
        Token::KeywordOr,
        Token::Identifier,
        Token::LitEof,
    ]
)]
#[case(
    "all of selection* and not 1 of filter* | count() > 10",
    vec![
        Token::KeywordAll,
        Token::KeywordOf,
        Token::IdentifierWithWildcard,
        Token::KeywordAnd,
        Token::KeywordNot,
        Token::KeywordCount,
        Token::KeywordOf,
        Token::IdentifierWithWildcard,
        Token::Unsupported,
        Token::LitEof,
    ]
)]
#[case("all of them", vec![Token::KeywordAll, Token::KeywordOf, Token::IdentifierAll, Token::LitEof])]
#[case("12 of sel*", vec![Token::KeywordCount, Token::KeywordOf, Token::IdentifierWithWildcard, Token::LitEof])]
#[case("", vec![Token::LitEof])]
fn test_lexer_cases(#[case] expr: &str, #[case] expected: Vec<Token>) {
    let stream = tokenize(expr).unwrap();
    assert_eq!(stream.tokens(), expected, "condition: {expr}");
}

#[test]
fn test_stream_ends_with_single_eof() {
    let stream = tokenize("a or (b and c)").unwrap();
    let eofs = stream.iter().filter(|i| i.token == Token::LitEof).count();
    assert_eq!(eofs, 1);
    assert_eq!(stream.items().last().map(|i| i.token), Some(Token::LitEof));
    assert_eq!(stream.body().len(), stream.len() - 1);
}

#[test]
fn test_unsupported_token_carries_text() {
    let stream = tokenize("selection | near filter").unwrap();
    let unsupported = stream
        .iter()
        .find(|i| i.token == Token::Unsupported)
        .unwrap();
    assert_eq!(unsupported.value, "| near filter");
    assert_eq!(unsupported.position, 10);
}

#[test]
fn test_token_limit() {
    let condition = vec!["a"; 20].join(" or ");
    assert!(Lexer::with_max_tokens(&condition, 10).scan().is_err());
    assert!(Lexer::with_max_tokens(&condition, 100).scan().is_ok());
}

#[rstest]
#[case("selection keyword")]
#[case("all of 1 of")]
#[case("or and)")]
#[case("sel1 and and sel2")]
#[case("()")]
#[case("not")]
#[case("sel1 not sel2")]
#[case("all sel*")]
#[case("them")]
fn test_invalid_sequences_rejected(#[case] expr: &str) {
    let stream = tokenize(expr).unwrap();
    assert!(validate(&stream).is_err(), "accepted: {expr}");
}

#[rstest]
#[case("sel1")]
#[case("not not sel1")]
#[case("sel1 and not (sel2 or sel3)")]
#[case("1 of them and all of filter*")]
#[case("(((a)))")]
#[case("all of selection")]
fn test_valid_sequences_accepted(#[case] expr: &str) {
    let stream = tokenize(expr).unwrap();
    validate(&stream).unwrap();
}

#[test]
fn test_aggregation_is_unsupported() {
    let stream = tokenize("sel1 and sel2 | count() > 3").unwrap();
    assert!(matches!(
        validate(&stream),
        Err(ParseError::UnsupportedToken { .. })
    ));
}

#[test]
fn test_invalid_sequence_carries_position() {
    let stream = tokenize("sel1 and or sel2").unwrap();
    match validate(&stream) {
        Err(ParseError::InvalidTokenSequence { prev, next, position }) => {
            assert_eq!(prev.token, Token::KeywordAnd);
            assert_eq!(next.token, Token::KeywordOr);
            assert_eq!(position, 9);
        }
        other => panic!("expected invalid sequence, got {other:?}"),
    }
}

#[test]
fn test_group_spans() {
    let stream = tokenize("(a or (b)) and (c)").unwrap();
    let (spans, found) = find_groups(stream.body()).unwrap();
    assert!(found);
    let offsets: Vec<(usize, usize, usize)> = spans
        .iter()
        .map(|s| (s.start_offset, s.end_offset, s.depth))
        .collect();
    assert_eq!(offsets, vec![(0, 6, 0), (3, 5, 1), (8, 10, 0)]);
}

#[test]
fn test_group_errors_carry_position() {
    let stream = tokenize("a and (b or c").unwrap();
    assert_eq!(
        find_groups(stream.body()).unwrap_err(),
        ParseError::UnexpectedEndOfCondition { position: 6 }
    );

    let stream = tokenize("a) or (b").unwrap();
    assert_eq!(
        find_groups(stream.body()).unwrap_err(),
        ParseError::UnmatchedParenthesis { position: 1 }
    );
}
