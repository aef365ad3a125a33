use std::fmt;

/// Token types in Sigma condition expressions
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Helpers for internal stuff
    /// Unrecognized input, carried through to the validator
    Unsupported = 0,
    /// Neutral placeholder for an operand with no preceding operator
    Nil = 1,
    /// Virtual start-of-stream marker used by the validator
    Begin = 2,

    // User-defined word
    /// Regular identifier
    Identifier = 3,
    /// Identifier containing wildcards
    IdentifierWithWildcard = 4,
    /// Special identifier "them"
    IdentifierAll = 5,

    // Literals
    /// End of input literal
    LitEof = 6,

    // Separators
    /// Left parenthesis separator
    SepLpar = 7,
    /// Right parenthesis separator
    SepRpar = 8,

    // Keywords
    /// AND keyword
    KeywordAnd = 9,
    /// OR keyword
    KeywordOr = 10,
    /// NOT keyword
    KeywordNot = 11,
    /// "all" quantifier keyword
    KeywordAll = 12,
    /// "of" quantifier keyword
    KeywordOf = 13,
    /// Numeric quantifier such as the `1` in `1 of`
    KeywordCount = 14,
}

impl Token {
    /// Get the literal representation of the token
    pub fn literal(&self) -> &'static str {
        match self {
            Token::Identifier | Token::IdentifierWithWildcard => "identifier",
            Token::IdentifierAll => "them",
            Token::SepLpar => "(",
            Token::SepRpar => ")",
            Token::KeywordAnd => "and",
            Token::KeywordOr => "or",
            Token::KeywordNot => "not",
            Token::KeywordAll => "all",
            Token::KeywordOf => "of",
            Token::KeywordCount => "N",
            Token::LitEof | Token::Nil | Token::Begin => "",
            Token::Unsupported => "unsupported",
        }
    }

    /// Tokens that can stand as an operand on their own
    pub fn is_operand(&self) -> bool {
        matches!(
            self,
            Token::Identifier | Token::IdentifierWithWildcard | Token::IdentifierAll
        )
    }

    /// Tokens that open a quantifier statement
    pub fn is_quantifier(&self) -> bool {
        matches!(self, Token::KeywordAll | Token::KeywordCount)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LitEof => write!(f, "end of condition"),
            Token::Begin => write!(f, "start of condition"),
            Token::Nil => write!(f, "nil"),
            other => write!(f, "{}", other.literal()),
        }
    }
}

/// Lexical token with its value and byte offset in the condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The token type
    pub token: Token,
    /// The token value
    pub value: String,
    /// Byte offset of the first character of the token
    pub position: usize,
}

impl Item {
    /// Create a new item
    pub fn new(token: Token, value: impl Into<String>, position: usize) -> Self {
        Self {
            token,
            value: value.into(),
            position,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{} at {}", self.token, self.position)
        } else {
            write!(f, "'{}' at {}", self.value, self.position)
        }
    }
}

/// Ordered token sequence produced by the lexer.
///
/// Holds exactly one [`Token::LitEof`] and it is always the last item, so the
/// stream is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    items: Vec<Item>,
}

impl TokenStream {
    /// Wrap lexer output, appending the end marker when absent
    pub(crate) fn new(mut items: Vec<Item>, input_len: usize) -> Self {
        items.retain(|i| i.token != Token::LitEof);
        items.push(Item::new(Token::LitEof, "", input_len));
        Self { items }
    }

    /// All items including the trailing end marker
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items without the trailing end marker
    pub fn body(&self) -> &[Item] {
        &self.items[..self.items.len().saturating_sub(1)]
    }

    /// Number of items including the end marker
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the stream holds nothing but the end marker
    pub fn is_empty(&self) -> bool {
        self.items.len() <= 1
    }

    /// Token kinds in order
    pub fn tokens(&self) -> Vec<Token> {
        self.items.iter().map(|i| i.token).collect()
    }

    /// Iterate over the items
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Classify one whitespace-delimited word of a condition
pub fn check_keyword(input: &str) -> Token {
    if input.is_empty() {
        return Token::Nil;
    }

    match input {
        "and" => Token::KeywordAnd,
        "or" => Token::KeywordOr,
        "not" => Token::KeywordNot,
        "all" => Token::KeywordAll,
        "of" => Token::KeywordOf,
        "them" => Token::IdentifierAll,
        _ if is_count(input) => Token::KeywordCount,
        _ if input.chars().all(is_identifier_char) => {
            if input.contains('*') {
                Token::IdentifierWithWildcard
            } else {
                Token::Identifier
            }
        }
        _ => Token::Unsupported,
    }
}

/// Characters permitted inside an identifier
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '*')
}

fn is_count(input: &str) -> bool {
    input.bytes().all(|b| b.is_ascii_digit()) && input.parse::<u64>().map_or(false, |n| n > 0)
}
