use crate::ast::{MatchNode, QuantifierKind};
use crate::config::Config;
use crate::lexer::token::{Item, Token, TokenStream};
use crate::lexer::tokenize;
use crate::rule::Detection;
use crate::tree::builder::build_leaf;
use tracing::{debug, trace};

/// Parser error types
pub mod error;
/// Parenthesis group discovery
pub mod group;
/// Token sequence validation
pub mod validate;

pub use error::{ErrorClass, ParseError};
pub use group::{find_groups, GroupSpan};
pub use validate::{valid_token_sequence, validate};

/// Maximum recursion depth for nested expressions
pub const MAX_RECURSION_DEPTH: usize = 50;

/// Compile the condition stored in `detection` into a matching tree
pub fn compile(detection: &Detection, config: &Config) -> Result<MatchNode, ParseError> {
    let condition = detection.condition().ok_or(ParseError::MissingCondition)?;
    Parser::new(detection, config).run(condition)
}

/// Compile an explicit condition string against `detection`
pub fn compile_condition(
    condition: &str,
    detection: &Detection,
    config: &Config,
) -> Result<MatchNode, ParseError> {
    Parser::new(detection, config).run(condition)
}

/// Build a matching tree from a stream that already passed [`validate`]
pub fn parse(
    stream: &TokenStream,
    detection: &Detection,
    config: &Config,
) -> Result<MatchNode, ParseError> {
    Parser::new(detection, config).parse_tokens(stream.body(), 0)
}

/// Condition parser bound to one detection.
///
/// The detection is only borrowed for the duration of compilation; the
/// resulting tree owns everything it needs.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    detection: &'a Detection,
    config: &'a Config,
    max_depth: usize,
}

/// Operand or operator after group substitution
#[derive(Debug)]
enum Element<'t> {
    Token(&'t Item),
    Group(MatchNode),
}

impl<'a> Parser<'a> {
    /// Create a new parser with the default recursion limit
    pub fn new(detection: &'a Detection, config: &'a Config) -> Self {
        Self {
            detection,
            config,
            max_depth: MAX_RECURSION_DEPTH,
        }
    }

    /// Override the group nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Lex, validate and parse `condition`
    pub fn run(&self, condition: &str) -> Result<MatchNode, ParseError> {
        if condition.trim().is_empty() {
            return Err(ParseError::EmptyCondition);
        }

        // Pass 1: tokens and grammar adjacency
        let stream = tokenize(condition)?;
        validate(&stream)?;

        // Pass 2: tree
        let tree = self.parse_tokens(stream.body(), 0)?;
        debug!(
            condition,
            tokens = stream.len(),
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "compiled condition"
        );
        Ok(tree)
    }

    /// Build the tree for a token slice that contains no end marker
    fn parse_tokens(&self, items: &[Item], depth: usize) -> Result<MatchNode, ParseError> {
        if depth > self.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                current: depth,
                limit: self.max_depth,
            });
        }

        let elements = self.substitute_groups(items, depth)?;
        self.reduce(elements)
    }

    /// Replace every top-level group with its compiled subtree
    fn substitute_groups<'t>(
        &self,
        items: &'t [Item],
        depth: usize,
    ) -> Result<Vec<Element<'t>>, ParseError> {
        let (spans, found) = find_groups(items)?;
        if !found {
            return Ok(items.iter().map(Element::Token).collect());
        }

        let mut elements = Vec::with_capacity(items.len());
        let mut cursor = 0;
        for span in group::top_level(&spans) {
            trace!(
                start = span.start_offset,
                end = span.end_offset,
                depth,
                "resolving group"
            );
            elements.extend(items[cursor..span.start_offset].iter().map(Element::Token));
            let inner = &items[span.inner()];
            elements.push(Element::Group(self.parse_tokens(inner, depth + 1)?));
            cursor = span.end_offset + 1;
        }
        elements.extend(items[cursor..].iter().map(Element::Token));
        Ok(elements)
    }

    /// Left-to-right reduction of a flat element list.
    ///
    /// `not` binds to the next operand, adjacent `and` operands fold first and
    /// the resulting runs are joined by `or`.
    fn reduce(&self, elements: Vec<Element<'_>>) -> Result<MatchNode, ParseError> {
        let mut operands: Vec<(Token, MatchNode)> = Vec::new();
        let mut operator = Token::Nil;
        let mut negated = false;

        let mut iter = elements.into_iter();
        while let Some(element) = iter.next() {
            let item = match element {
                Element::Group(node) => {
                    operands.push((operator, node.negate_if(negated)));
                    operator = Token::Nil;
                    negated = false;
                    continue;
                }
                Element::Token(item) => item,
            };

            let node = match item.token {
                Token::KeywordNot => {
                    negated = !negated;
                    continue;
                }
                Token::KeywordAnd | Token::KeywordOr => {
                    operator = item.token;
                    continue;
                }
                Token::Identifier => self.identifier(item)?,
                Token::IdentifierWithWildcard => {
                    let children = self.leaves_for(&self.wildcard_names(item)?)?;
                    MatchNode::or(children)
                }
                Token::KeywordAll | Token::KeywordCount => {
                    let of = next_token(&mut iter, item)?;
                    if of.token != Token::KeywordOf {
                        return Err(invalid_quantifier(item));
                    }
                    let target = next_token(&mut iter, of)?;
                    self.quantifier(item, target)?
                }
                Token::SepLpar | Token::SepRpar => {
                    return Err(ParseError::UnmatchedParenthesis {
                        position: item.position,
                    })
                }
                _ => return Err(ParseError::unsupported_token(item)),
            };

            operands.push((operator, node.negate_if(negated)));
            operator = Token::Nil;
            negated = false;
        }

        fold(operands)
    }

    fn identifier(&self, item: &Item) -> Result<MatchNode, ParseError> {
        let expr = self
            .detection
            .get(&item.value)
            .ok_or_else(|| ParseError::missing_condition_item(&item.value))?;
        build_leaf(expr, self.config)
    }

    /// Detection names matching a wildcard identifier, in name order
    fn wildcard_names(&self, item: &Item) -> Result<Vec<&'a str>, ParseError> {
        let pattern =
            glob::Pattern::new(&item.value).map_err(|e| ParseError::InvalidGlobPattern {
                pattern: item.value.clone(),
                error: e.to_string(),
            })?;
        let names: Vec<&str> = self
            .detection
            .names()
            .filter(|name| pattern.matches(name))
            .collect();
        if names.is_empty() {
            return Err(ParseError::NoMatchingWildcard {
                pattern: item.value.clone(),
            });
        }
        trace!(pattern = %item.value, matched = names.len(), "expanded wildcard");
        Ok(names)
    }

    fn leaves_for(&self, names: &[&str]) -> Result<Vec<MatchNode>, ParseError> {
        names
            .iter()
            .map(|name| {
                let expr = self
                    .detection
                    .get(name)
                    .ok_or_else(|| ParseError::missing_condition_item(*name))?;
                build_leaf(expr, self.config)
            })
            .collect()
    }

    /// `all of X` / `N of X` where X is `them`, a name or a name glob
    fn quantifier(&self, head: &Item, target: &Item) -> Result<MatchNode, ParseError> {
        let kind = match head.token {
            Token::KeywordAll => QuantifierKind::All,
            _ => match head.value.parse::<usize>() {
                Ok(n) if n > 0 => QuantifierKind::AtLeast(n),
                _ => return Err(invalid_quantifier(head)),
            },
        };

        let names: Vec<&str> = match target.token {
            Token::IdentifierAll => self.detection.names().collect(),
            Token::IdentifierWithWildcard => self.wildcard_names(target)?,
            Token::Identifier => {
                if !self.detection.contains_key(&target.value) {
                    return Err(ParseError::missing_condition_item(&target.value));
                }
                vec![target.value.as_str()]
            }
            _ => return Err(invalid_quantifier(target)),
        };
        if names.is_empty() {
            return Err(ParseError::NoMatchingWildcard {
                pattern: target.value.clone(),
            });
        }
        if let QuantifierKind::AtLeast(required) = kind {
            if required > names.len() {
                return Err(ParseError::QuantifierUnsatisfiable {
                    pattern: target.value.clone(),
                    required,
                    available: names.len(),
                });
            }
        }

        Ok(MatchNode::Quantifier {
            kind,
            pattern: target.value.clone(),
            children: self.leaves_for(&names)?,
        })
    }
}

/// Group operands into AND runs split at every `or`, then OR the runs
fn fold(operands: Vec<(Token, MatchNode)>) -> Result<MatchNode, ParseError> {
    if operands.is_empty() {
        return Err(ParseError::EmptyCondition);
    }

    let mut or_branches = Vec::new();
    let mut and_branches = Vec::new();
    for (operator, node) in operands {
        if operator == Token::KeywordOr && !and_branches.is_empty() {
            or_branches.push(MatchNode::and(std::mem::take(&mut and_branches)));
        }
        and_branches.push(node);
    }
    or_branches.push(MatchNode::and(and_branches));
    Ok(MatchNode::or(or_branches))
}

fn next_token<'t>(
    iter: &mut impl Iterator<Item = Element<'t>>,
    after: &Item,
) -> Result<&'t Item, ParseError> {
    match iter.next() {
        Some(Element::Token(item)) => Ok(item),
        _ => Err(invalid_quantifier(after)),
    }
}

fn invalid_quantifier(item: &Item) -> ParseError {
    ParseError::InvalidQuantifier {
        value: item.value.clone(),
        position: item.position,
    }
}
