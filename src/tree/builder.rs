use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::ast::{FieldRule, Keywords, Leaf, MatchNode, Selection};
use crate::config::Config;
use crate::parser::ParseError;
use crate::pattern::{coerce_pattern, new_string_matcher, IdentifierType, TextPatternModifier};
use crate::rule::SearchExpr;

/// Build the matcher for one search expression.
///
/// A selection given as a list of maps becomes an OR of one selection leaf
/// per map; every other expression becomes a single leaf.
pub fn build_leaf(expr: SearchExpr<'_>, config: &Config) -> Result<MatchNode, ParseError> {
    debug!(name = expr.name, kind = ?expr.kind, "building leaf");
    match expr.kind {
        IdentifierType::Selection => build_selection(expr.name, expr.content, config),
        IdentifierType::Keywords => build_keywords(expr.name, expr.content, config),
    }
}

fn build_selection(name: &str, content: &Value, config: &Config) -> Result<MatchNode, ParseError> {
    match content {
        Value::Object(fields) => {
            if fields.is_empty() {
                return Err(ParseError::invalid_selection(name, "selection has no fields"));
            }
            let fields = fields
                .iter()
                .map(|(key, value)| build_field_rule(name, key, value, config))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MatchNode::Leaf(Leaf::Selection(Selection {
                name: Arc::from(name),
                fields,
            })))
        }
        Value::Array(maps) if !maps.is_empty() => {
            let leaves = maps
                .iter()
                .map(|m| match m {
                    Value::Object(_) => build_selection(name, m, config),
                    other => Err(ParseError::invalid_selection(
                        name,
                        format!("list entry is a {}, expected a map", value_type(other)),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MatchNode::or(leaves))
        }
        other => Err(ParseError::invalid_selection(
            name,
            format!("expected a map of fields, found {}", value_type(other)),
        )),
    }
}

/// Split `Field|mod1|mod2` into the field name, the text modifier and the
/// `all` flag
fn parse_field_modifier(key: &str) -> Result<(&str, TextPatternModifier, bool), ParseError> {
    let mut parts = key.split('|');
    let field = parts.next().unwrap_or_default();
    let mut modifier = TextPatternModifier::None;
    let mut all = false;

    for part in parts {
        if part == "all" {
            all = true;
            continue;
        }
        match TextPatternModifier::from_modifier(part) {
            Some(m) if modifier == TextPatternModifier::None => modifier = m,
            _ => {
                return Err(ParseError::UnsupportedModifier {
                    field: field.to_string(),
                    modifier: part.to_string(),
                })
            }
        }
    }
    Ok((field, modifier, all))
}

fn build_field_rule(
    name: &str,
    key: &str,
    value: &Value,
    config: &Config,
) -> Result<FieldRule, ParseError> {
    let (field, modifier, all) = parse_field_modifier(key)?;
    if field.is_empty() {
        return Err(ParseError::invalid_selection(name, format!("empty field name in '{}'", key)));
    }

    let patterns = match value {
        Value::Array(items) if items.is_empty() => {
            return Err(ParseError::invalid_selection(
                name,
                format!("field '{}' has an empty value list", field),
            ))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_pattern(field, item))
            .collect::<Result<Vec<_>, _>>()?,
        scalar => vec![scalar_pattern(field, scalar)?],
    };

    let pattern_desc = patterns.join(" | ");
    let matcher = new_string_matcher(
        modifier,
        config.case_insensitive,
        all,
        config.no_collapse_ws,
        patterns,
    )?;
    Ok(FieldRule::new(field, matcher, pattern_desc))
}

fn scalar_pattern(field: &str, value: &Value) -> Result<String, ParseError> {
    coerce_pattern(value).ok_or_else(|| ParseError::UnsupportedValueType {
        name: field.to_string(),
        value_type: value_type(value).to_string(),
    })
}

fn build_keywords(name: &str, content: &Value, config: &Config) -> Result<MatchNode, ParseError> {
    let patterns = match content {
        Value::Array(items) if items.is_empty() => {
            return Err(ParseError::invalid_keyword(name, "keyword list is empty"))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| {
                coerce_pattern(item).ok_or_else(|| {
                    ParseError::invalid_keyword(
                        name,
                        format!("keyword entry is a {}, expected a scalar", value_type(item)),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::Object(_) | Value::Null => {
            return Err(ParseError::invalid_keyword(
                name,
                format!("expected a list of keywords, found {}", value_type(content)),
            ))
        }
        scalar => vec![coerce_pattern(scalar).unwrap_or_default()],
    };

    let count = patterns.len();
    let matcher = new_string_matcher(
        TextPatternModifier::Keyword,
        config.case_insensitive,
        false,
        config.no_collapse_ws,
        patterns,
    )?;
    Ok(MatchNode::Leaf(Leaf::Keywords(Keywords {
        name: Arc::from(name),
        matcher,
        count,
    })))
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
