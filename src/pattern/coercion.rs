//! Type coercion for Sigma pattern matching
//!
//! Event values are matched as strings. Scalars are rendered the way they
//! appear in rule files, arrays match when any element matches, and objects
//! or nulls never match.

use crate::event::Value;
use crate::pattern::traits::StringMatcher;
use std::borrow::Cow;

/// Render a scalar event value for string matching
pub fn coerce_for_string_match(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(&**s)),
        Value::Integer(i) => Some(Cow::Owned(i.to_string())),
        Value::UInt(u) => Some(Cow::Owned(u.to_string())),
        // same text serde_json gives the rule side, so 1.0 stays "1.0"
        Value::Float(f) => Some(Cow::Owned(
            serde_json::Number::from_f64(*f).map_or_else(|| f.to_string(), |n| n.to_string()),
        )),
        Value::Boolean(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Array(_) | Value::Object(_) | Value::Null => None,
    }
}

/// Render a rule-file scalar as a pattern string
pub fn coerce_pattern(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Match an event value, descending into arrays
pub fn value_matches(value: &Value, matcher: &dyn StringMatcher) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| value_matches(item, matcher)),
        other => coerce_for_string_match(other).map_or(false, |s| matcher.string_match(&s)),
    }
}
