//! Compiled matching tree
//!
//! Boolean nodes live in [`nodes`]; this module holds the leaf matchers that
//! inspect event data directly.

use crate::event::Event;
use crate::pattern::{value_matches, StringMatcher};
use std::fmt::Debug;
use std::sync::Arc;

/// AST node implementations
pub mod nodes;
pub use nodes::*;

/// Base trait for all tree nodes
pub trait Branch: Debug + Send + Sync {
    /// Match the node against an event
    fn matches(&self, event: &dyn Event) -> bool;

    /// Get a human-readable description of the node
    fn describe(&self) -> String;
}

/// One field of a selection: the event value must match the field's patterns
#[derive(Debug)]
pub struct FieldRule {
    /// The field name to match against
    pub field: Arc<str>,
    /// Patterns for this field, already combined with OR (or AND for `|all`)
    pub matcher: Box<dyn StringMatcher>,
    /// Human-readable description of the patterns
    pub pattern_desc: Arc<str>,
}

impl FieldRule {
    /// Create a new field rule
    pub fn new(field: impl Into<Arc<str>>, matcher: Box<dyn StringMatcher>, pattern_desc: impl Into<Arc<str>>) -> Self {
        Self {
            field: field.into(),
            matcher,
            pattern_desc: pattern_desc.into(),
        }
    }
}

impl Branch for FieldRule {
    /// A missing field never matches
    fn matches(&self, event: &dyn Event) -> bool {
        match event.select(&self.field) {
            (Some(value), true) => value_matches(&value, self.matcher.as_ref()),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        format!("{} = {}", self.field, self.pattern_desc)
    }
}

/// Field map matcher: every field must match
#[derive(Debug)]
pub struct Selection {
    /// Search expression name
    pub name: Arc<str>,
    /// Field rules, ANDed
    pub fields: Vec<FieldRule>,
}

impl Branch for Selection {
    fn matches(&self, event: &dyn Event) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(|f| f.matches(event))
    }

    fn describe(&self) -> String {
        let fields: Vec<String> = self.fields.iter().map(|f| f.describe()).collect();
        format!("{}{{{}}}", self.name, fields.join(", "))
    }
}

/// Keyword list matcher over the event's message strings
#[derive(Debug)]
pub struct Keywords {
    /// Search expression name
    pub name: Arc<str>,
    /// Keyword patterns, ORed
    pub matcher: Box<dyn StringMatcher>,
    /// Number of patterns
    pub count: usize,
}

impl Branch for Keywords {
    fn matches(&self, event: &dyn Event) -> bool {
        let (messages, applicable) = event.keywords();
        applicable && messages.iter().any(|m| self.matcher.string_match(m))
    }

    fn describe(&self) -> String {
        format!("{}[{} keywords]", self.name, self.count)
    }
}

/// Terminal node of the tree
#[derive(Debug)]
pub enum Leaf {
    /// Field map matcher
    Selection(Selection),
    /// Keyword list matcher
    Keywords(Keywords),
}

impl Leaf {
    /// Name of the search expression this leaf was built from
    pub fn name(&self) -> &str {
        match self {
            Leaf::Selection(s) => &s.name,
            Leaf::Keywords(k) => &k.name,
        }
    }
}

impl Branch for Leaf {
    fn matches(&self, event: &dyn Event) -> bool {
        match self {
            Leaf::Selection(s) => s.matches(event),
            Leaf::Keywords(k) => k.matches(event),
        }
    }

    fn describe(&self) -> String {
        match self {
            Leaf::Selection(s) => s.describe(),
            Leaf::Keywords(k) => k.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{new_string_matcher, TextPatternModifier};
    use std::collections::HashMap;

    fn field(name: &str, patterns: &[&str]) -> FieldRule {
        let matcher = new_string_matcher(
            TextPatternModifier::None,
            false,
            false,
            false,
            patterns.iter().map(|p| p.to_string()).collect(),
        )
        .unwrap();
        FieldRule::new(name, matcher, patterns.join("|"))
    }

    fn event(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_selection_fields_are_anded() {
        let selection = Selection {
            name: Arc::from("selection"),
            fields: vec![field("EventID", &["1"]), field("Image", &["*\\cmd.exe"])],
        };
        assert!(selection.matches(&event(&[("EventID", "1"), ("Image", "C:\\cmd.exe")])));
        assert!(!selection.matches(&event(&[("EventID", "2"), ("Image", "C:\\cmd.exe")])));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let selection = Selection {
            name: Arc::from("selection"),
            fields: vec![field("Image", &["*"])],
        };
        assert!(!selection.matches(&event(&[("CommandLine", "x")])));
    }

    #[test]
    fn test_keywords_any_message() {
        let matcher = new_string_matcher(
            TextPatternModifier::Keyword,
            false,
            false,
            false,
            vec!["mimikatz".to_string(), "sekurlsa".to_string()],
        )
        .unwrap();
        let keywords = Keywords {
            name: Arc::from("keywords"),
            matcher,
            count: 2,
        };
        assert!(keywords.matches(&event(&[("CommandLine", "run sekurlsa::logonpasswords")])));
        assert!(!keywords.matches(&event(&[("CommandLine", "whoami")])));
        assert!(!keywords.matches(&event(&[])));
        assert_eq!(keywords.describe(), "keywords[2 keywords]");
    }
}
