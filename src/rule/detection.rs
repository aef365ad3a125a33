use crate::pattern::IdentifierType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved detection key holding the condition string
pub const CONDITION_KEY: &str = "condition";

/// Name prefix that marks scalar content as a keyword list
const KEYWORD_PREFIX: &str = "keyword";

/// Detection represents the detection field in sigma rule
/// contains condition expression and identifier fields for building AST
///
/// Entries are kept in name order so compiled trees are deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Detection(pub BTreeMap<String, Value>);

impl Detection {
    /// Create a new empty Detection
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Get the condition string if present
    pub fn condition(&self) -> Option<&str> {
        self.0.get(CONDITION_KEY).and_then(|v| v.as_str())
    }

    /// Get a specific search expression by name
    pub fn get(&self, name: &str) -> Option<SearchExpr<'_>> {
        if name == CONDITION_KEY {
            return None;
        }
        self.0
            .get_key_value(name)
            .map(|(name, content)| SearchExpr::new(name, content))
    }

    /// Check if detection has a specific search expression
    pub fn contains_key(&self, name: &str) -> bool {
        name != CONDITION_KEY && self.0.contains_key(name)
    }

    /// Get the number of search expressions (excluding condition)
    pub fn rule_count(&self) -> usize {
        self.iter().count()
    }

    /// Insert a new entry
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Get an iterator over the search expressions (excluding condition)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, _)| k.as_str() != CONDITION_KEY)
    }

    /// Search expression names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k.as_str())
    }

    /// All search expressions in name order
    pub fn search_exprs(&self) -> impl Iterator<Item = SearchExpr<'_>> {
        self.iter().map(|(name, content)| SearchExpr::new(name, content))
    }
}

impl From<BTreeMap<String, Value>> for Detection {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// One named entry of a detection, classified for leaf building
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchExpr<'a> {
    /// Entry name as referenced by the condition
    pub name: &'a str,
    /// Selection or keyword list
    pub kind: IdentifierType,
    /// Raw content
    pub content: &'a Value,
}

impl<'a> SearchExpr<'a> {
    /// Wrap an entry, guessing its kind
    pub fn new(name: &'a str, content: &'a Value) -> Self {
        Self {
            name,
            kind: Self::guess(name, content),
            content,
        }
    }

    /// Classify by content shape: maps and lists of maps are selections,
    /// lists of scalars are keyword lists. Scalar content falls back to the
    /// `keyword` name prefix.
    pub fn guess(name: &str, content: &Value) -> IdentifierType {
        match content {
            Value::Object(_) => IdentifierType::Selection,
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                IdentifierType::Selection
            }
            Value::Array(items) if !items.is_empty() && !items.iter().any(Value::is_object) => {
                IdentifierType::Keywords
            }
            _ if name.starts_with(KEYWORD_PREFIX) => IdentifierType::Keywords,
            _ => IdentifierType::Selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detection_condition() {
        let mut detection = Detection::new();
        detection.insert("condition", json!("selection1 and selection2"));
        detection.insert("selection1", json!({"EventID": 1}));
        detection.insert("selection2", json!({"Image": "*\\cmd.exe"}));

        assert_eq!(detection.condition(), Some("selection1 and selection2"));
        assert_eq!(detection.rule_count(), 2);
        assert!(detection.get("condition").is_none());
        assert!(!detection.contains_key("condition"));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut detection = Detection::new();
        detection.insert("condition", json!("all of them"));
        detection.insert("sel_b", json!({"a": 1}));
        detection.insert("sel_a", json!({"a": 1}));
        detection.insert("filter", json!({"a": 1}));

        let names: Vec<&str> = detection.names().collect();
        assert_eq!(names, vec!["filter", "sel_a", "sel_b"]);
    }

    #[test]
    fn test_guess_by_shape() {
        assert_eq!(
            SearchExpr::guess("selection", &json!({"EventID": 1})),
            IdentifierType::Selection
        );
        assert_eq!(
            SearchExpr::guess("selection", &json!([{"a": 1}, {"b": 2}])),
            IdentifierType::Selection
        );
        assert_eq!(
            SearchExpr::guess("anything", &json!(["mimikatz", "sekurlsa"])),
            IdentifierType::Keywords
        );
    }

    #[test]
    fn test_guess_falls_back_to_name_prefix() {
        assert_eq!(
            SearchExpr::guess("keywords", &json!("mimikatz")),
            IdentifierType::Keywords
        );
        assert_eq!(
            SearchExpr::guess("selection", &json!("mimikatz")),
            IdentifierType::Selection
        );
    }

    #[test]
    fn test_detection_deserialize() {
        let yaml = r#"
condition: selection
selection:
  EventID: 1
  Image|endswith: '\cmd.exe'
        "#;

        let detection: Detection = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(detection.condition(), Some("selection"));
        let expr = detection.get("selection").unwrap();
        assert_eq!(expr.kind, IdentifierType::Selection);
        assert_eq!(expr.content["Image|endswith"], json!("\\cmd.exe"));
    }
}
