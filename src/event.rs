//! Event capability consumed by compiled rule trees
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Trait for events that can provide keyword fields for matching
pub trait Keyworder {
    /// Returns list of fields that are relevant for keyword matching
    /// Returns (fields, applicable) where applicable indicates if this rule type applies
    fn keywords(&self) -> (Vec<String>, bool);
}

/// Trait for events that support key-value selection
pub trait Selector {
    /// Select a value by key from the event
    /// Returns (value, found) where found indicates if the key exists
    fn select(&self, key: &str) -> (Option<Value>, bool);
}

/// Anything that can be evaluated by a compiled tree
pub trait Event: Keyworder + Selector {}

impl<T: Keyworder + Selector + ?Sized> Event for T {}

/// Value type that can be returned from selection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// String value - using Arc for cheap cloning
    String(Arc<str>),
    /// Integer value
    Integer(i64),
    /// Unsigned integer beyond the range of `i64`
    UInt(u64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Array of values
    Array(Vec<Value>),
    /// Object mapping keys to values
    Object(BTreeMap<String, Value>),
    /// Null value
    #[default]
    Null,
}

impl Value {
    /// Convert value to string if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert value to integer if possible
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert value to float if possible
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Convert value to bool if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::String(s) => Value::String(Arc::from(s.as_str())),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    n.as_f64().map_or(Value::Null, Value::Float)
                }
            }
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Null => Value::Null,
            JsonValue::Array(arr) => Value::Array(arr.iter().map(Value::from).collect()),
            JsonValue::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

/// Event backed by an arbitrary JSON document.
///
/// Fields are selected with dot notation (`process.parent.name`). Keyword
/// matching reads the configured message fields, or every top-level string
/// when none are configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicEvent {
    data: JsonValue,
    #[serde(default)]
    message_fields: Vec<String>,
}

impl DynamicEvent {
    /// Create a new dynamic event with the given data
    pub fn new(data: JsonValue) -> Self {
        Self {
            data,
            message_fields: Vec::new(),
        }
    }

    /// Restrict keyword matching to the named fields
    pub fn with_message_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The underlying document
    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    fn lookup(&self, key: &str) -> Option<&JsonValue> {
        if key.is_empty() || key.starts_with('.') || key.ends_with('.') || key.contains("..") {
            return None;
        }
        if let Some(direct) = self.data.get(key) {
            return Some(direct);
        }
        key.split('.')
            .try_fold(&self.data, |current, part| current.get(part))
    }
}

impl Keyworder for DynamicEvent {
    fn keywords(&self) -> (Vec<String>, bool) {
        let keywords: Vec<String> = if self.message_fields.is_empty() {
            match &self.data {
                JsonValue::Object(obj) => obj
                    .values()
                    .filter_map(|v| v.as_str())
                    .map(str::to_owned)
                    .collect(),
                _ => Vec::new(),
            }
        } else {
            self.message_fields
                .iter()
                .filter_map(|f| self.lookup(f))
                .filter_map(|v| v.as_str())
                .map(str::to_owned)
                .collect()
        };
        let applicable = !keywords.is_empty();
        (keywords, applicable)
    }
}

impl Selector for DynamicEvent {
    fn select(&self, key: &str) -> (Option<Value>, bool) {
        match self.lookup(key) {
            Some(v) => (Some(Value::from(v)), true),
            None => (None, false),
        }
    }
}

impl From<JsonValue> for DynamicEvent {
    fn from(data: JsonValue) -> Self {
        Self::new(data)
    }
}

/// Flat string maps: every value is both a field and a message string
impl Keyworder for HashMap<String, String> {
    fn keywords(&self) -> (Vec<String>, bool) {
        let mut values: Vec<String> = self.values().cloned().collect();
        values.sort();
        let applicable = !values.is_empty();
        (values, applicable)
    }
}

impl Selector for HashMap<String, String> {
    fn select(&self, key: &str) -> (Option<Value>, bool) {
        match self.get(key) {
            Some(v) => (Some(Value::from(v.as_str())), true),
            None => (None, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_event_selector() {
        let data = serde_json::json!({
            "message": "test message",
            "nested": {
                "field": "value"
            }
        });

        let event = DynamicEvent::new(data);

        // Test simple field access
        let (value, found) = event.select("message");
        assert!(found);
        assert_eq!(value.unwrap().as_str(), Some("test message"));

        // Test nested field access
        let (value, found) = event.select("nested.field");
        assert!(found);
        assert_eq!(value.unwrap().as_str(), Some("value"));

        // Test missing field
        let (_, found) = event.select("missing");
        assert!(!found);
    }

    #[test]
    fn test_dotted_key_prefers_literal_field() {
        let event = DynamicEvent::new(serde_json::json!({
            "winlog.channel": "Security",
            "winlog": {"channel": "System"}
        }));
        let (value, _) = event.select("winlog.channel");
        assert_eq!(value.unwrap().as_str(), Some("Security"));
    }

    #[test]
    fn test_dynamic_event_keywords() {
        let data = serde_json::json!({
            "message": "test keyword",
            "count": 3
        });

        let event = DynamicEvent::new(data);
        let (keywords, applicable) = event.keywords();
        assert!(applicable);
        assert_eq!(keywords, vec!["test keyword"]);
    }

    #[test]
    fn test_configured_message_fields() {
        let event = DynamicEvent::new(serde_json::json!({
            "CommandLine": "whoami /all",
            "Image": "C:\\Windows\\System32\\whoami.exe",
            "proc": {"title": "shell"}
        }))
        .with_message_fields(["CommandLine", "proc.title", "absent"]);
        let (keywords, applicable) = event.keywords();
        assert!(applicable);
        assert_eq!(keywords, vec!["whoami /all", "shell"]);
    }

    #[test]
    fn test_malicious_field_access() {
        let event = DynamicEvent::new(serde_json::json!({"field": "value"}));

        assert!(!event.select("").1);
        assert!(!event.select("field..other").1);
        assert!(!event.select(".field").1);
        assert!(!event.select("field.").1);
    }

    #[test]
    fn test_number_conversion() {
        let event = DynamicEvent::new(serde_json::json!({
            "int": 42,
            "float": 3.5,
            "big_int": i64::MAX,
            "negative": -100
        }));

        assert_eq!(event.select("int").0.unwrap().as_int(), Some(42));
        assert_eq!(event.select("float").0.unwrap().as_float(), Some(3.5));
        assert_eq!(event.select("big_int").0.unwrap().as_int(), Some(i64::MAX));
        assert_eq!(event.select("negative").0.unwrap().as_int(), Some(-100));
    }

    #[test]
    fn test_string_map_event() {
        let mut event = HashMap::new();
        event.insert("Image".to_string(), "C:\\test\\bitsadmin.exe".to_string());
        event.insert("CommandLine".to_string(), "+R +H +A asd.cui".to_string());

        let (value, found) = event.select("Image");
        assert!(found);
        assert_eq!(value.unwrap().as_str(), Some("C:\\test\\bitsadmin.exe"));
        assert!(!event.select("ParentImage").1);

        let (keywords, applicable) = event.keywords();
        assert!(applicable);
        assert_eq!(keywords.len(), 2);
    }
}
