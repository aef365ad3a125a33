//! Sigma rule parsing and representation
//!
//! This module provides structures and functions for parsing Sigma rules
//! from YAML format. Only the `detection` section feeds the compiler; the
//! remaining fields are carried as metadata.
//!
//! # Example
//!
//! ```
//! use sigma_tree::rule::rule_from_yaml;
//!
//! # fn example() -> anyhow::Result<()> {
//! let yaml_content = r#"
//! title: Suspicious Process Creation
//! id: 12345678-1234-1234-1234-123456789abc
//! status: stable
//! logsource:
//!   product: windows
//! detection:
//!   selection:
//!     EventID: 1
//!     CommandLine|contains: 'powershell'
//!   condition: selection
//! "#;
//!
//! let rule = rule_from_yaml(yaml_content.as_bytes())?;
//! assert_eq!(rule.title, "Suspicious Process Creation");
//! assert_eq!(rule.condition()?, "selection");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::error::{Result, SigmaError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

pub mod detection;
pub mod logsource;

pub use detection::{Detection, SearchExpr, CONDITION_KEY};
pub use logsource::Logsource;

/// Rule defines raw rule conforming to sigma rule specification
/// https://github.com/SigmaHQ/sigma-specification
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    #[serde(default)]
    /// Unique rule identifier
    pub id: String,

    /// Rule title
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Rule status (experimental, testing, stable)
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Rule description
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Rule author
    pub author: Option<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    /// External references
    pub references: Vec<String>,

    #[serde(default)]
    /// Log source configuration
    pub logsource: Logsource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Detection rules and conditions
    pub detection: Option<Detection>,

    #[serde(default, deserialize_with = "one_or_many")]
    /// Fields relevant to this rule
    pub fields: Vec<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    /// Known false positive scenarios
    pub falsepositives: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Severity level
    pub level: Option<String>,

    #[serde(default)]
    /// Rule tags for categorization
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Creation date
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Last modification date
    pub modified: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Metadata lists are often written as a single scalar (`falsepositives: Unknown`)
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

impl Rule {
    /// The detection section, or [`SigmaError::MissingDetection`]
    pub fn detection(&self) -> Result<&Detection> {
        self.detection.as_ref().ok_or(SigmaError::MissingDetection)
    }

    /// The condition string of the detection section
    pub fn condition(&self) -> Result<&str> {
        let detection = self.detection()?;
        if detection.0.is_empty() {
            return Err(SigmaError::EmptyDetection);
        }
        detection.condition().ok_or(SigmaError::MissingCondition)
    }

    /// Product the rule applies to, if any
    pub fn product(&self) -> Option<&str> {
        self.logsource.product.as_deref().filter(|p| !p.is_empty())
    }
}

/// RuleHandle is a meta object containing all fields from raw yaml, but is enhanced to also
/// hold debugging info from the tool, such as source file path, etc
#[derive(Debug, Clone)]
pub struct RuleHandle {
    /// The parsed rule
    pub rule: Rule,
    /// Source file path
    pub path: PathBuf,
    /// Whether the source file holds several YAML documents
    pub multipart: bool,
}

impl RuleHandle {
    /// Create a new RuleHandle from a Rule and metadata
    pub fn new(rule: Rule, path: impl Into<PathBuf>) -> Self {
        Self {
            rule,
            path: path.into(),
            multipart: false,
        }
    }

    /// Set whether this is a multipart rule
    pub fn with_multipart(mut self, multipart: bool) -> Self {
        self.multipart = multipart;
        self
    }
}

/// Parse a Rule from YAML data with validation
pub fn rule_from_yaml(data: &[u8]) -> Result<Rule> {
    let rule: Rule = serde_yaml::from_slice(data)?;
    validate_rule(&rule)?;
    Ok(rule)
}

fn validate_rule(rule: &Rule) -> Result<()> {
    if rule.title.trim().is_empty() {
        return Err(SigmaError::InvalidRule(
            "Rule title cannot be empty".to_string(),
        ));
    }
    if rule.detection()?.0.keys().any(|k| k.is_empty()) {
        return Err(SigmaError::InvalidRule(
            "Detection contains empty selection key".to_string(),
        ));
    }
    Ok(())
}

/// Check if rule data is multipart (a document separator after the first line)
pub fn is_multipart(data: &[u8]) -> bool {
    data.split(|&b| b == b'\n')
        .skip(1)
        .any(|line| line.strip_suffix(b"\r").unwrap_or(line) == b"---")
}
