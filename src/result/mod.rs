use serde::{Deserialize, Serialize};

/// Result of a positive Sigma rule match
///
/// Carries the metadata of the rule that matched. The compiled tree itself
/// only produces a boolean; this record is attached around it by the rule
/// set.
///
/// # Examples
///
/// ```
/// use sigma_tree::result::Result;
///
/// let result = Result::new("rule-001", "Suspicious Process Creation")
///     .with_tags(vec!["attack.execution".to_string(), "attack.t1059".to_string()]);
/// assert_eq!(result.tags.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Result {
    /// Tags associated with this detection (e.g., MITRE ATT&CK tags)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Unique identifier for the rule that matched
    pub id: String,

    /// Human-readable title of the rule
    pub title: String,
}

impl Result {
    /// Creates a new Result with the specified rule metadata
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            tags: Vec::new(),
            id: id.into(),
            title: title.into(),
        }
    }

    /// Adds tags to this Result
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Collection of Results from multiple rule matches
///
/// # Examples
///
/// ```
/// use sigma_tree::result::{Result, Results};
///
/// let mut results = Results::new();
/// results.push(Result::new("rule-1", "First Detection"));
/// results.push(Result::new("rule-2", "Second Detection"));
///
/// assert_eq!(results.len(), 2);
/// let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
/// assert_eq!(titles, vec!["First Detection", "Second Detection"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Results(Vec<Result>);

impl Results {
    /// Creates a new empty Results collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a Result to the collection
    pub fn push(&mut self, result: Result) {
        self.0.push(result);
    }

    /// Appends every result of `other`
    pub fn extend(&mut self, other: Results) {
        self.0.extend(other.0);
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no rule matched
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the results
    pub fn iter(&self) -> std::slice::Iter<'_, Result> {
        self.0.iter()
    }

    /// `None` when empty, so callers can use `?`-style short cuts
    pub fn into_option(self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Consume into the inner vector
    pub fn into_vec(self) -> Vec<Result> {
        self.0
    }
}

impl From<Vec<Result>> for Results {
    fn from(results: Vec<Result>) -> Self {
        Self(results)
    }
}

impl FromIterator<Result> for Results {
    fn from_iter<I: IntoIterator<Item = Result>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Results {
    type Item = Result;
    type IntoIter = std::vec::IntoIter<Result>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a Result;
    type IntoIter = std::slice::Iter<'a, Result>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
