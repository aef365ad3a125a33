//! RuleSet implementation for loading and evaluating multiple Sigma rules
//!
//! Rules are discovered recursively, compiled once and grouped by the
//! `logsource.product` they apply to. Compiled trees are immutable, so a
//! loaded set can be shared across threads and evaluated concurrently.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{Config, RulesetConfig};
use crate::error::{Result as SigmaResult, SigmaError};
use crate::event::Event;
use crate::parser::ErrorClass;
use crate::result::Results;
use crate::rule::{is_multipart, rule_from_yaml, Rule, RuleHandle};
use crate::tree::{build_tree, Tree};

/// A rule that could not be compiled, with the reason
#[derive(Debug)]
pub struct UnsupportedRule {
    /// Source file
    pub path: PathBuf,
    /// Short human readable reason
    pub reason: String,
    /// Underlying error
    pub error: SigmaError,
    /// The rule, when it could at least be deserialized
    pub rule: Option<Rule>,
}

/// Compiled rules sharing one product
#[derive(Debug, Default)]
pub struct RuleGroup {
    trees: Vec<Tree>,
}

impl RuleGroup {
    /// Add a compiled rule
    pub fn push(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of rules in the group
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// True if the group holds no rules
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Compiled rules in load order
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Evaluate every rule, or stop at the first hit when `first_match` is set
    pub fn check(&self, event: &dyn Event, first_match: bool) -> Option<Results> {
        let mut results = Results::new();
        for tree in &self.trees {
            if let Some(result) = tree.eval(event) {
                results.push(result);
                if first_match {
                    break;
                }
            }
        }
        results.into_option()
    }
}

/// Rule groups keyed by product
#[derive(Debug, Default)]
pub struct RuleMap(BTreeMap<String, RuleGroup>);

impl RuleMap {
    /// Add a compiled rule under `product`
    pub fn insert(&mut self, product: &str, tree: Tree) {
        self.0.entry(product.to_string()).or_default().push(tree);
    }

    /// Group for one product
    pub fn get(&self, product: &str) -> Option<&RuleGroup> {
        self.0.get(product)
    }

    /// Evaluate the rules of one product; unknown products never match
    pub fn check(&self, event: &dyn Event, product: &str, first_match: bool) -> Option<Results> {
        self.0.get(product)?.check(event, first_match)
    }

    /// Products with at least one rule, sorted
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over every group
    pub fn groups(&self) -> impl Iterator<Item = (&str, &RuleGroup)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of compiled rules
    pub fn len(&self) -> usize {
        self.0.values().map(RuleGroup::len).sum()
    }

    /// True if no rule compiled
    pub fn is_empty(&self) -> bool {
        self.0.values().all(RuleGroup::is_empty)
    }
}

/// Collection of compiled Sigma rules
#[derive(Debug, Default)]
pub struct RuleSet {
    /// Compiled rules grouped by product
    pub rules: RuleMap,
    /// Rules using constructs this engine does not implement
    pub unsupported: Vec<UnsupportedRule>,
    /// Malformed rules
    pub broken: Vec<UnsupportedRule>,
    /// Number of rule files seen
    pub total: usize,
}

impl RuleSet {
    /// Load and compile every rule under the configured directories.
    ///
    /// Failing rules are sorted into [`RuleSet::unsupported`] and
    /// [`RuleSet::broken`]. Loading fails only when no rule compiled, or on
    /// the first broken rule when `fail_on_parse_error` is set.
    pub fn load(config: &RulesetConfig) -> SigmaResult<Self> {
        let mut config = config.clone();
        config.validate()?;

        let mut ruleset = Self::default();
        for dir in &config.directories {
            for path in discover(dir)? {
                ruleset.total += 1;
                match load_rule(&path, &config.compile) {
                    Ok((product, tree)) => ruleset.rules.insert(&product, tree),
                    Err(failed) => {
                        if config.fail_on_parse_error
                            && failed.error.class() == ErrorClass::Broken
                        {
                            return Err(failed.error);
                        }
                        ruleset.record_failure(failed);
                    }
                }
            }
        }

        if ruleset.rules.is_empty() {
            return Err(SigmaError::NoRules(config.directories));
        }
        info!(
            total = ruleset.total,
            ok = ruleset.rules.len(),
            unsupported = ruleset.unsupported.len(),
            broken = ruleset.broken.len(),
            "loaded ruleset"
        );
        Ok(ruleset)
    }

    fn record_failure(&mut self, failed: UnsupportedRule) {
        match failed.error.class() {
            ErrorClass::Unsupported => {
                warn!(path = %failed.path.display(), reason = %failed.reason, "unsupported rule");
                self.unsupported.push(failed);
            }
            ErrorClass::Broken => {
                warn!(path = %failed.path.display(), reason = %failed.reason, "broken rule");
                self.broken.push(failed);
            }
        }
    }

    /// Evaluate the rules of one product
    pub fn check(&self, event: &dyn Event, product: &str, first_match: bool) -> Option<Results> {
        self.rules.check(event, product, first_match)
    }

    /// Evaluate every product; `first_match` stops each product at its first hit
    pub fn check_all(&self, event: &dyn Event, first_match: bool) -> Option<Results> {
        let mut results = Results::new();
        for (_, group) in self.rules.groups() {
            if let Some(found) = group.check(event, first_match) {
                results.extend(found);
            }
        }
        results.into_option()
    }

    /// Evaluate many events in parallel against every rule; the output keeps
    /// the order of `events`
    pub fn check_batch<E>(&self, events: &[E]) -> Vec<Option<Results>>
    where
        E: Event + Sync,
    {
        events.par_iter().map(|event| self.check_all(event, false)).collect()
    }
}

/// Rule files under `dir`, sorted by path
fn discover(dir: &Path) -> SigmaResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let is_rule = entry.file_type().is_file()
            && matches!(
                entry.path().extension().and_then(|e| e.to_str()),
                Some("yml" | "yaml")
            );
        if is_rule {
            files.push(entry.into_path());
        }
    }
    debug!(dir = %dir.display(), files = files.len(), "discovered rule files");
    Ok(files)
}

/// Read, parse and compile one rule file, returning its product and tree
fn load_rule(path: &Path, config: &Config) -> Result<(String, Tree), UnsupportedRule> {
    let fail = |error: SigmaError, rule: Option<Rule>| UnsupportedRule {
        path: path.to_path_buf(),
        reason: error.to_string(),
        error,
        rule,
    };

    let data = std::fs::read(path).map_err(|e| fail(e.into(), None))?;
    if is_multipart(&data) {
        return Err(fail(SigmaError::Unsupported("multi-part YAML".to_string()), None));
    }
    let rule = rule_from_yaml(&data).map_err(|e| fail(e, None))?;

    let handle = Arc::new(RuleHandle::new(rule, path));
    let tree = build_tree(Arc::clone(&handle), config)
        .map_err(|error| fail(error, Some(handle.rule.clone())))?;

    match handle.rule.product() {
        Some(product) => Ok((product.to_string(), tree)),
        None => Err(fail(
            SigmaError::Unsupported("missing product in logsource".to_string()),
            Some(handle.rule.clone()),
        )),
    }
}
