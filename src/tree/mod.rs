//! Compiled rule: a matching tree bound to the rule it came from

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::ast::{Branch, MatchNode};
use crate::config::Config;
use crate::error::SigmaError;
use crate::event::Event;
use crate::parser;
use crate::result::Result;
use crate::rule::RuleHandle;

pub mod builder;

pub use builder::build_leaf;

/// Tree represents the full AST for a sigma rule
#[derive(Debug)]
pub struct Tree {
    /// Root of the matching tree
    pub root: MatchNode,
    /// Rule the tree was compiled from
    pub rule: Arc<RuleHandle>,
}

impl Tree {
    /// Create a new Tree with the given root node and rule handle
    pub fn new(root: MatchNode, rule: Arc<RuleHandle>) -> Self {
        Self { root, rule }
    }

    /// Evaluate the tree
    pub fn match_event(&self, event: &dyn Event) -> bool {
        self.root.matches(event)
    }

    /// Evaluate an event against this tree, returning a Result if it matches
    pub fn eval(&self, event: &dyn Event) -> Option<Result> {
        if !self.match_event(event) {
            return None;
        }
        let rule = &self.rule.rule;
        Some(Result::new(rule.id.clone(), rule.title.clone()).with_tags(rule.tags.clone()))
    }
}

/// Compile the detection of `handle` into a [`Tree`]
#[instrument(level = "debug", skip_all, fields(path = %handle.path.display()))]
pub fn build_tree(handle: Arc<RuleHandle>, config: &Config) -> std::result::Result<Tree, SigmaError> {
    if handle.multipart {
        return Err(SigmaError::Unsupported("multi-part YAML".to_string()));
    }
    let condition = handle.rule.condition()?;
    let detection = handle.rule.detection()?;
    let root = parser::compile_condition(condition, detection, config)?;
    debug!(
        path = %handle.path.display(),
        id = %handle.rule.id,
        tree = %root.describe(),
        "built rule tree"
    );
    Ok(Tree::new(root, handle))
}
