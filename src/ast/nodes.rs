use super::{Branch, Leaf};
use crate::event::Event;

/// How many children of a quantifier must match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    /// `all of`
    All,
    /// `N of`
    AtLeast(usize),
}

/// A node of the compiled matching tree
#[derive(Debug)]
pub enum MatchNode {
    /// Direct event inspection
    Leaf(Leaf),
    /// Logical negation
    Not(Box<MatchNode>),
    /// All children must match, at least two children
    And(Vec<MatchNode>),
    /// Any child must match, at least two children
    Or(Vec<MatchNode>),
    /// `all of` / `N of` over the expressions matching `pattern`
    Quantifier {
        /// Threshold
        kind: QuantifierKind,
        /// Name pattern as written in the condition
        pattern: String,
        /// One subtree per matching expression, in name order
        children: Vec<MatchNode>,
    },
}

impl MatchNode {
    /// AND of `children`; a single child is returned unchanged
    pub fn and(mut children: Vec<MatchNode>) -> MatchNode {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        MatchNode::And(children)
    }

    /// OR of `children`; a single child is returned unchanged
    pub fn or(mut children: Vec<MatchNode>) -> MatchNode {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        MatchNode::Or(children)
    }

    /// Wrap in `Not` when `negated` is set
    pub fn negate_if(self, negated: bool) -> MatchNode {
        if negated {
            MatchNode::Not(Box::new(self))
        } else {
            self
        }
    }

    /// Number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            MatchNode::Leaf(_) => 1,
            MatchNode::Not(child) => child.leaf_count(),
            MatchNode::And(children)
            | MatchNode::Or(children)
            | MatchNode::Quantifier { children, .. } => {
                children.iter().map(MatchNode::leaf_count).sum()
            }
        }
    }

    /// Height of the tree, a single leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            MatchNode::Leaf(_) => 1,
            MatchNode::Not(child) => 1 + child.depth(),
            MatchNode::And(children)
            | MatchNode::Or(children)
            | MatchNode::Quantifier { children, .. } => {
                1 + children.iter().map(MatchNode::depth).max().unwrap_or(0)
            }
        }
    }
}

impl Branch for MatchNode {
    fn matches(&self, event: &dyn Event) -> bool {
        match self {
            MatchNode::Leaf(leaf) => leaf.matches(event),
            MatchNode::Not(child) => !child.matches(event),
            MatchNode::And(children) => children.iter().all(|c| c.matches(event)),
            MatchNode::Or(children) => children.iter().any(|c| c.matches(event)),
            MatchNode::Quantifier {
                kind: QuantifierKind::All,
                children,
                ..
            } => children.iter().all(|c| c.matches(event)),
            MatchNode::Quantifier {
                kind: QuantifierKind::AtLeast(n),
                children,
                ..
            } => {
                let mut hits = 0;
                for child in children {
                    if child.matches(event) {
                        hits += 1;
                        if hits >= *n {
                            return true;
                        }
                    }
                }
                false
            }
        }
    }

    fn describe(&self) -> String {
        let join = |children: &[MatchNode], op: &str| {
            let parts: Vec<String> = children.iter().map(|c| c.describe()).collect();
            format!("({})", parts.join(op))
        };
        match self {
            MatchNode::Leaf(leaf) => leaf.name().to_string(),
            MatchNode::Not(child) => format!("NOT {}", child.describe()),
            MatchNode::And(children) => join(children, " AND "),
            MatchNode::Or(children) => join(children, " OR "),
            MatchNode::Quantifier {
                kind: QuantifierKind::All,
                pattern,
                ..
            } => format!("all of {}", pattern),
            MatchNode::Quantifier {
                kind: QuantifierKind::AtLeast(n),
                pattern,
                ..
            } => format!("{} of {}", n, pattern),
        }
    }
}
