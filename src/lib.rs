//! Sigma condition compiler and matching-tree evaluator
//!
//! The `condition` field of a Sigma rule is lexed, checked for grammar
//! adjacency, split into parenthesized groups and reduced into a
//! [`MatchNode`] tree whose leaves are built from the named search
//! expressions of the rule's detection section. The tree is immutable after
//! compilation and can be evaluated against any [`Event`] from many threads.
//!
//! # Example
//!
//! ```
//! use sigma_tree::{compile, Branch, Config, Detection, DynamicEvent};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detection: Detection = serde_yaml::from_str(r#"
//! selection:
//!   Image|endswith: '\powershell.exe'
//! filter:
//!   ParentImage|endswith: '\explorer.exe'
//! condition: selection and not filter
//! "#)?;
//!
//! let tree = compile(&detection, &Config::default())?;
//!
//! let event = DynamicEvent::new(json!({
//!     "Image": "C:\\Windows\\powershell.exe",
//!     "ParentImage": "C:\\Windows\\cmd.exe"
//! }));
//! assert!(tree.matches(&event));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

// Re-export commonly used items
pub use ast::{Branch, MatchNode, QuantifierKind};
pub use config::{Config, RulesetConfig};
pub use error::{Result, SigmaError};
pub use event::{DynamicEvent, Event, Keyworder, Selector, Value};
pub use lexer::tokenize;
pub use parser::{compile, compile_condition, ErrorClass, ParseError};
pub use rule::{Detection, Rule, RuleHandle, SearchExpr};
pub use ruleset::{RuleGroup, RuleMap, RuleSet, UnsupportedRule};
pub use tree::{build_tree, Tree};

/// Event abstractions and implementations
pub mod event;

/// AST nodes and matching engine
pub mod ast;

/// Compile and loading options
pub mod config;

/// Error types
pub mod error;

/// Lexical analysis
pub mod lexer;

/// Parser implementation
pub mod parser;

/// Rule definitions and YAML parsing
pub mod rule;

/// Pattern matching implementations
pub mod pattern;

/// Compiled rule trees
pub mod tree;

/// Result types for matches
pub mod result;

/// RuleSet for managing multiple rules
pub mod ruleset;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. With `json` the output is
/// one JSON object per line, otherwise the human readable formatter is used.
pub fn init_tracing(json: bool, default_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
