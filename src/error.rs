/// Error types for rule loading and compilation
use crate::parser::error::{ErrorClass, ParseError};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rule loading operations
#[derive(Error, Debug)]
pub enum SigmaError {
    /// Condition or search expression failed to compile
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Detection field is missing from the rule
    #[error("Missing detection field")]
    MissingDetection,

    /// Detection has no search expressions
    #[error("Empty detection field")]
    EmptyDetection,

    /// Condition is missing from the detection section
    #[error("Missing condition in detection")]
    MissingCondition,

    /// Rule format does not conform to Sigma specification
    #[error("Invalid rule format: {0}")]
    InvalidRule(String),

    /// Rule is well formed but uses a feature this engine does not handle
    #[error("Unsupported rule: {0}")]
    Unsupported(String),

    /// YAML parsing failed
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// No rule could be loaded from the configured directories
    #[error("No rules loaded from {0:?}")]
    NoRules(Vec<PathBuf>),

    /// Configuration is invalid or incomplete
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl SigmaError {
    /// Classify the error for batch loading
    pub fn class(&self) -> ErrorClass {
        match self {
            SigmaError::Parse(e) => e.class(),
            SigmaError::Unsupported(_) => ErrorClass::Unsupported,
            SigmaError::MissingDetection
            | SigmaError::EmptyDetection
            | SigmaError::MissingCondition
            | SigmaError::InvalidRule(_)
            | SigmaError::YamlParse(_)
            | SigmaError::JsonParse(_)
            | SigmaError::Io(_)
            | SigmaError::Walk(_)
            | SigmaError::NoRules(_)
            | SigmaError::Configuration(_) => ErrorClass::Broken,
        }
    }
}

/// Result type alias for Sigma operations
pub type Result<T> = std::result::Result<T, SigmaError>;
