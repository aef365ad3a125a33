//! Compile-time and loading configuration

use crate::error::{Result, SigmaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options that change how search expressions compile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fold ASCII case for literal, wildcard, prefix and suffix patterns
    pub case_insensitive: bool,
    /// Keep whitespace runs as written instead of collapsing them
    pub no_collapse_ws: bool,
}

impl Config {
    /// Default configuration: case-sensitive, whitespace collapsing on
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable case-insensitive matching
    pub fn with_case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Enable or disable whitespace preservation
    pub fn with_no_collapse_ws(mut self, enabled: bool) -> Self {
        self.no_collapse_ws = enabled;
        self
    }
}

/// Where to find rules and how to treat failures while loading them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesetConfig {
    /// Directories searched recursively for rule files
    pub directories: Vec<PathBuf>,
    /// Abort loading on the first broken rule
    pub fail_on_parse_error: bool,
    /// Compile options applied to every rule
    pub compile: Config,
}

impl RulesetConfig {
    /// Configuration for the given rule directories
    pub fn new<I, P>(directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the compile options
    pub fn with_compile(mut self, compile: Config) -> Self {
        self.compile = compile;
        self
    }

    /// Abort on the first broken rule
    pub fn with_fail_on_parse_error(mut self, enabled: bool) -> Self {
        self.fail_on_parse_error = enabled;
        self
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(serde_yaml::from_slice(&data)?)
    }

    /// Check the directory list and expand a leading `~` in each entry
    pub fn validate(&mut self) -> Result<()> {
        if self.directories.is_empty() {
            return Err(SigmaError::Configuration(
                "missing rule directories".to_string(),
            ));
        }
        for dir in &mut self.directories {
            *dir = expand_home(dir)?;
        }
        Ok(())
    }
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = std::env::var_os("HOME").ok_or_else(|| {
        SigmaError::Configuration(format!("cannot expand {}: HOME is not set", path.display()))
    })?;
    Ok(PathBuf::from(home).join(rest))
}
