//! Security policy: allow-lists for template constructs
//!
//! A policy names the tags, filters, and functions a template is permitted
//! to use. Anything outside the lists fails compilation (fail closed).
//! Policies can be loaded from TOML so deployments can tighten or extend
//! the lists without code changes.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing a policy document
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Failed to read policy file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse policy TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Allow-lists consulted at compile time
///
/// Literal text and default-escaped interpolation are always permitted;
/// everything with a name (tags, filters, functions) must be listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPolicy {
    pub allowed_tags: BTreeSet<String>,
    pub allowed_filters: BTreeSet<String>,
    pub allowed_functions: BTreeSet<String>,
}

/// TOML structure for deserializing policies
#[derive(Deserialize)]
struct TomlPolicy {
    #[serde(default)]
    allowed_tags: Vec<String>,
    #[serde(default)]
    allowed_filters: Vec<String>,
    #[serde(default)]
    allowed_functions: Vec<String>,
}

/// Default policy: the control-flow tags and escaping filters of the core
/// language, and no functions
const DEFAULT_POLICY: &str = r#"
allowed_tags = ["if", "for", "set"]
allowed_filters = ["escape", "raw"]
allowed_functions = []
"#;

impl SecurityPolicy {
    /// Load policy from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load policy from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, PolicyError> {
        let parsed: TomlPolicy = toml::from_str(content)?;
        Ok(SecurityPolicy {
            allowed_tags: parsed.allowed_tags.into_iter().collect(),
            allowed_filters: parsed.allowed_filters.into_iter().collect(),
            allowed_functions: parsed.allowed_functions.into_iter().collect(),
        })
    }

    /// Fully locked-down policy: only literal text and default-escaped
    /// interpolation compile
    pub fn none() -> Self {
        Self {
            allowed_tags: BTreeSet::new(),
            allowed_filters: BTreeSet::new(),
            allowed_functions: BTreeSet::new(),
        }
    }

    pub fn allows_tag(&self, name: &str) -> bool {
        self.allowed_tags.contains(name)
    }

    pub fn allows_filter(&self, name: &str) -> bool {
        self.allowed_filters.contains(name)
    }

    pub fn allows_function(&self, name: &str) -> bool {
        self.allowed_functions.contains(name)
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self::from_toml(DEFAULT_POLICY).expect("Default policy should be valid TOML")
    }
}
