//! Classifier result and error types.

use crate::PluginId;
use serde::{Deserialize, Serialize};

/// Errors raised while resolving section names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// No registered pattern matched the section name.
    #[error("section '{0}' did not match any plugin")]
    UnrecognizedSection(String),

    /// A pattern in the table failed to compile.
    #[error("invalid pattern for plugin {plugin}: {detail}")]
    InvalidPattern { plugin: String, detail: String },
}

impl ClassifyError {
    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            ClassifyError::UnrecognizedSection(name) => format!("UNRECOGNIZED_SECTION:{}", name),
            ClassifyError::InvalidPattern { plugin, .. } => format!("INVALID_PATTERN:{}", plugin),
        }
    }
}

/// Outcome of classifying one section name, with the rule that decided it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    /// The section name as given.
    pub section: String,

    /// Resolved plugin. None when no pattern matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PluginId>,

    /// The pattern that matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Position of the matching entry in the pattern table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
}

impl Classification {
    /// Create a matched classification.
    pub fn matched(section: &str, plugin: PluginId, pattern: &str, rule_index: usize) -> Self {
        Self {
            section: section.to_string(),
            plugin: Some(plugin),
            pattern: Some(pattern.to_string()),
            rule_index: Some(rule_index),
        }
    }

    /// Create an unmatched classification.
    pub fn unmatched(section: &str) -> Self {
        Self {
            section: section.to_string(),
            plugin: None,
            pattern: None,
            rule_index: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.plugin.is_some()
    }

    /// Human-readable one-line summary.
    pub fn to_human(&self) -> String {
        match (&self.plugin, &self.pattern) {
            (Some(plugin), Some(pattern)) => {
                format!("[{}] -> {} (pattern '{}')", self.section, plugin, pattern)
            }
            _ => format!("[{}] -> no matching plugin", self.section),
        }
    }
}
