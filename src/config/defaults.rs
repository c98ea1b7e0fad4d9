//! Built-in converter defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Package namespace prepended to plugin identifiers
    pub namespace: String,

    /// Name of the reserved core section
    pub core_section: String,

    /// Key prefix of plugin enable/disable directives
    pub directive_prefix: String,

    /// Output format (default: "yaml")
    pub output_format: String,

    /// Log level (default: "warn")
    pub log_level: String,

    /// Log format (default: "text")
    pub log_format: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            namespace: "yandextank.plugins".to_string(),
            core_section: "tank".to_string(),
            directive_prefix: "plugin_".to_string(),
            output_format: "yaml".to_string(),
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "namespace": self.namespace,
            "core_section": self.core_section,
            "directive_prefix": self.directive_prefix,
            "output": {
                "format": self.output_format
            },
            "log": {
                "level": self.log_level,
                "format": self.log_format
            }
        })
    }
}
