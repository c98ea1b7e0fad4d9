//! Plugin option schemas
//!
//! A schema maps option names to descriptors carrying at least a `type`
//! tag. Only `boolean` and `integer` drive coercion; any other descriptor
//! content is carried for the downstream validator and ignored here.

mod loader;

pub use loader::{DirSchemaLoader, StaticSchemaLoader};

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Source of plugin and core schemas.
///
/// Implementations are read-only and must answer for every plugin
/// identifier, returning an empty schema for plugins they know nothing
/// about.
pub trait SchemaLoader {
    /// Load the schema of a plugin by its namespaced package id
    /// (e.g. `yandextank.plugins.Phantom`).
    fn load_plugin_schema(&self, package: &str) -> Result<PluginSchema, SchemaError>;

    /// Load the schema of the core section.
    fn load_core_schema(&self) -> Result<PluginSchema, SchemaError>;
}

/// Schema loading errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("IO error reading {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Schema for {0} is not a mapping")]
    NotAMapping(String),
}

/// Declared type of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    Boolean,
    Integer,
    /// Any other type tag, kept verbatim.
    Other(String),
}

/// What a schema says about one option name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEntry {
    /// The option is not listed.
    Missing,
    /// Listed without a `type`.
    Untyped,
    Typed(OptionType),
}

/// Option descriptors of one plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginSchema {
    options: BTreeMap<String, Value>,
}

impl PluginSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a mapping of option name to descriptor.
    pub fn from_value(source: &str, value: Value) -> Result<Self, SchemaError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(SchemaError::NotAMapping(source.to_string())),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            options: map.into_iter().collect(),
        }
    }

    /// Add one descriptor.
    pub fn with_option(mut self, name: &str, descriptor: Value) -> Self {
        self.options.insert(name.to_string(), descriptor);
        self
    }

    pub fn descriptor(&self, name: &str) -> Option<&Value> {
        self.options.get(name).filter(|d| !d.is_null())
    }

    /// Look up how an option is declared.
    pub fn entry(&self, name: &str) -> SchemaEntry {
        let Some(descriptor) = self.descriptor(name) else {
            return SchemaEntry::Missing;
        };
        match descriptor.get("type") {
            None | Some(Value::Null) => SchemaEntry::Untyped,
            Some(Value::String(tag)) => SchemaEntry::Typed(match tag.as_str() {
                "boolean" => OptionType::Boolean,
                "integer" => OptionType::Integer,
                other => OptionType::Other(other.to_string()),
            }),
            Some(other) => SchemaEntry::Typed(OptionType::Other(other.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
