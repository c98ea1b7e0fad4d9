//! Schema loaders: schema files on disk, or schemas held in memory.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{PluginSchema, SchemaError, SchemaLoader};
use crate::config::toml_to_json;

/// Extensions tried for a plugin schema file, in order.
const SCHEMA_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml"];

/// Loads `<dir>/<Plugin>.{yaml,yml,json,toml}` per plugin and a single core
/// schema document.
#[derive(Debug, Clone, Default)]
pub struct DirSchemaLoader {
    schema_dir: Option<PathBuf>,
    core_schema: Option<PathBuf>,
}

impl DirSchemaLoader {
    pub fn new(schema_dir: Option<PathBuf>, core_schema: Option<PathBuf>) -> Self {
        Self {
            schema_dir,
            core_schema,
        }
    }

    fn plugin_schema_path(&self, package: &str) -> Option<PathBuf> {
        let dir = self.schema_dir.as_ref()?;
        let plugin = package.rsplit('.').next().unwrap_or(package);
        SCHEMA_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", plugin, ext)))
            .find(|path| path.is_file())
    }
}

impl SchemaLoader for DirSchemaLoader {
    fn load_plugin_schema(&self, package: &str) -> Result<PluginSchema, SchemaError> {
        match self.plugin_schema_path(package) {
            Some(path) => {
                debug!(package, path = %path.display(), "Loading plugin schema");
                PluginSchema::from_value(package, read_document(&path)?)
            }
            None => {
                warn!(package, "No schema found, every option will pass through untyped");
                Ok(PluginSchema::default())
            }
        }
    }

    fn load_core_schema(&self) -> Result<PluginSchema, SchemaError> {
        let Some(path) = &self.core_schema else {
            warn!("No core schema configured, core options will pass through untyped");
            return Ok(PluginSchema::default());
        };
        let document = read_document(path)?;
        let schema = match document.pointer("/core/schema") {
            Some(node) => node.clone(),
            None => document,
        };
        PluginSchema::from_value("core", schema)
    }
}

/// Read a YAML, JSON or TOML document by extension (YAML when unknown).
fn read_document(path: &Path) -> Result<Value, SchemaError> {
    let contents = fs::read_to_string(path).map_err(|e| SchemaError::IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let parse_error = |message: String| SchemaError::ParseError {
        path: path.display().to_string(),
        message,
    };

    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string())),
        "toml" => toml::from_str::<toml::Value>(&contents)
            .map(toml_to_json)
            .map_err(|e| parse_error(e.to_string())),
        _ => serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string())),
    }
}

/// In-memory schemas keyed by package id.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaLoader {
    plugins: BTreeMap<String, PluginSchema>,
    core: PluginSchema,
}

impl StaticSchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plugin(mut self, package: &str, schema: PluginSchema) -> Self {
        self.plugins.insert(package.to_string(), schema);
        self
    }

    pub fn with_core(mut self, schema: PluginSchema) -> Self {
        self.core = schema;
        self
    }
}

impl SchemaLoader for StaticSchemaLoader {
    fn load_plugin_schema(&self, package: &str) -> Result<PluginSchema, SchemaError> {
        Ok(self.plugins.get(package).cloned().unwrap_or_default())
    }

    fn load_core_schema(&self) -> Result<PluginSchema, SchemaError> {
        Ok(self.core.clone())
    }
}
