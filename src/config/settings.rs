//! Converter settings with provenance
//!
//! Settings are layered builtin -> settings file -> CLI overrides and merged
//! with [`deep_merge`](super::deep_merge). Each contributing file is recorded
//! with its SHA-256 digest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Rendering of the converted document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(SettingsError::ValidationError(format!(
                "output.format must be 'yaml' or 'json', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
}

/// Fully merged converter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterSettings {
    /// Package namespace of plugin identifiers (e.g. `yandextank.plugins`)
    pub namespace: String,

    /// Reserved section holding core options and directives
    pub core_section: String,

    /// Prefix of enable/disable directives in the core section
    pub directive_prefix: String,

    /// Directory of per-plugin schema files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,

    /// Core schema document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_schema: Option<PathBuf>,

    pub output: OutputSettings,

    pub log: LogSettings,

    /// Contributing layers in precedence order
    #[serde(default)]
    pub sources: Vec<SettingsSource>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            namespace: defaults.namespace,
            core_section: defaults.core_section,
            directive_prefix: defaults.directive_prefix,
            schema_dir: None,
            core_schema: None,
            output: OutputSettings {
                format: defaults.output_format,
            },
            log: LogSettings {
                level: defaults.log_level,
                format: defaults.log_format,
            },
            sources: vec![SettingsSource {
                origin: SettingsOrigin::Builtin,
                path: None,
                digest: None,
            }],
        }
    }
}

impl ConverterSettings {
    /// Build settings from layers
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = settings_path {
            let (value, digest) = Self::load_toml_file(path)?;
            debug!(path = %path.display(), sha256 = %digest, "Settings file loaded");
            layers.push(value);
            sources.push(SettingsSource {
                origin: SettingsOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let mut settings: ConverterSettings = serde_json::from_value(merged)
            .map_err(|e| SettingsError::ParseError(format!("invalid settings: {}", e)))?;
        settings.sources = sources;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings with their sources, as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parsed output format.
    pub fn output_format(&self) -> Result<OutputFormat, SettingsError> {
        self.output.format.parse()
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.namespace.trim().is_empty() {
            return Err(SettingsError::ValidationError(
                "namespace cannot be empty".to_string(),
            ));
        }
        if self.core_section.trim().is_empty() {
            return Err(SettingsError::ValidationError(
                "core_section cannot be empty".to_string(),
            ));
        }
        if self.directive_prefix.is_empty() {
            return Err(SettingsError::ValidationError(
                "directive_prefix cannot be empty".to_string(),
            ));
        }
        self.output_format()?;
        if self.log.format != "text" && self.log.format != "json" {
            return Err(SettingsError::ValidationError(format!(
                "log.format must be 'text' or 'json', got '{}'",
                self.log.format
            )));
        }
        Ok(())
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
        let bytes = fs::read(path)
            .map_err(|e| SettingsError::IoError(format!("{}: {}", path.display(), e)))?;

        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = String::from_utf8(bytes)
            .map_err(|e| SettingsError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((toml_to_json(toml_value), digest))
    }
}

/// Convert TOML Value to JSON Value
pub(crate) fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_build_with_defaults_only() {
        let settings = ConverterSettings::build(None, None).unwrap();

        assert_eq!(settings.namespace, "yandextank.plugins");
        assert_eq!(settings.core_section, "tank");
        assert_eq!(settings.output_format().unwrap(), OutputFormat::Yaml);
        assert!(settings.schema_dir.is_none());
        assert_eq!(settings.sources.len(), 1);
        assert_eq!(settings.sources[0].origin, SettingsOrigin::Builtin);
    }

    #[test]
    fn test_default_matches_builtin_layer() {
        let built = ConverterSettings::build(None, None).unwrap();
        let default = ConverterSettings::default();
        assert_eq!(built.namespace, default.namespace);
        assert_eq!(built.log.level, default.log.level);
    }

    #[test]
    fn test_cli_override() {
        let cli = serde_json::json!({"output": {"format": "json"}, "schema_dir": "/tmp/schemas"});
        let settings = ConverterSettings::build(None, Some(cli)).unwrap();

        assert_eq!(settings.output_format().unwrap(), OutputFormat::Json);
        assert_eq!(settings.schema_dir, Some(PathBuf::from("/tmp/schemas")));
        assert_eq!(settings.sources.last().unwrap().origin, SettingsOrigin::Cli);
    }

    #[test]
    fn test_file_layer_with_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "namespace = \"mytank.plugins\"").unwrap();
        writeln!(temp, "[log]").unwrap();
        writeln!(temp, "format = \"json\"").unwrap();

        let settings = ConverterSettings::build(Some(temp.path()), None).unwrap();

        assert_eq!(settings.namespace, "mytank.plugins");
        assert_eq!(settings.log.format, "json");
        // untouched sibling survives the deep merge
        assert_eq!(settings.log.level, "warn");
        let file_source = &settings.sources[1];
        assert_eq!(file_source.origin, SettingsOrigin::File);
        assert_eq!(file_source.digest.as_ref().unwrap().len(), 64);
    }

    #[test]
    fn test_to_json_reports_file_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "namespace = \"mytank.plugins\"\n").unwrap();
        let expected = hex::encode(Sha256::digest(b"namespace = \"mytank.plugins\"\n"));

        let settings = ConverterSettings::build(Some(temp.path()), None).unwrap();
        let json: Value = serde_json::from_str(&settings.to_json().unwrap()).unwrap();

        assert_eq!(json["namespace"], "mytank.plugins");
        assert_eq!(json["sources"][0]["origin"], "builtin");
        assert_eq!(json["sources"][1]["origin"], "file");
        assert_eq!(json["sources"][1]["digest"], expected.as_str());
    }

    #[test]
    fn test_cli_beats_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[output]").unwrap();
        writeln!(temp, "format = \"json\"").unwrap();

        let cli = serde_json::json!({"output": {"format": "yaml"}});
        let settings = ConverterSettings::build(Some(temp.path()), Some(cli)).unwrap();
        assert_eq!(settings.output_format().unwrap(), OutputFormat::Yaml);
    }

    #[test]
    fn test_invalid_output_format() {
        let cli = serde_json::json!({"output": {"format": "xml"}});
        let err = ConverterSettings::build(None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let cli = serde_json::json!({"namespace": "  "});
        assert!(ConverterSettings::build(None, Some(cli)).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ConverterSettings::build(Some(Path::new("/nonexistent/settings.toml")), None)
            .unwrap_err();
        assert!(matches!(err, SettingsError::IoError(_)));
    }
}
