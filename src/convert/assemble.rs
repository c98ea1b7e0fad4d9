//! End-to-end assembly of the canonical config.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tank_classifier::{PluginId, SectionClassifier};
use tracing::{debug, info, warn};

use super::coerce::coerce;
use super::combine::combine_sections;
use super::enable::EnablementResolver;
use super::section::Section;
use crate::config::{deep_merge, fold_fragments, ConverterSettings, OutputFormat};
use crate::error::ConvertError;
use crate::ini::{IniDocument, RawSection};
use crate::schema::{PluginSchema, SchemaLoader};

/// Key of the core entry in the output.
pub const CORE_KEY: &str = "core";

/// Converted configuration: plugin canonical name -> options, plus `core`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalConfig {
    entries: Map<String, Value>,
}

impl CanonicalConfig {
    /// Get a value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.entries.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Options of one top-level entry.
    pub fn entry(&self, name: &str) -> Option<&Map<String, Value>> {
        self.entries.get(name).and_then(|v| v.as_object())
    }

    pub fn core(&self) -> Option<&Map<String, Value>> {
        self.entry(CORE_KEY)
    }

    /// Top-level keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    pub fn to_json(&self) -> Result<String, ConvertError> {
        serde_json::to_string_pretty(&self.entries)
            .map_err(|e| ConvertError::Serialization(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ConvertError> {
        serde_yaml::to_string(&self.entries).map_err(|e| ConvertError::Serialization(e.to_string()))
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, ConvertError> {
        match format {
            OutputFormat::Yaml => self.to_yaml(),
            OutputFormat::Json => self.to_json(),
        }
    }

    pub fn write_to_file(&self, path: &Path, format: OutputFormat) -> Result<(), ConvertError> {
        fs::write(path, self.render(format)?)?;
        Ok(())
    }

    fn insert_section(&mut self, name: &str, options: Map<String, Value>) {
        let merged = match self.entries.remove(name) {
            Some(existing) => {
                warn!(section = name, "Duplicate section name in output, merging");
                deep_merge(existing, Value::Object(options))
            }
            None => Value::Object(options),
        };
        self.entries.insert(name.to_string(), merged);
    }
}

/// Runs the conversion pipeline over one legacy document.
pub struct ConfigAssembler<'a> {
    loader: &'a dyn SchemaLoader,
    classifier: SectionClassifier,
    namespace: String,
    core_section: String,
    directive_prefix: String,
}

impl<'a> ConfigAssembler<'a> {
    /// Assembler with built-in settings.
    pub fn new(loader: &'a dyn SchemaLoader) -> Self {
        Self::from_settings(loader, &ConverterSettings::default())
    }

    pub fn from_settings(loader: &'a dyn SchemaLoader, settings: &ConverterSettings) -> Self {
        Self {
            loader,
            classifier: SectionClassifier::builtin(),
            namespace: settings.namespace.clone(),
            core_section: settings.core_section.clone(),
            directive_prefix: settings.directive_prefix.clone(),
        }
    }

    pub fn classifier(&self) -> &SectionClassifier {
        &self.classifier
    }

    /// Parse and convert INI text.
    pub fn convert_str(&self, text: &str) -> Result<CanonicalConfig, ConvertError> {
        self.convert_document(&IniDocument::parse(text)?)
    }

    pub fn convert_document(&self, doc: &IniDocument) -> Result<CanonicalConfig, ConvertError> {
        let raw_sections = doc.raw_sections(&self.core_section)?;
        let core_items = if doc.has_section(&self.core_section) {
            doc.items(&self.core_section)?
        } else {
            Vec::new()
        };
        self.assemble(&raw_sections, &core_items)
    }

    /// Convert parsed sections.
    ///
    /// `core_items` are the core section's items with defaults included;
    /// directives are read from them. The `core` entry is built from the
    /// core [`RawSection`], which excludes defaults.
    pub fn assemble(
        &self,
        raw_sections: &[RawSection],
        core_items: &[(String, String)],
    ) -> Result<CanonicalConfig, ConvertError> {
        let sections = self.build_sections(raw_sections)?;
        let sections = combine_sections(sections)?;
        let sections = EnablementResolver::new(&self.classifier, &self.directive_prefix)
            .resolve(sections, core_items)?;

        let mut config = CanonicalConfig::default();
        for section in &sections {
            config.insert_section(section.name(), section.cfg_dict(true, &self.namespace));
        }

        let core_options = raw_sections
            .iter()
            .find(|s| s.is_core)
            .map(|s| s.options.as_slice())
            .unwrap_or_default();
        config
            .entries
            .insert(CORE_KEY.to_string(), Value::Object(self.core_entry(core_options)?));

        info!(
            raw_sections = raw_sections.len(),
            plugins = sections.len(),
            "Conversion complete"
        );
        Ok(config)
    }

    /// Classify and build every non-core section, in order.
    pub fn build_sections(&self, raw_sections: &[RawSection]) -> Result<Vec<Section>, ConvertError> {
        raw_sections
            .iter()
            .filter(|raw| !raw.is_core)
            .map(|raw| self.build_section(raw))
            .collect()
    }

    pub fn build_section(&self, raw: &RawSection) -> Result<Section, ConvertError> {
        let plugin = self.classifier.classify(&raw.name)?;
        debug!(section = %raw.name, plugin = %plugin, "Section classified");

        let schema = if raw.options.is_empty() {
            PluginSchema::default()
        } else {
            self.loader.load_plugin_schema(&plugin.package(&self.namespace))?
        };
        Ok(Section::from_raw(&raw.name, plugin, raw.options.clone(), &schema))
    }

    fn core_entry(&self, options: &[(String, String)]) -> Result<Map<String, Value>, ConvertError> {
        let options: Vec<&(String, String)> = options
            .iter()
            .filter(|(key, _)| !key.starts_with(&self.directive_prefix))
            .collect();
        if options.is_empty() {
            return Ok(Map::new());
        }

        let schema = self.loader.load_core_schema()?;
        let core = PluginId::new(CORE_KEY);
        Ok(fold_fragments(
            options
                .into_iter()
                .map(|(key, value)| coerce(&core, key, value, &schema)),
        ))
    }
}
