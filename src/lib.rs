//! Tank Config Converter - legacy INI to plugin config tree
//!
//! Reads a legacy load-testing tool's INI configuration and produces the
//! canonical plugin configuration: one entry per plugin section keyed by
//! canonical name, carrying typed options, package identity and enablement,
//! plus a `core` entry with the tool's own options.

pub mod config;
pub mod convert;
pub mod error;
pub mod ini;
pub mod logging;
pub mod schema;

pub use config::{ConverterSettings, OutputFormat};
pub use convert::{CanonicalConfig, ConfigAssembler, Section};
pub use error::ConvertError;
pub use ini::{IniDocument, RawSection};
pub use schema::{DirSchemaLoader, PluginSchema, SchemaLoader, StaticSchemaLoader};
pub use tank_classifier::{classify, Classification, ClassifyError, PluginId, SectionClassifier};
