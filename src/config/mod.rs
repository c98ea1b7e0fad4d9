//! Converter configuration
//!
//! Holds the deep merge shared by the conversion pipeline and the tool's
//! own layered settings:
//! 1. Built-in defaults
//! 2. Settings file (TOML)
//! 3. CLI flags

mod defaults;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use merge::{deep_merge, fold_fragments, merge_layers, merge_maps};
pub use settings::{
    ConverterSettings, LogSettings, OutputFormat, OutputSettings, SettingsError, SettingsOrigin,
    SettingsSource,
};

pub(crate) use settings::toml_to_json;
