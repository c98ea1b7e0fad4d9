//! Conversion errors

use tank_classifier::ClassifyError;

use crate::config::SettingsError;
use crate::ini::IniError;
use crate::schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("INI error: {0}")]
    Ini(#[from] IniError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Plugin {plugin} takes a single child section, got: {}", sections.join(", "))]
    AmbiguousChildSections { plugin: String, sections: Vec<String> },

    #[error("No sections to combine for plugin {0}")]
    EmptyGroup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl ConvertError {
    /// Stable error code for machine-readable output.
    pub fn code(&self) -> String {
        match self {
            ConvertError::Classify(e) => e.to_code(),
            ConvertError::Ini(_) => "INI_ERROR".to_string(),
            ConvertError::Schema(_) => "SCHEMA_ERROR".to_string(),
            ConvertError::Settings(_) => "SETTINGS_ERROR".to_string(),
            ConvertError::AmbiguousChildSections { .. } => "AMBIGUOUS_CHILD_SECTIONS".to_string(),
            ConvertError::EmptyGroup(_) => "EMPTY_GROUP".to_string(),
            ConvertError::Io(_) => "IO_ERROR".to_string(),
            ConvertError::Serialization(_) => "SERIALIZATION_ERROR".to_string(),
            ConvertError::Logging(_) => "LOGGING_ERROR".to_string(),
        }
    }
}
