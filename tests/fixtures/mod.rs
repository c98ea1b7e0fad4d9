//! Test fixtures for end-to-end conversion
//!
//! - `ini/`: legacy INI files
//! - `schemas/`: per-plugin schemas in YAML, JSON and TOML
//! - `core_schema.yaml`: core schema nested under `core.schema`

use std::fs;
use std::path::{Path, PathBuf};
use tank_config_converter::DirSchemaLoader;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn ini_path(name: &str) -> PathBuf {
    fixtures_dir().join("ini").join(name)
}

pub fn schemas_dir() -> PathBuf {
    fixtures_dir().join("schemas")
}

pub fn core_schema_path() -> PathBuf {
    fixtures_dir().join("core_schema.yaml")
}

pub fn settings_path() -> PathBuf {
    fixtures_dir().join("settings.toml")
}

/// Read an INI fixture
pub fn load_ini(name: &str) -> String {
    fs::read_to_string(ini_path(name)).expect("Failed to read INI fixture")
}

/// Loader over the fixture schemas
pub fn fixture_loader() -> DirSchemaLoader {
    DirSchemaLoader::new(Some(schemas_dir()), Some(core_schema_path()))
}
