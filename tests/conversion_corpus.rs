//! Conversion corpus tests
//!
//! Each test converts a legacy INI fixture against the fixture schemas and
//! checks the resulting plugin config tree.

mod fixtures;

use fixtures::{fixture_loader, load_ini, settings_path};
use serde_json::{json, Value};
use tank_config_converter::{
    CanonicalConfig, ConfigAssembler, ConvertError, ConverterSettings, DirSchemaLoader,
    OutputFormat, StaticSchemaLoader,
};
use tempfile::TempDir;

fn convert(name: &str) -> Result<CanonicalConfig, ConvertError> {
    let loader = fixture_loader();
    ConfigAssembler::new(&loader).convert_str(&load_ini(name))
}

fn entry(config: &CanonicalConfig, name: &str) -> Value {
    Value::Object(config.entry(name).cloned().unwrap_or_default())
}

// =============================================================================
// Full legacy config
// =============================================================================

#[test]
fn test_full_config_top_level_keys() {
    let config = convert("full.ini").unwrap();
    let keys: Vec<&str> = config.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "aggregator",
            "autostop",
            "console",
            "core",
            "phantom",
            "resourcecheck",
            "telegraf",
            "tipsandtricks",
            "uploader",
        ]
    );
}

#[test]
fn test_full_config_phantom() {
    let config = convert("full.ini").unwrap();
    assert_eq!(
        entry(&config, "phantom"),
        json!({
            "address": "example.org:80",
            "load_profile": {"load_type": "rps", "schedule": "line(1,10,1m) const(10,5m)"},
            "use_caching": false,
            "ammofile": "/var/tank/ammo.txt",
            "package": "yandextank.plugins.Phantom"
        })
    );
}

#[test]
fn test_full_config_uploader_renamed_and_enabled() {
    let config = convert("full.ini").unwrap();
    assert_eq!(
        entry(&config, "uploader"),
        json!({
            "job_name": "smoke",
            "meta": {"operator": "alice"},
            "ignore_target_lock": true,
            "enabled": true,
            "package": "yandextank.plugins.DataUploader"
        })
    );
    assert!(config.entry("meta").is_none());
}

#[test]
fn test_full_config_deprecated_options_dropped() {
    let config = convert("full.ini").unwrap();
    assert_eq!(
        entry(&config, "aggregator"),
        json!({
            "verbose_histogram": true,
            "package": "yandextank.plugins.Aggregator"
        })
    );
    assert!(config.get("phantom.stpd_file").is_none());
}

#[test]
fn test_full_config_monitoring_becomes_telegraf() {
    let config = convert("full.ini").unwrap();
    assert_eq!(
        entry(&config, "telegraf"),
        json!({
            "config": "monitoring.xml",
            "disguise_hostnames": false,
            "package": "yandextank.plugins.Telegraf"
        })
    );
}

#[test]
fn test_full_config_toml_schema_and_raw_fallbacks() {
    let config = convert("full.ini").unwrap();
    let console = entry(&config, "console");
    assert_eq!(console["short_only"], false);
    // integer type, non-integer value
    assert_eq!(console["info_panel_width"], "wide");
    // descriptor without a type
    assert_eq!(console["disable_all_colors"], "1");
    assert_eq!(console["enabled"], true);
}

#[test]
fn test_full_config_synthetic_sections() {
    let config = convert("full.ini").unwrap();
    assert_eq!(
        entry(&config, "autostop"),
        json!({"enabled": false, "package": "yandextank.plugins.Autostop"})
    );
    assert_eq!(
        entry(&config, "resourcecheck"),
        json!({"enabled": false, "package": "yandextank.plugins.ResourceCheck"})
    );
    assert_eq!(
        entry(&config, "tipsandtricks"),
        json!({"enabled": true, "package": "yandextank.plugins.TipsAndTricks"})
    );
}

#[test]
fn test_full_config_core_entry() {
    let config = convert("full.ini").unwrap();
    assert_eq!(
        entry(&config, "core"),
        json!({
            "artifacts_base_dir": "/var/tank/logs",
            "ignore_lock": true
        })
    );
}

// =============================================================================
// Combinable plugins
// =============================================================================

#[test]
fn test_multi_phantom_list() {
    let config = convert("multi_phantom.ini").unwrap();
    assert_eq!(config.len(), 2);
    assert_eq!(
        entry(&config, "phantom"),
        json!({
            "address": "main.example.org",
            "load_profile": {"load_type": "rps", "schedule": "const(100,10m)"},
            "threads": 8,
            "multi": [
                {
                    "address": "one.example.org",
                    "load_profile": {"load_type": "instances", "schedule": "line(1,5,1m)"}
                },
                {
                    "address": "two.example.org",
                    "use_caching": true
                }
            ],
            "package": "yandextank.plugins.Phantom"
        })
    );
}

#[test]
fn test_bfg_gun_config() {
    let config = convert("bfg.ini").unwrap();
    assert_eq!(
        entry(&config, "bfg"),
        json!({
            "instances": 20,
            "load_profile": {"load_type": "rps", "schedule": "const(5,1m)"},
            "gun_type": "ultimate",
            "gun_config": {"module_path": "./gun", "module_name": "mygun"},
            "package": "yandextank.plugins.Bfg"
        })
    );
    assert!(config.entry("ultimate_gun").is_none());
}

#[test]
fn test_bfg_with_two_guns_fails() {
    match convert("bfg_ambiguous.ini") {
        Err(ConvertError::AmbiguousChildSections { plugin, sections }) => {
            assert_eq!(plugin, "Bfg");
            assert_eq!(sections, vec!["ultimate_gun", "http_gun"]);
        }
        other => panic!("expected AmbiguousChildSections, got {:?}", other),
    }
}

// =============================================================================
// Failures and dialect
// =============================================================================

#[test]
fn test_unknown_section_aborts() {
    let err = convert("unknown_section.ini").unwrap_err();
    assert_eq!(err.code(), "UNRECOGNIZED_SECTION:loadosophia");
}

#[test]
fn test_continuation_lines_joined() {
    let config = convert("continuation.ini").unwrap();
    assert_eq!(
        config.get("autostop.autostop"),
        Some(&json!("time(1s,10s)\nhttp(5xx,10%,3s)\nnet(xx,1,30)"))
    );
    assert_eq!(config.get("autostop.report_file"), Some(&json!("autostop.log")));
}

#[test]
fn test_empty_input() {
    let loader = StaticSchemaLoader::new();
    let config = ConfigAssembler::new(&loader).convert_str("").unwrap();
    assert_eq!(config.into_value(), json!({"core": {}}));
}

#[test]
fn test_missing_schema_dir_passes_strings_through() {
    let loader = DirSchemaLoader::default();
    let config = ConfigAssembler::new(&loader)
        .convert_str("[phantom]\nuse_caching = 1\nthreads = 4\n")
        .unwrap();
    assert_eq!(config.get("phantom.use_caching"), Some(&json!("1")));
    assert_eq!(config.get("phantom.threads"), Some(&json!("4")));
}

// =============================================================================
// Settings and output
// =============================================================================

#[test]
fn test_settings_file_selects_json_output() {
    let settings = ConverterSettings::build(Some(&settings_path()), None).unwrap();
    assert_eq!(settings.output_format().unwrap(), OutputFormat::Json);

    let loader = fixture_loader();
    let config = ConfigAssembler::from_settings(&loader, &settings)
        .convert_str(&load_ini("bfg.ini"))
        .unwrap();

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("load.json");
    config.write_to_file(&out, settings.output_format().unwrap()).unwrap();

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written, config.into_value());
}

#[test]
fn test_yaml_output_reparses() {
    let config = convert("multi_phantom.ini").unwrap();
    let yaml = config.to_yaml().unwrap();
    let reparsed: Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(reparsed, config.into_value());
}
