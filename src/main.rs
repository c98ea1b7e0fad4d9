//! Tank Config Converter CLI
//!
//! Entry point for the `tank-convert` command-line tool.

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tank_config_converter::logging::init_logging;
use tank_config_converter::{
    ConfigAssembler, ConverterSettings, DirSchemaLoader, IniDocument, RawSection,
    SectionClassifier,
};

#[derive(Parser)]
#[command(name = "tank-convert")]
#[command(about = "Convert legacy INI load-test configs to the plugin config tree", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a legacy INI file
    Convert {
        /// Legacy INI file
        input: PathBuf,

        /// Directory of per-plugin schema files (<Plugin>.yaml|json|toml)
        #[arg(long, short = 's')]
        schemas: Option<PathBuf>,

        /// Core schema file
        #[arg(long)]
        core_schema: Option<PathBuf>,

        /// Converter settings file (TOML)
        #[arg(long, short = 'c')]
        settings: Option<PathBuf>,

        /// Output format: yaml or json
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Write output to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Log level (overrides settings; TANK_CONVERT_LOG wins over both)
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Show which plugin a section name maps to
    Classify {
        /// Section names
        #[arg(required = true)]
        names: Vec<String>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// Show the merged converter settings and where each layer came from
    Settings {
        /// Converter settings file (TOML)
        #[arg(long, short = 'c')]
        settings: Option<PathBuf>,

        /// Directory of per-plugin schema files
        #[arg(long, short = 's')]
        schemas: Option<PathBuf>,

        /// Core schema file
        #[arg(long)]
        core_schema: Option<PathBuf>,

        /// Output format: yaml or json
        #[arg(long, short = 'f')]
        format: Option<String>,
    },

    /// List the sections of an INI file with their plugin and options
    Sections {
        /// Legacy INI file
        input: PathBuf,

        /// Converter settings file (TOML)
        #[arg(long, short = 'c')]
        settings: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            schemas,
            core_schema,
            settings,
            format,
            output,
            log_level,
        } => {
            let overrides = cli_overrides(schemas, core_schema, format, log_level);
            run_convert(&input, settings.as_deref(), overrides, output.as_deref());
        }
        Commands::Classify { names, human } => {
            run_classify(&names, human);
        }
        Commands::Settings {
            settings,
            schemas,
            core_schema,
            format,
        } => {
            let overrides = cli_overrides(schemas, core_schema, format, None);
            run_settings(settings.as_deref(), overrides);
        }
        Commands::Sections { input, settings } => {
            run_sections(&input, settings.as_deref());
        }
    }
}

/// Collect CLI flags into a settings layer.
fn cli_overrides(
    schemas: Option<PathBuf>,
    core_schema: Option<PathBuf>,
    format: Option<String>,
    log_level: Option<String>,
) -> Option<Value> {
    let mut layer = Map::new();
    if let Some(dir) = schemas {
        layer.insert("schema_dir".to_string(), json!(dir));
    }
    if let Some(path) = core_schema {
        layer.insert("core_schema".to_string(), json!(path));
    }
    if let Some(format) = format {
        layer.insert("output".to_string(), json!({ "format": format }));
    }
    if let Some(level) = log_level {
        layer.insert("log".to_string(), json!({ "level": level }));
    }

    if layer.is_empty() {
        None
    } else {
        Some(Value::Object(layer))
    }
}

fn load_settings(path: Option<&Path>, overrides: Option<Value>) -> ConverterSettings {
    let settings = match ConverterSettings::build(path, overrides) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&settings.log) {
        eprintln!("Warning: {}", e);
    }
    settings
}

fn load_document(path: &Path) -> IniDocument {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    match IniDocument::parse(&text) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn run_convert(
    input: &Path,
    settings_path: Option<&Path>,
    overrides: Option<Value>,
    output: Option<&Path>,
) {
    let settings = load_settings(settings_path, overrides);
    let format = match settings.output_format() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let doc = load_document(input);
    let loader = DirSchemaLoader::new(settings.schema_dir.clone(), settings.core_schema.clone());
    let assembler = ConfigAssembler::from_settings(&loader, &settings);

    let config = match assembler.convert_document(&doc) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Conversion failed [{}]: {}", e.code(), e);
            process::exit(1);
        }
    };

    let result = match output {
        Some(path) => config.write_to_file(path, format),
        None => config.render(format).map(|text| print!("{}", text)),
    };
    if let Err(e) = result {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn run_classify(names: &[String], human: bool) {
    let classifier = SectionClassifier::builtin();
    let results: Vec<_> = names.iter().map(|n| classifier.explain(n)).collect();

    if human {
        for result in &results {
            println!("{}", result.to_human());
        }
    } else {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }

    if results.iter().all(|r| r.is_match()) {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn run_settings(settings_path: Option<&Path>, overrides: Option<Value>) {
    let settings = load_settings(settings_path, overrides);
    match settings.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing settings: {}", e);
            process::exit(1);
        }
    }
}

/// One row of `sections` output.
#[derive(Serialize)]
struct SectionListing {
    #[serde(flatten)]
    section: RawSection,
    /// Resolved plugin, absent for the core section and unmatched names
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<String>,
}

fn run_sections(input: &Path, settings_path: Option<&Path>) {
    let settings = load_settings(settings_path, None);
    let doc = load_document(input);

    let sections = match doc.raw_sections(&settings.core_section) {
        Ok(sections) => sections,
        Err(e) => {
            eprintln!("Error reading sections: {}", e);
            process::exit(1);
        }
    };

    let classifier = SectionClassifier::builtin();
    let listing: Vec<SectionListing> = sections
        .into_iter()
        .map(|section| SectionListing {
            plugin: if section.is_core {
                None
            } else {
                classifier.explain(&section.name).plugin.map(|p| p.to_string())
            },
            section,
        })
        .collect();

    match serde_json::to_string_pretty(&listing) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
