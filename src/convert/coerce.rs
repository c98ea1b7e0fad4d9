//! Option coercion
//!
//! Turns a raw `(name, value)` string pair into a converted fragment: a
//! mapping that is deep-merged into the owning section. Most options become
//! `{name: typed_value}`, but special converters may expand one option into
//! nested structure.
//!
//! Resolution order, first applicable wins:
//! 1. plugin+option special converter
//! 2. plugin fallback for options missing from the schema
//! 3. schema-driven `boolean` / `integer` coercion, raw string otherwise

use serde_json::{json, Map, Value};
use tank_classifier::PluginId;
use tracing::{debug, warn};

use crate::schema::{OptionType, PluginSchema, SchemaEntry};

/// Converter from `(name, raw value)` to a fragment.
type Converter = fn(&str, &str) -> Value;

/// Plugin + option specific converters.
const SPECIAL_CONVERTERS: &[(&str, &str, Converter)] = &[
    ("Phantom", "rps_schedule", rps_schedule),
    ("Phantom", "instances_schedule", instances_schedule),
    ("Bfg", "rps_schedule", rps_schedule),
    ("Bfg", "instances_schedule", instances_schedule),
];

/// Per-plugin converters for options the schema does not list.
const UNKNOWN_OPTION_CONVERTERS: &[(&str, Converter)] = &[("DataUploader", wrap_in_meta)];

fn rps_schedule(_name: &str, value: &str) -> Value {
    load_profile("rps", value)
}

fn instances_schedule(_name: &str, value: &str) -> Value {
    load_profile("instances", value)
}

fn load_profile(load_type: &str, schedule: &str) -> Value {
    json!({
        "load_profile": {
            "load_type": load_type,
            "schedule": schedule
        }
    })
}

fn wrap_in_meta(name: &str, value: &str) -> Value {
    single("meta", single(name, Value::String(value.to_string())))
}

fn passthrough(name: &str, value: &str) -> Value {
    single(name, Value::String(value.to_string()))
}

fn single(name: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), value);
    Value::Object(map)
}

/// The schema does not list the option.
struct UnknownOption;

/// Legacy boolean parsing.
///
/// Integers are truthy when non-zero; otherwise only a case-insensitive
/// `false` is false. Every other string, `"yes"`, `"no"` and `""` included,
/// is true.
pub fn to_bool(raw: &str) -> bool {
    let value = raw.trim();
    if is_integer_literal(value) {
        return value.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    }
    !value.eq_ignore_ascii_case("false")
}

/// Optional sign followed by at least one ASCII digit.
fn is_integer_literal(value: &str) -> bool {
    let digits = value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse an integer option, `None` when the value is not an integer.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if !is_integer_literal(value) {
        return None;
    }
    value.parse().ok()
}

/// Coerce one option into its fragment. Never fails.
pub fn coerce(plugin: &PluginId, name: &str, raw: &str, schema: &PluginSchema) -> Value {
    if let Some(converter) = special_converter(plugin, name) {
        debug!(plugin = %plugin, option = name, "Applying special converter");
        return converter(name, raw);
    }

    match schema_converted(plugin, name, raw, schema) {
        Ok(fragment) => fragment,
        Err(UnknownOption) => {
            let converter = UNKNOWN_OPTION_CONVERTERS
                .iter()
                .find(|(p, _)| *p == plugin.as_str())
                .map(|(_, c)| *c)
                .unwrap_or(passthrough);
            converter(name, raw)
        }
    }
}

fn special_converter(plugin: &PluginId, name: &str) -> Option<Converter> {
    SPECIAL_CONVERTERS
        .iter()
        .find(|(p, o, _)| *p == plugin.as_str() && *o == name)
        .map(|(_, _, c)| *c)
}

fn schema_converted(
    plugin: &PluginId,
    name: &str,
    raw: &str,
    schema: &PluginSchema,
) -> Result<Value, UnknownOption> {
    let value = match schema.entry(name) {
        SchemaEntry::Missing => {
            warn!(plugin = %plugin, option = name, "Unknown option");
            return Err(UnknownOption);
        }
        SchemaEntry::Untyped => {
            warn!(plugin = %plugin, option = name, "No type specified in schema");
            Value::String(raw.to_string())
        }
        SchemaEntry::Typed(OptionType::Boolean) => Value::Bool(to_bool(raw)),
        SchemaEntry::Typed(OptionType::Integer) => match parse_integer(raw) {
            Some(n) => Value::from(n),
            None => {
                warn!(plugin = %plugin, option = name, value = raw, "Not an integer, keeping raw value");
                Value::String(raw.to_string())
            }
        },
        SchemaEntry::Typed(OptionType::Other(tag)) => {
            debug!(plugin = %plugin, option = name, schema_type = %tag, "Keeping raw value");
            Value::String(raw.to_string())
        }
    };
    Ok(single(name, value))
}

/// One option of a section with its converted fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOption {
    plugin: PluginId,
    name: String,
    raw_value: String,
    converted: Value,
}

impl SectionOption {
    /// Create an option, converting it once against `schema`.
    pub fn new(plugin: &PluginId, name: &str, raw_value: &str, schema: &PluginSchema) -> Self {
        Self {
            plugin: plugin.clone(),
            name: name.to_string(),
            raw_value: raw_value.to_string(),
            converted: coerce(plugin, name, raw_value, schema),
        }
    }

    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// The converted fragment.
    pub fn converted(&self) -> &Value {
        &self.converted
    }
}
