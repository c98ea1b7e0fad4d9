//! Sections: one plugin's options after filtering, coercion and merge.

use serde_json::{Map, Value};
use tank_classifier::PluginId;
use tracing::warn;

use super::coerce::SectionOption;
use crate::config::fold_fragments;
use crate::schema::PluginSchema;

/// Options dropped per plugin because the runtime no longer accepts them.
const DEPRECATED_OPTIONS: &[(&str, &[&str])] = &[
    ("Aggregator", &["time_periods", "precise_cumulative"]),
    ("Phantom", &["stpd_file"]),
];

/// Legacy section names and their canonical replacements.
const SECTION_RENAMES: &[(&str, &str)] = &[("monitoring", "telegraf"), ("meta", "uploader")];

/// Canonical name of a section.
pub fn canonical_section_name(name: &str) -> String {
    SECTION_RENAMES
        .iter()
        .find(|(old, _)| *old == name)
        .map(|(_, new)| new.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Legacy section name a canonical name was renamed from, if any.
pub fn legacy_section_name(canonical: &str) -> Option<&'static str> {
    SECTION_RENAMES
        .iter()
        .find(|(_, new)| *new == canonical)
        .map(|(old, _)| *old)
}

pub fn is_option_deprecated(plugin: &PluginId, option: &str) -> bool {
    DEPRECATED_OPTIONS
        .iter()
        .find(|(p, _)| *p == plugin.as_str())
        .map(|(_, names)| names.contains(&option))
        .unwrap_or(false)
}

/// Drop deprecated options, warning once per dropped option.
pub fn without_deprecated(
    plugin: &PluginId,
    options: Vec<(String, String)>,
) -> Vec<(String, String)> {
    options
        .into_iter()
        .filter(|(name, _)| {
            let deprecated = is_option_deprecated(plugin, name);
            if deprecated {
                warn!(plugin = %plugin, option = %name, "Deprecated option, omitting");
            }
            !deprecated
        })
        .collect()
}

/// One logical plugin configuration block.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    init_name: String,
    name: String,
    plugin: PluginId,
    options: Vec<SectionOption>,
    enabled: Option<bool>,
    merged: Map<String, Value>,
}

impl Section {
    /// Build a section from already filtered options.
    ///
    /// The merged options are computed here, once.
    pub fn new(init_name: &str, plugin: PluginId, options: Vec<SectionOption>) -> Self {
        let merged = fold_fragments(options.iter().map(|o| o.converted().clone()));
        Self {
            init_name: init_name.to_string(),
            name: canonical_section_name(init_name),
            plugin,
            options,
            enabled: None,
            merged,
        }
    }

    /// Filter deprecated options and convert the rest against `schema`.
    pub fn from_raw(
        init_name: &str,
        plugin: PluginId,
        raw_options: Vec<(String, String)>,
        schema: &PluginSchema,
    ) -> Self {
        let options = without_deprecated(&plugin, raw_options)
            .iter()
            .map(|(name, value)| SectionOption::new(&plugin, name, value, schema))
            .collect();
        Self::new(init_name, plugin, options)
    }

    /// An option-less section carrying only an enablement flag.
    pub fn synthetic(plugin: PluginId, enabled: bool) -> Self {
        let init_name = plugin.as_str().to_lowercase();
        let mut section = Self::new(&init_name, plugin, Vec::new());
        section.enabled = Some(enabled);
        section
    }

    pub fn init_name(&self) -> &str {
        &self.init_name
    }

    /// Canonical (renamed) section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin(&self) -> &PluginId {
        &self.plugin
    }

    pub fn options(&self) -> &[SectionOption] {
        &self.options
    }

    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = Some(enabled);
    }

    pub fn merged_options(&self) -> &Map<String, Value> {
        &self.merged
    }

    /// Attach nested data (combined child sections) to the merged options.
    pub fn attach(&mut self, key: &str, value: Value) {
        self.merged.insert(key.to_string(), value);
    }

    /// The section's output mapping.
    ///
    /// With `with_meta`, adds `package` and, when set, `enabled`.
    pub fn cfg_dict(&self, with_meta: bool, namespace: &str) -> Map<String, Value> {
        let mut dict = self.merged.clone();
        if with_meta {
            dict.insert(
                "package".to_string(),
                Value::String(self.plugin.package(namespace)),
            );
            if let Some(enabled) = self.enabled {
                dict.insert("enabled".to_string(), Value::Bool(enabled));
            }
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_section_name("monitoring"), "telegraf");
        assert_eq!(canonical_section_name("meta"), "uploader");
        assert_eq!(canonical_section_name("phantom"), "phantom");
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(legacy_section_name("uploader"), Some("meta"));
        assert_eq!(legacy_section_name("telegraf"), Some("monitoring"));
        assert_eq!(legacy_section_name("phantom"), None);
    }

    #[test]
    fn test_without_deprecated_length() {
        let aggregator = PluginId::new("Aggregator");
        let options = opts(&[
            ("time_periods", "1 2 3"),
            ("verbose_histogram", "1"),
            ("precise_cumulative", "0"),
        ]);
        let kept = without_deprecated(&aggregator, options.clone());
        assert_eq!(kept.len(), options.len() - 2);
        assert_eq!(kept[0].0, "verbose_histogram");
    }

    #[test]
    fn test_deprecated_is_per_plugin() {
        let console = PluginId::new("Console");
        let kept = without_deprecated(&console, opts(&[("stpd_file", "x")]));
        assert_eq!(kept.len(), 1);
        assert!(is_option_deprecated(&PluginId::new("Phantom"), "stpd_file"));
    }

    #[test]
    fn test_from_raw_merges_in_order() {
        let schema = PluginSchema::new().with_option("use_caching", json!({"type": "boolean"}));
        let section = Section::from_raw(
            "phantom",
            PluginId::new("Phantom"),
            opts(&[
                ("stpd_file", "old.stpd"),
                ("rps_schedule", "const(1,1m)"),
                ("use_caching", "0"),
                ("instances_schedule", "line(1,5,1m)"),
            ]),
            &schema,
        );

        assert_eq!(section.options().len(), 3);
        assert_eq!(
            Value::Object(section.merged_options().clone()),
            json!({
                "load_profile": {"load_type": "instances", "schedule": "line(1,5,1m)"},
                "use_caching": false
            })
        );
    }

    #[test]
    fn test_renamed_section() {
        let section = Section::from_raw(
            "meta",
            PluginId::new("DataUploader"),
            opts(&[("job_name", "x")]),
            &PluginSchema::new(),
        );
        assert_eq!(section.init_name(), "meta");
        assert_eq!(section.name(), "uploader");
        assert_eq!(section.merged_options()["meta"]["job_name"], "x");
    }

    #[test]
    fn test_cfg_dict_meta() {
        let mut section = Section::from_raw(
            "console",
            PluginId::new("Console"),
            opts(&[("short_only", "1")]),
            &PluginSchema::new(),
        );

        let bare = section.cfg_dict(false, "yandextank.plugins");
        assert!(!bare.contains_key("package"));

        let with_meta = section.cfg_dict(true, "yandextank.plugins");
        assert_eq!(with_meta["package"], "yandextank.plugins.Console");
        assert!(!with_meta.contains_key("enabled"));

        section.set_enabled(false);
        assert_eq!(section.cfg_dict(true, "yandextank.plugins")["enabled"], false);
    }

    #[test]
    fn test_synthetic() {
        let section = Section::synthetic(PluginId::new("DataUploader"), true);
        assert_eq!(section.name(), "datauploader");
        assert_eq!(section.enabled(), Some(true));
        assert!(section.merged_options().is_empty());
    }
}
