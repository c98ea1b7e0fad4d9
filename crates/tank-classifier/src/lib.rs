//! Section-name classifier for legacy load-test configs.
//!
//! Legacy INI files name their sections loosely (`phantom-2`, `meta`,
//! `monitoring`, ...). The classifier resolves such a name to the identifier
//! of the plugin it configures, using an ordered pattern table where the
//! first match wins.

mod patterns;
mod result;

pub use patterns::{map_legacy_package_path, SECTION_PATTERNS};
pub use result::{Classification, ClassifyError};

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Canonical identifier of a plugin in the target runtime (e.g. `Phantom`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified package name under the given namespace.
    pub fn package(&self, namespace: &str) -> String {
        format!("{}.{}", namespace, self.0)
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

struct Rule {
    plugin: PluginId,
    source: String,
    regex: Regex,
}

/// Ordered table of section-name rules.
pub struct SectionClassifier {
    rules: Vec<Rule>,
}

impl SectionClassifier {
    /// Build a classifier from `(plugin, pattern)` pairs.
    ///
    /// Patterns are anchored at the start of the name only.
    pub fn with_patterns(patterns: &[(&str, &str)]) -> Result<Self, ClassifyError> {
        let rules = patterns
            .iter()
            .map(|(plugin, pattern)| {
                let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
                    ClassifyError::InvalidPattern {
                        plugin: plugin.to_string(),
                        detail: e.to_string(),
                    }
                })?;
                Ok(Rule {
                    plugin: PluginId::new(*plugin),
                    source: pattern.to_string(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>, ClassifyError>>()?;
        Ok(Self { rules })
    }

    /// Classifier over the built-in legacy pattern table.
    pub fn builtin() -> Self {
        Self::with_patterns(SECTION_PATTERNS).expect("built-in section patterns compile")
    }

    /// Process-wide built-in classifier, compiled on first use.
    pub fn shared() -> &'static SectionClassifier {
        static BUILTIN: OnceLock<SectionClassifier> = OnceLock::new();
        BUILTIN.get_or_init(Self::builtin)
    }

    /// Resolve a section name to its plugin.
    pub fn classify(&self, section: &str) -> Result<PluginId, ClassifyError> {
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(section))
            .map(|rule| rule.plugin.clone())
            .ok_or_else(|| ClassifyError::UnrecognizedSection(section.to_string()))
    }

    /// Classify and report which rule decided.
    pub fn explain(&self, section: &str) -> Classification {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.regex.is_match(section))
            .map(|(index, rule)| {
                Classification::matched(section, rule.plugin.clone(), &rule.source, index)
            })
            .unwrap_or_else(|| Classification::unmatched(section))
    }

    /// Plugins known to the table, in priority order.
    pub fn plugins(&self) -> impl Iterator<Item = &PluginId> {
        self.rules.iter().map(|rule| &rule.plugin)
    }
}

impl Default for SectionClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Classify a section name against the built-in table.
pub fn classify(section: &str) -> Result<PluginId, ClassifyError> {
    SectionClassifier::shared().classify(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_builtin_patterns_compile() {
        assert!(SectionClassifier::with_patterns(SECTION_PATTERNS).is_ok());
    }

    #[test]
    fn test_classify_exact_names() {
        let classifier = SectionClassifier::builtin();
        assert_eq!(classifier.classify("phantom").unwrap().as_str(), "Phantom");
        assert_eq!(classifier.classify("aggregator").unwrap().as_str(), "Aggregator");
        assert_eq!(classifier.classify("rcassert").unwrap().as_str(), "RCAssert");
    }

    #[test]
    fn test_classify_aliases() {
        let classifier = SectionClassifier::builtin();
        assert_eq!(classifier.classify("meta").unwrap().as_str(), "DataUploader");
        assert_eq!(classifier.classify("overload").unwrap().as_str(), "DataUploader");
        assert_eq!(classifier.classify("monitoring").unwrap().as_str(), "Telegraf");
        assert_eq!(classifier.classify("ultimate_gun").unwrap().as_str(), "Bfg");
        assert_eq!(classifier.classify("scenario_gun").unwrap().as_str(), "Bfg");
    }

    #[test]
    fn test_classify_prefix_only() {
        let classifier = SectionClassifier::builtin();
        assert_eq!(classifier.classify("phantom-1").unwrap().as_str(), "Phantom");
        assert_eq!(classifier.classify("phantom2").unwrap().as_str(), "Phantom");
        assert_eq!(classifier.classify("bfg_second").unwrap().as_str(), "Bfg");
        // anchored at the start: a suffix match is not enough
        assert!(classifier.classify("my_phantom").is_err());
    }

    #[test]
    fn test_classify_unrecognized() {
        let err = SectionClassifier::builtin().classify("loadosophia").unwrap_err();
        assert_eq!(err, ClassifyError::UnrecognizedSection("loadosophia".to_string()));
    }

    #[test]
    fn test_first_match_wins() {
        let classifier =
            SectionClassifier::with_patterns(&[("First", "ab"), ("Second", "abc")]).unwrap();
        assert_eq!(classifier.classify("abc").unwrap().as_str(), "First");
    }

    #[test]
    fn test_invalid_pattern() {
        let result = SectionClassifier::with_patterns(&[("Broken", "(")]);
        assert!(matches!(result, Err(ClassifyError::InvalidPattern { .. })));
    }

    #[test]
    fn test_explain() {
        let classifier = SectionClassifier::builtin();
        let explained = classifier.explain("monitoring");
        assert_eq!(explained.plugin, Some(PluginId::new("Telegraf")));
        assert_eq!(explained.pattern.as_deref(), Some("telegraf|monitoring"));
        assert_eq!(explained.rule_index, Some(8));

        assert!(!classifier.explain("nope").is_match());
    }

    #[test]
    fn test_shared_classifier_compiled_once() {
        assert!(std::ptr::eq(SectionClassifier::shared(), SectionClassifier::shared()));
        assert_eq!(classify("overload").unwrap().as_str(), "DataUploader");
        assert_eq!(classify("overload").unwrap().as_str(), "DataUploader");
    }

    #[test]
    fn test_package() {
        assert_eq!(PluginId::new("Phantom").package("yandextank.plugins"), "yandextank.plugins.Phantom");
    }

    proptest! {
        #[test]
        fn prop_phantom_suffixes_resolve(suffix in "[a-z0-9_-]{0,12}") {
            let name = format!("phantom{}", suffix);
            let plugin = classify(&name).unwrap();
            prop_assert_eq!(plugin.as_str(), "Phantom");
        }

        #[test]
        fn prop_uppercase_names_unrecognized(name in "[A-Z][A-Z0-9]{0,10}") {
            prop_assert!(classify(&name).is_err());
        }
    }
}
