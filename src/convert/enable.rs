//! Core-section `plugin_<name>` directives.
//!
//! Each directive enables or disables one plugin. A directive is consumed by
//! at most one existing section; directives left over name plugins without
//! a section and become option-less synthetic sections.

use std::collections::BTreeMap;

use tank_classifier::{map_legacy_package_path, ClassifyError, PluginId, SectionClassifier};
use tracing::{debug, warn};

use super::section::{legacy_section_name, Section};
use crate::error::ConvertError;

const TRUE_LITERALS: &[&str] = &["true", "yes", "on"];
const FALSE_LITERALS: &[&str] = &["false", "no", "off"];

/// Whether a directive value is a plain flag rather than a package path.
fn is_flag_literal(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.parse::<i64>().is_ok()
        || TRUE_LITERALS.iter().any(|l| value.eq_ignore_ascii_case(l))
        || FALSE_LITERALS.iter().any(|l| value.eq_ignore_ascii_case(l))
}

/// Whether a directive enables its plugin.
///
/// Empty, zero and `false`/`no`/`off` disable; integers enable when
/// non-zero; anything else (typically a package path) enables.
pub fn directive_flag(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if let Ok(n) = value.parse::<i64>() {
        return n != 0;
    }
    !FALSE_LITERALS.iter().any(|l| value.eq_ignore_ascii_case(l))
}

/// Ordered multiset of plugin identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveTally {
    order: Vec<PluginId>,
    counts: BTreeMap<PluginId, usize>,
}

impl DirectiveTally {
    pub fn add(&mut self, plugin: PluginId) {
        *self.counts.entry(plugin.clone()).or_insert(0) += 1;
        if !self.order.contains(&plugin) {
            self.order.push(plugin);
        }
    }

    /// Consume one directive for `plugin`, if any is outstanding.
    pub fn take(&mut self, plugin: &PluginId) -> bool {
        match self.counts.get_mut(plugin) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn count(&self, plugin: &PluginId) -> usize {
        self.counts.get(plugin).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|c| *c == 0)
    }

    /// Outstanding directives, in first-directive order.
    pub fn leftovers(&self) -> Vec<PluginId> {
        self.order
            .iter()
            .flat_map(|p| std::iter::repeat(p.clone()).take(self.count(p)))
            .collect()
    }
}

/// Enable and disable directives of one core section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub enabled: DirectiveTally,
    pub disabled: DirectiveTally,
}

/// Reconciles directives with the parsed sections.
pub struct EnablementResolver<'a> {
    classifier: &'a SectionClassifier,
    prefix: &'a str,
}

impl<'a> EnablementResolver<'a> {
    pub fn new(classifier: &'a SectionClassifier, prefix: &'a str) -> Self {
        Self { classifier, prefix }
    }

    /// Collect directives from core items.
    pub fn directives(&self, core_options: &[(String, String)]) -> Result<Directives, ConvertError> {
        let mut directives = Directives::default();

        for (key, value) in core_options {
            let Some(name) = key.strip_prefix(self.prefix) else {
                continue;
            };
            if directive_flag(value) {
                let plugin = if is_flag_literal(value) {
                    self.classify_name(name).unwrap_or_else(|_| {
                        warn!(directive = %key, "Unrecognized plugin name, using it as the package name");
                        map_legacy_package_path(name)
                    })
                } else {
                    map_legacy_package_path(value.trim())
                };
                debug!(directive = %key, plugin = %plugin, "Plugin enabled");
                directives.enabled.add(plugin);
            } else {
                let plugin = self.classify_name(name)?;
                debug!(directive = %key, plugin = %plugin, "Plugin disabled");
                directives.disabled.add(plugin);
            }
        }

        Ok(directives)
    }

    /// Classify a directive's name portion.
    ///
    /// Canonical output names (`uploader`) resolve through the legacy
    /// section name they replaced.
    fn classify_name(&self, name: &str) -> Result<PluginId, ClassifyError> {
        self.classifier.classify(name).or_else(|err| match legacy_section_name(name) {
            Some(legacy) => self.classifier.classify(legacy),
            None => Err(err),
        })
    }

    /// Apply core directives to `sections`.
    pub fn resolve(
        &self,
        sections: Vec<Section>,
        core_options: &[(String, String)],
    ) -> Result<Vec<Section>, ConvertError> {
        Ok(apply_directives(sections, self.directives(core_options)?))
    }
}

/// Mark sections and append synthetic ones for leftover directives.
///
/// Synthetic sections come enabled-first, then disabled.
pub fn apply_directives(mut sections: Vec<Section>, mut directives: Directives) -> Vec<Section> {
    for section in sections.iter_mut() {
        let plugin = section.plugin().clone();
        if directives.enabled.take(&plugin) {
            section.set_enabled(true);
        }
        if directives.disabled.take(&plugin) {
            section.set_enabled(false);
        }
    }

    for plugin in directives.enabled.leftovers() {
        sections.push(Section::synthetic(plugin, true));
    }
    for plugin in directives.disabled.leftovers() {
        sections.push(Section::synthetic(plugin, false));
    }
    sections
}
