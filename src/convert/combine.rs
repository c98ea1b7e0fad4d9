//! Folding several raw sections of a multi-instance plugin into one.

use serde_json::Value;
use tank_classifier::PluginId;
use tracing::{debug, warn};

use super::section::Section;
use crate::error::ConvertError;

/// How child sections hang off the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    /// All children, in order, as a list under the child key.
    List,
    /// Exactly one child under the child key.
    SingleNamedChild,
}

/// Combination rule of one combinable plugin.
#[derive(Debug, Clone, Copy)]
pub struct CombineRule {
    pub plugin: &'static str,
    /// Canonical name of the preferred master section.
    pub parent_name: &'static str,
    pub child_key: &'static str,
    pub mode: CombineMode,
}

pub const COMBINABLE_PLUGINS: &[CombineRule] = &[
    CombineRule {
        plugin: "Phantom",
        parent_name: "phantom",
        child_key: "multi",
        mode: CombineMode::List,
    },
    CombineRule {
        plugin: "Bfg",
        parent_name: "bfg",
        child_key: "gun_config",
        mode: CombineMode::SingleNamedChild,
    },
];

pub fn combine_rule(plugin: &PluginId) -> Option<&'static CombineRule> {
    COMBINABLE_PLUGINS.iter().find(|r| r.plugin == plugin.as_str())
}

enum Group {
    Combinable(&'static CombineRule, Vec<Section>),
    Single(Section),
}

/// Combine sections per plugin, keeping first-appearance order.
pub fn combine_sections(sections: Vec<Section>) -> Result<Vec<Section>, ConvertError> {
    let mut groups: Vec<(PluginId, Group)> = Vec::new();

    for section in sections {
        let plugin = section.plugin().clone();
        match groups.iter().position(|(p, _)| *p == plugin) {
            Some(index) => match &mut groups[index].1 {
                Group::Combinable(_, members) => members.push(section),
                Group::Single(existing) => {
                    warn!(
                        plugin = %plugin,
                        replaced = existing.init_name(),
                        by = section.init_name(),
                        "Plugin configured by more than one section, keeping the last"
                    );
                    *existing = section;
                }
            },
            None => {
                let group = match combine_rule(&plugin) {
                    Some(rule) => Group::Combinable(rule, vec![section]),
                    None => Group::Single(section),
                };
                groups.push((plugin, group));
            }
        }
    }

    groups
        .into_iter()
        .map(|(_, group)| match group {
            Group::Combinable(rule, members) => combine_group(members, rule),
            Group::Single(section) => Ok(section),
        })
        .collect()
}

/// Fold one plugin's sections into a master section.
///
/// Fails with [`ConvertError::EmptyGroup`] when `sections` is empty.
pub fn combine_group(
    mut sections: Vec<Section>,
    rule: &CombineRule,
) -> Result<Section, ConvertError> {
    if sections.len() <= 1 {
        return sections.pop().ok_or_else(|| ConvertError::EmptyGroup(rule.plugin.to_string()));
    }

    let master_index = sections
        .iter()
        .position(|s| s.name() == rule.parent_name)
        .unwrap_or(0);
    let mut master = sections.remove(master_index);
    let children = sections;

    debug!(
        plugin = rule.plugin,
        master = master.init_name(),
        children = children.len(),
        "Combining sections"
    );

    let child_value = match rule.mode {
        CombineMode::List => Value::Array(
            children
                .iter()
                .map(|c| Value::Object(c.merged_options().clone()))
                .collect(),
        ),
        CombineMode::SingleNamedChild => {
            if children.len() > 1 {
                return Err(ConvertError::AmbiguousChildSections {
                    plugin: rule.plugin.to_string(),
                    sections: children.iter().map(|c| c.init_name().to_string()).collect(),
                });
            }
            Value::Object(children[0].merged_options().clone())
        }
    };

    master.attach(rule.child_key, child_value);
    Ok(master)
}
