//! Legacy INI documents
//!
//! The legacy configuration is an ordered list of sections of key/value
//! pairs, plus a file-level `[DEFAULT]` table whose entries show up in every
//! section's items but never count as the section's own options.

mod parser;

pub use parser::{parse_ini, DEFAULT_SECTION};

use serde::Serialize;

/// Maximum nesting of `%(name)s` references.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// INI errors
#[derive(Debug, thiserror::Error)]
pub enum IniError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("no section: {0}")]
    NoSection(String),

    #[error("[{section}] {option}: reference to missing option '{reference}'")]
    MissingReference {
        section: String,
        option: String,
        reference: String,
    },

    #[error("[{section}] {option}: interpolation nested deeper than {}", MAX_INTERPOLATION_DEPTH)]
    InterpolationDepth { section: String, option: String },
}

/// One parsed section as handed to the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSection {
    pub name: String,
    /// Own options in file order, default-table keys excluded.
    pub options: Vec<(String, String)>,
    pub is_core: bool,
}

#[derive(Debug, Clone, Default)]
struct IniSection {
    name: String,
    options: Vec<(String, String)>,
}

/// Parsed INI file.
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    defaults: Vec<(String, String)>,
    sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Result<Self, IniError> {
        parse_ini(text)
    }

    /// The `[DEFAULT]` table, uninterpolated.
    pub fn defaults(&self) -> &[(String, String)] {
        &self.defaults
    }

    /// Section names in file order, `DEFAULT` excluded.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// A section's own options, uninterpolated.
    pub fn own_options(&self, name: &str) -> Option<&[(String, String)]> {
        self.find(name).map(|s| s.options.as_slice())
    }

    /// All items of a section: defaults first, then the section's own keys.
    ///
    /// A section key that overrides a default keeps the default's position.
    /// Values are interpolated.
    pub fn items(&self, name: &str) -> Result<Vec<(String, String)>, IniError> {
        let section = self
            .find(name)
            .ok_or_else(|| IniError::NoSection(name.to_string()))?;

        let mut raw: Vec<(String, String)> = self.defaults.clone();
        for (key, value) in &section.options {
            match raw.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.clone(),
                None => raw.push((key.clone(), value.clone())),
            }
        }

        raw.iter()
            .map(|(key, value)| Ok((key.clone(), interpolate(name, key, value, &raw)?)))
            .collect()
    }

    /// Items of a section whose keys are not in the defaults table.
    pub fn items_without_defaults(&self, name: &str) -> Result<Vec<(String, String)>, IniError> {
        Ok(self
            .items(name)?
            .into_iter()
            .filter(|(key, _)| !self.defaults.iter().any(|(k, _)| k == key))
            .collect())
    }

    /// Every section as a [`RawSection`], in file order.
    pub fn raw_sections(&self, core_section: &str) -> Result<Vec<RawSection>, IniError> {
        self.sections
            .iter()
            .map(|section| {
                Ok(RawSection {
                    name: section.name.clone(),
                    options: self.items_without_defaults(&section.name)?,
                    is_core: section.name == core_section,
                })
            })
            .collect()
    }

    fn find(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(IniSection {
                    name: name.to_string(),
                    options: Vec::new(),
                });
                self.sections.len() - 1
            }
        }
    }

    fn options_mut(&mut self, target: Option<usize>) -> &mut Vec<(String, String)> {
        match target {
            Some(index) => &mut self.sections[index].options,
            None => &mut self.defaults,
        }
    }

    fn set_option(&mut self, target: Option<usize>, key: String, value: String) {
        let options = self.options_mut(target);
        match options.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => options.push((key, value)),
        }
    }
}

/// Expand `%(name)s` references against `vars`.
///
/// Values without `%(` are returned untouched, so a bare `%` (as in
/// `http(5xx,10%,3s)`) needs no escaping.
fn interpolate(
    section: &str,
    option: &str,
    raw: &str,
    vars: &[(String, String)],
) -> Result<String, IniError> {
    let mut value = raw.to_string();
    for _ in 0..MAX_INTERPOLATION_DEPTH {
        if !value.contains("%(") {
            return Ok(value);
        }
        value = expand_once(section, option, &value, vars)?;
    }
    if value.contains("%(") {
        return Err(IniError::InterpolationDepth {
            section: section.to_string(),
            option: option.to_string(),
        });
    }
    Ok(value)
}

fn expand_once(
    section: &str,
    option: &str,
    value: &str,
    vars: &[(String, String)],
) -> Result<String, IniError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("%%") {
            out.push('%');
            rest = after;
        } else if let Some(body) = tail.strip_prefix("%(") {
            let Some(end) = body.find(")s") else {
                out.push_str(tail);
                rest = "";
                break;
            };
            let reference = body[..end].to_lowercase();
            let replacement = vars
                .iter()
                .find(|(k, _)| *k == reference)
                .map(|(_, v)| v.as_str())
                .ok_or_else(|| IniError::MissingReference {
                    section: section.to_string(),
                    option: option.to_string(),
                    reference: reference.clone(),
                })?;
            out.push_str(replacement);
            rest = &body[end + 2..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    Ok(out)
}
