//! Legacy INI text parser.
//!
//! Reproduces the dialect the legacy tool wrote and read: `[DEFAULT]`
//! defaults, `=` or `:` separators, lower-cased keys, `#`/`;` comments,
//! inline `;` comments after whitespace, indented continuation lines.

use super::{IniDocument, IniError};

/// Name of the file-level defaults section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Parse INI text into a document.
pub fn parse_ini(text: &str) -> Result<IniDocument, IniError> {
    let mut doc = IniDocument::default();
    // None before the first header; Some(None) inside DEFAULT; Some(Some(i)) inside sections[i]
    let mut current: Option<Option<usize>> = None;
    let mut last_key: Option<String> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches('\r');

        if line.trim().is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        // Continuation of the previous value
        if line.starts_with(' ') || line.starts_with('\t') {
            if let (Some(target), Some(key)) = (current, last_key.as_ref()) {
                let extra = line.trim();
                if !extra.is_empty() {
                    let options = doc.options_mut(target);
                    if let Some((_, value)) = options.iter_mut().rev().find(|(k, _)| k == key) {
                        value.push('\n');
                        value.push_str(extra);
                    }
                }
                continue;
            }
        }

        if let Some(rest) = line.strip_prefix('[') {
            let end = rest.find(']').ok_or_else(|| IniError::Parse {
                line: line_no,
                message: format!("unterminated section header: {}", line),
            })?;
            let name = &rest[..end];
            if name.is_empty() {
                return Err(IniError::Parse {
                    line: line_no,
                    message: "empty section name".to_string(),
                });
            }
            current = Some(if name == DEFAULT_SECTION {
                None
            } else {
                Some(doc.section_index_or_insert(name))
            });
            last_key = None;
            continue;
        }

        let target = current.ok_or_else(|| IniError::Parse {
            line: line_no,
            message: format!("option outside of any section: {}", line.trim()),
        })?;

        let (key, value) = split_option(line).ok_or_else(|| IniError::Parse {
            line: line_no,
            message: format!("expected 'key = value', got: {}", line.trim()),
        })?;

        doc.set_option(target, key.clone(), value);
        last_key = Some(key);
    }

    Ok(doc)
}

/// Split an option line at the first `=` or `:`.
fn split_option(line: &str) -> Option<(String, String)> {
    let sep = line.find(|c| c == '=' || c == ':')?;
    let key = line[..sep].trim();
    if key.is_empty() {
        return None;
    }

    let mut value = &line[sep + 1..];
    if let Some(pos) = value.find(';') {
        if value[..pos].ends_with(char::is_whitespace) {
            value = &value[..pos];
        }
    }
    let value = value.trim();
    let value = if value == "\"\"" { "" } else { value };

    Some((key.to_lowercase(), value.to_string()))
}
