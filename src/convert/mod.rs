//! Legacy section -> canonical config pipeline
//!
//! classify -> coerce -> build sections -> combine -> apply directives ->
//! assemble.

mod assemble;
mod coerce;
mod combine;
mod enable;
mod section;

pub use assemble::{CanonicalConfig, ConfigAssembler, CORE_KEY};
pub use coerce::{coerce, parse_integer, to_bool, SectionOption};
pub use combine::{combine_group, combine_rule, combine_sections, CombineMode, CombineRule, COMBINABLE_PLUGINS};
pub use enable::{apply_directives, directive_flag, DirectiveTally, Directives, EnablementResolver};
pub use section::{
    canonical_section_name, is_option_deprecated, legacy_section_name, without_deprecated, Section,
};
