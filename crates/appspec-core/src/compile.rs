//! Spec block compilation: sections → option and argument tables

use crate::arguments::compile_arguments;
use crate::errors::SpecError;
use crate::options::compile_options;
use crate::parser::{parse_entries, parse_nameargs};
use crate::sections::*;
use crate::types::{AppInfo, CliSpec, RawEntry};
use tracing::warn;

/// Compile a spec block into option and argument tables
pub fn compile(text: &str) -> Result<CliSpec, SpecError> {
    compile_sections(&Sections::parse(text))
}

pub fn compile_sections(sections: &Sections) -> Result<CliSpec, SpecError> {
    let options = match sections.get(SECTION_OPTIONS) {
        Some(body) => compile_options(&parse_entries(body))?,
        None => Vec::new(),
    };

    let (arg_entries, both) = argument_entries(sections);
    if both {
        warn!("both [ARGS] and [NAMEARGS] present; using [ARGS]");
    }
    let arguments = compile_arguments(&arg_entries)?;

    Ok(CliSpec { options, arguments })
}

/// Argument entries from `[ARGS]`, else `[NAMEARGS]`.
///
/// The flag is set when both sections exist and `[NAMEARGS]` was ignored.
pub fn argument_entries(sections: &Sections) -> (Vec<RawEntry>, bool) {
    match (sections.get(SECTION_ARGS), sections.get(SECTION_NAMEARGS)) {
        (Some(args), Some(_)) => (parse_entries(args), true),
        (Some(args), None) => (parse_entries(args), false),
        (None, Some(nameargs)) => (parse_nameargs(nameargs), false),
        (None, None) => (Vec::new(), false),
    }
}

/// Application fields taken from the free-text sections
pub fn app_info(name: &str, sections: &Sections) -> AppInfo {
    let version = sections.text(SECTION_VERSION);
    AppInfo {
        name: name.to_string(),
        version: (!version.is_empty()).then_some(version),
        summary: sections.text(SECTION_SUMMARY),
        synopsis: sections.text(SECTION_SYNOPSIS),
        description: sections.text(SECTION_DESCRIPTION),
        progpath: None,
    }
}
