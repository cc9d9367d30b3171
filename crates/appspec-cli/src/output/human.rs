//! Human-readable output formatting

use super::colors::*;
use appspec_core::{
    ArgKind, ArgValue, ArgumentSpec, HandleValue, Multiplicity, OptionSpec, OptionValue,
};

/// Format a compiled option as one table row
pub fn format_option(option: &OptionSpec) -> String {
    let mut parts = vec![
        format!("  {}", option_name(&option.template())),
        value_kind(option.value_kind),
    ];
    if let Some(default) = &option.default {
        parts.push(label(&format!("default={}", default)));
    }
    if option.negatable {
        parts.push(label("negatable"));
    }
    if option.is_developer_only {
        parts.push(label("dev"));
    }
    if !option.summary.is_empty() {
        parts.push(format!("- {}", option.summary));
    }
    parts.join(" ")
}

/// Format a compiled argument as one table row
pub fn format_argument(argument: &ArgumentSpec) -> String {
    let mut parts = vec![format!("  {}", arg_name(&argument.name))];
    match argument.kind {
        ArgKind::String => parts.push(argument.kind.label().to_string()),
        kind => parts.push(format!("{} {}", direction(argument.direction), kind.label())),
    }
    match argument.multiplicity {
        Multiplicity::One => {}
        Multiplicity::ZeroOrMore => parts.push(label("zero or more")),
        Multiplicity::OneOrMore => parts.push(label("one or more")),
    }
    if argument.optional {
        parts.push(label("optional"));
    }
    if argument.append_mode {
        parts.push(label("append"));
    }
    if argument.binary_mode {
        parts.push(label("binary"));
    }
    if let Some(default) = &argument.default {
        parts.push(label(&format!("default={}", default)));
    }
    if !argument.summary.is_empty() {
        parts.push(format!("- {}", argument.summary));
    }
    parts.join(" ")
}

/// Format a bound option value
pub fn format_option_value(name: &str, value: &OptionValue) -> String {
    let shown = match value {
        OptionValue::Str(s) => format!("\"{}\"", s),
        OptionValue::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    format!("  {} {}", label(&format!("{:<16}", name)), shown)
}

/// Format a bound argument value with its opened handles
pub fn format_argument_value(name: &str, value: &ArgValue, handle: Option<&HandleValue>) -> String {
    let shown = match value {
        ArgValue::One(s) => format!("\"{}\"", s),
        ArgValue::Many(items) => format!(
            "[{}]",
            items
                .iter()
                .map(|s| format!("\"{}\"", s))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    let mut line = format!("  {} {}", arg_name(&format!("{:<16}", name)), shown);
    if let Some(handle) = handle {
        let opened: Vec<String> = handle
            .handles()
            .iter()
            .map(|h| {
                if h.is_stdin() {
                    "stdin".to_string()
                } else {
                    format!("{} {}", direction(h.direction()), h.path())
                }
            })
            .collect();
        line.push_str(&format!(" {}", label(&format!("(opened: {})", opened.join(", ")))));
    }
    line
}
