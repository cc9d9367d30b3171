//! ANSI color helpers for terminal output

use appspec_core::{Direction, ValueKind};
use colored::Colorize;

/// Get colored header
pub fn header(text: &str) -> String {
    text.bold().underline().to_string()
}

/// Get colored label
pub fn label(text: &str) -> String {
    text.white().dimmed().to_string()
}

/// Get colored option template, e.g. `-name|n <arg>`
pub fn option_name(template: &str) -> String {
    format!("-{}", template).cyan().to_string()
}

/// Get colored argument name
pub fn arg_name(name: &str) -> String {
    name.green().bold().to_string()
}

/// Get colored value kind
pub fn value_kind(kind: ValueKind) -> String {
    let text = match kind {
        ValueKind::Flag => "flag",
        ValueKind::String => "string",
        ValueKind::Int => "int",
        ValueKind::Float => "float",
        ValueKind::MultiString => "list",
        ValueKind::MultiKeyValue => "map",
    };
    match kind {
        ValueKind::Flag => text.white().dimmed().to_string(),
        ValueKind::MultiString | ValueKind::MultiKeyValue => text.magenta().to_string(),
        _ => text.blue().to_string(),
    }
}

/// Get colored file direction
pub fn direction(direction: Direction) -> String {
    match direction {
        Direction::Input => direction.label().blue().to_string(),
        Direction::Output => direction.label().yellow().to_string(),
    }
}

/// Get colored success message
pub fn success(text: &str) -> String {
    format!("{} {}", "✓".green(), text)
}

/// Get colored warning message
pub fn warning(text: &str) -> String {
    format!("{} {}", "⚠".yellow(), text)
}

/// Get colored error message
pub fn error(text: &str) -> String {
    format!("{} {}", "✗".red(), text)
}
