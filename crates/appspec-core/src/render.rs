//! Usage, help and man page rendering

use crate::types::{AppInfo, ArgKind, ArgumentSpec, CliSpec, OptionSpec, View};

const INDENT: &str = "    ";
const DETAIL_INDENT: &str = "        ";

/// Render one view of the compiled specs
pub fn render(spec: &CliSpec, app: &AppInfo, view: View) -> String {
    match view {
        View::Usage => render_usage(spec, app),
        View::Help => render_help(spec, app),
        View::Man => render_man(spec, app, false),
        View::ManDev => render_man(spec, app, true),
    }
}

/// Command line shape, e.g. `demo [options] <src> [<dst>]`
pub fn synopsis_line(spec: &CliSpec, app: &AppInfo) -> String {
    let mut parts = vec![app.name.clone()];
    if spec.options.iter().any(|o| !o.is_developer_only) {
        parts.push("[options]".to_string());
    }
    parts.extend(spec.arguments.iter().map(ArgumentSpec::usage_marker));
    parts.join(" ")
}

pub fn usage_line(spec: &CliSpec, app: &AppInfo) -> String {
    format!("Usage: {}", synopsis_line(spec, app))
}

fn visible_options(spec: &CliSpec, dev: bool) -> impl Iterator<Item = &OptionSpec> {
    spec.options.iter().filter(move |o| dev || !o.is_developer_only)
}

/// Summary with any default appended in brackets
fn option_summary(option: &OptionSpec) -> String {
    match &option.default {
        Some(default) if option.summary.is_empty() => format!("[default={}]", default),
        Some(default) => format!("{} [default={}]", option.summary, default),
        None => option.summary.clone(),
    }
}

fn argument_summary(arg: &ArgumentSpec) -> String {
    let mut text = arg.summary.clone();
    if let Some(default) = &arg.default {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&format!("[default={}]", default));
    }
    text
}

/// Kind annotation shown next to arguments, e.g. `(output file, append)`
fn argument_kind(arg: &ArgumentSpec) -> String {
    if arg.kind == ArgKind::String {
        return "(string)".to_string();
    }
    let mut text = format!("({} {}", arg.direction.label(), arg.kind.label());
    if arg.append_mode {
        text.push_str(", append");
    }
    if arg.binary_mode && arg.kind == ArgKind::File {
        text.push_str(", binary");
    }
    text.push(')');
    text
}

fn table(rows: &[(String, String)]) -> Vec<String> {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(left, right)| {
            if right.is_empty() {
                format!("  {}", left)
            } else {
                format!("  {:<width$}   {}", left, right, width = width)
            }
        })
        .collect()
}

fn indent_block(text: &str, indent: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect()
}

fn render_usage(spec: &CliSpec, app: &AppInfo) -> String {
    let mut lines = vec![usage_line(spec, app)];

    let rows: Vec<(String, String)> = visible_options(spec, false)
        .map(|o| (format!("-{}", o.template()), option_summary(o)))
        .collect();
    if !rows.is_empty() {
        lines.push(String::new());
        lines.push("Options:".to_string());
        lines.extend(table(&rows));
    }

    lines.join("\n")
}

fn render_help(spec: &CliSpec, app: &AppInfo) -> String {
    let mut lines = Vec::new();
    if !app.summary.is_empty() {
        lines.push(format!("{} - {}", app.name, app.summary));
        lines.push(String::new());
    }
    lines.push(usage_line(spec, app));

    let options: Vec<&OptionSpec> = visible_options(spec, false).collect();
    if !options.is_empty() {
        let rows: Vec<(String, String)> = options
            .iter()
            .map(|o| (format!("-{}", o.template()), option_summary(o)))
            .collect();
        lines.push(String::new());
        lines.push("Options:".to_string());
        for (row, option) in table(&rows).into_iter().zip(&options) {
            lines.push(row);
            if !option.description.is_empty() {
                lines.extend(indent_block(&option.description, DETAIL_INDENT));
                lines.push(String::new());
            }
        }
    }

    if !spec.arguments.is_empty() {
        let rows: Vec<(String, String)> = spec
            .arguments
            .iter()
            .map(|a| {
                let summary = argument_summary(a);
                let right = if summary.is_empty() {
                    argument_kind(a)
                } else {
                    format!("{} {}", summary, argument_kind(a))
                };
                (a.usage_marker(), right)
            })
            .collect();
        lines.push(String::new());
        lines.push("Arguments:".to_string());
        lines.extend(table(&rows));
    }

    trim_trailing_blank(&mut lines);
    lines.join("\n")
}

fn render_man(spec: &CliSpec, app: &AppInfo, dev: bool) -> String {
    let mut lines = vec!["NAME".to_string()];
    if app.summary.is_empty() {
        lines.push(format!("{}{}", INDENT, app.name));
    } else {
        lines.push(format!("{}{} - {}", INDENT, app.name, app.summary));
    }

    if let Some(version) = &app.version {
        lines.push(String::new());
        lines.push("VERSION".to_string());
        lines.push(format!("{}{}", INDENT, version));
    }

    lines.push(String::new());
    lines.push("SYNOPSIS".to_string());
    if app.synopsis.is_empty() {
        lines.push(format!("{}{}", INDENT, synopsis_line(spec, app)));
    } else {
        lines.extend(indent_block(&app.synopsis, INDENT));
    }

    let options: Vec<&OptionSpec> = visible_options(spec, dev).collect();
    if !options.is_empty() {
        lines.push(String::new());
        lines.push("OPTIONS".to_string());
        for option in options {
            lines.push(format!("{}-{}", INDENT, option.template()));
            let summary = option_summary(option);
            if !summary.is_empty() {
                lines.push(format!("{}{}", DETAIL_INDENT, summary));
            }
            if !option.description.is_empty() {
                lines.push(String::new());
                lines.extend(indent_block(&option.description, DETAIL_INDENT));
            }
            lines.push(String::new());
        }
        trim_trailing_blank(&mut lines);
    }

    if !spec.arguments.is_empty() {
        lines.push(String::new());
        lines.push("ARGUMENTS".to_string());
        for arg in &spec.arguments {
            lines.push(format!("{}{}  {}", INDENT, arg.usage_marker(), argument_kind(arg)));
            let summary = argument_summary(arg);
            if !summary.is_empty() {
                lines.push(format!("{}{}", DETAIL_INDENT, summary));
            }
            if !arg.description.is_empty() {
                lines.push(String::new());
                lines.extend(indent_block(&arg.description, DETAIL_INDENT));
            }
            lines.push(String::new());
        }
        trim_trailing_blank(&mut lines);
    }

    if !app.description.is_empty() {
        lines.push(String::new());
        lines.push("DESCRIPTION".to_string());
        lines.extend(indent_block(&app.description, INDENT));
    }

    lines.join("\n")
}

fn trim_trailing_blank(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
}
