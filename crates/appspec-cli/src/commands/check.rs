//! Check command - compile a script's spec block stage by stage

use anyhow::Result;
use appspec_core::arguments::compile_arguments;
use appspec_core::options::compile_options;
use appspec_core::parser::parse_entries;
use appspec_core::sections::{extract_data_block, Sections, KNOWN_SECTIONS, SECTION_OPTIONS};
use appspec_core::{argument_entries, usage_line, Application, RunConfig};
use serde::Serialize;
use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use crate::output::colors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Serialize)]
struct Check {
    name: String,
    status: Status,
    details: String,
}

impl Check {
    fn new(name: &str, status: Status, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.into(),
        }
    }
}

pub fn run(cli: &Cli, script: &Path, config: &RunConfig) -> Result<i32> {
    let checks = collect_checks(script, config);
    let failed = checks.iter().any(|c| c.status == Status::Fail);

    match cli.effective_format() {
        OutputFormat::Human => {
            println!(
                "{}",
                colors::header(&format!("Spec check: {}", script.display()))
            );
            println!();
            for check in &checks {
                let status = match check.status {
                    Status::Pass => colors::success(&check.name),
                    Status::Warn => colors::warning(&check.name),
                    Status::Fail => colors::error(&check.name),
                };
                println!("  {} - {}", status, check.details);
            }
            println!();
            if failed {
                println!("{}", colors::error("Spec has errors"));
            } else {
                println!("{}", colors::success("All checks passed"));
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "script": script.display().to_string(),
                "checks": checks,
                "all_passed": !failed,
            });
            println!("{}", cli.to_json(&output)?);
        }
    }

    Ok(if failed { 1 } else { 0 })
}

fn collect_checks(script: &Path, config: &RunConfig) -> Vec<Check> {
    let mut checks = Vec::new();

    let text = match std::fs::read_to_string(script) {
        Ok(text) => {
            checks.push(Check::new("Script file", Status::Pass, "Readable"));
            text
        }
        Err(e) => {
            checks.push(Check::new("Script file", Status::Fail, e.to_string()));
            return checks;
        }
    };

    let block = extract_data_block(&text);
    checks.push(if block.len() < text.len() {
        Check::new("Data block", Status::Pass, "Found __DATA__/__END__ marker")
    } else {
        Check::new(
            "Data block",
            Status::Warn,
            "No __DATA__/__END__ marker, reading whole file",
        )
    });

    let sections = Sections::parse(block);
    let names: Vec<&str> = sections.names().collect();
    let unknown: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| !KNOWN_SECTIONS.contains(n))
        .collect();
    checks.push(if names.is_empty() {
        Check::new("Sections", Status::Warn, "No [SECTION] headers found")
    } else if unknown.is_empty() {
        Check::new("Sections", Status::Pass, names.join(", "))
    } else {
        Check::new(
            "Sections",
            Status::Warn,
            format!("Unrecognized: {}", unknown.join(", ")),
        )
    });

    let options_ok = match sections.get(SECTION_OPTIONS) {
        Some(body) => match compile_options(&parse_entries(body)) {
            Ok(options) => {
                checks.push(Check::new(
                    "Options",
                    Status::Pass,
                    format!("{} declared", options.len()),
                ));
                true
            }
            Err(e) => {
                checks.push(Check::new("Options", Status::Fail, e.to_string()));
                false
            }
        },
        None => {
            checks.push(Check::new("Options", Status::Pass, "None declared"));
            true
        }
    };

    let (arg_entries, both) = argument_entries(&sections);
    if both {
        checks.push(Check::new(
            "Argument sections",
            Status::Warn,
            "Both [ARGS] and [NAMEARGS] present, [NAMEARGS] is ignored",
        ));
    }
    let arguments_ok = match compile_arguments(&arg_entries) {
        Ok(arguments) => {
            let details = if arguments.is_empty() {
                "None declared".to_string()
            } else {
                let markers: Vec<String> = arguments.iter().map(|a| a.usage_marker()).collect();
                format!("{} declared: {}", arguments.len(), markers.join(" "))
            };
            checks.push(Check::new("Arguments", Status::Pass, details));
            true
        }
        Err(e) => {
            checks.push(Check::new("Arguments", Status::Fail, e.to_string()));
            false
        }
    };

    if options_ok && arguments_ok {
        let name = script
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());
        match Application::from_script(&name, &text, config.clone()) {
            Ok(app) => checks.push(Check::new(
                "Application",
                Status::Pass,
                usage_line(app.spec(), app.info()),
            )),
            Err(e) => checks.push(Check::new("Application", Status::Fail, e.to_string())),
        }
    }

    checks
}
