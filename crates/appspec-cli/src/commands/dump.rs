//! Dump command - print the compiled option and argument tables

use anyhow::Result;
use appspec_core::RunConfig;
use std::path::Path;

use super::load_app;
use crate::cli::{Cli, OutputFormat};
use crate::output::{colors, human, json};

pub fn run(cli: &Cli, script: &Path, config: &RunConfig) -> Result<i32> {
    let app = load_app(script, config.clone())?;

    match cli.effective_format() {
        OutputFormat::Human => {
            let info = app.info();
            println!("{}", colors::header(&info.name));
            if !info.summary.is_empty() {
                println!("{}", info.summary);
            }
            if let Some(version) = &info.version {
                println!("{} {}", colors::label("Version:"), version);
            }
            println!();

            let spec = app.spec();
            println!("{} ({})", colors::header("Options"), spec.options.len());
            for option in &spec.options {
                println!("{}", human::format_option(option));
            }
            println!();
            println!("{} ({})", colors::header("Arguments"), spec.arguments.len());
            for argument in &spec.arguments {
                println!("{}", human::format_argument(argument));
            }
        }
        OutputFormat::Json => {
            println!("{}", cli.to_json(&json::format_spec(&app))?);
        }
    }

    Ok(0)
}
