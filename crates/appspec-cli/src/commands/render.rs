//! Render command - print usage, help or man text

use anyhow::Result;
use appspec_core::{RunConfig, View};
use std::path::Path;

use super::load_app;
use crate::cli::{Cli, OutputFormat};

pub fn run(cli: &Cli, script: &Path, view: View, config: &RunConfig) -> Result<i32> {
    let app = load_app(script, config.clone())?;
    let text = app.render(view);

    match cli.effective_format() {
        OutputFormat::Human => println!("{}", text),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "app": app.info().name,
                "view": format!("{:?}", view).to_lowercase(),
                "text": text,
            });
            println!("{}", cli.to_json(&output)?);
        }
    }

    Ok(0)
}
