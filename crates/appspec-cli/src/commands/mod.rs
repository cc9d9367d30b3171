//! CLI command implementations

pub mod check;
pub mod dump;
pub mod filter;
pub mod render;
pub mod run;

use anyhow::{Context, Result};
use appspec_core::{Application, RunConfig};
use std::path::Path;

/// Load and compile a script, naming it in the error on failure
pub fn load_app(script: &Path, config: RunConfig) -> Result<Application> {
    Application::load(script, config)
        .context(format!("Failed to load spec from {}", script.display()))
}
