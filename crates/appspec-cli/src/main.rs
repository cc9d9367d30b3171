//! appspec - check, render and run scripts with an embedded option spec

mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    colored::control::set_override(cli.use_color());

    let mut config = config::load(cli.config.as_deref())?;

    let code = match &cli.command {
        Command::Check { script } => commands::check::run(&cli, script, &config)?,

        Command::Render { script, view } => {
            commands::render::run(&cli, script, (*view).into(), &config)?
        }

        Command::Dump { script } => commands::dump::run(&cli, script, &config)?,

        Command::Run {
            script,
            open_mode,
            args,
        } => {
            if let Some(mode) = open_mode {
                config.open_mode = (*mode).into();
            }
            commands::run::run(&cli, script, args, &config)?
        }

        Command::Filter {
            script,
            pattern,
            invert,
            args,
        } => commands::filter::run(script, pattern, *invert, args, &config)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Log to stderr; each `-v` raises the level one step from warn
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
