//! CLI argument definitions for appspec

use appspec_core::{OpenMode, View};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Check, render and run scripts that carry an embedded option spec
#[derive(Parser, Debug)]
#[command(name = "appspec")]
#[command(author, version)]
#[command(about = "Check, render and run scripts with an embedded option spec")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run configuration file (JSON)
    #[arg(long, global = true, env = "APPSPEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format for reports
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Output JSON (alias for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON with indentation
    #[arg(long, short = 'p', global = true)]
    pub pretty: bool,

    /// Force color output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable color output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Get the effective output format
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            return OutputFormat::Json;
        }
        self.format.unwrap_or_default()
    }

    /// Check if colors should be used
    pub fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        if self.color {
            return true;
        }
        atty::is(atty::Stream::Stdout)
    }

    /// Serialize a report in the selected JSON style
    pub fn to_json(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        crate::output::json::to_string(value, self.pretty)
    }
}

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
}

/// Which rendering of the spec to print
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ViewArg {
    /// One-line usage plus the option table
    #[default]
    Usage,
    /// Usage with option and argument descriptions
    Help,
    /// Full manual page
    Man,
    /// Manual page including developer-only options
    ManDev,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Usage => View::Usage,
            ViewArg::Help => View::Help,
            ViewArg::Man => View::Man,
            ViewArg::ManDev => View::ManDev,
        }
    }
}

/// Which file arguments get opened while binding
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OpenModeArg {
    All,
    Input,
    Output,
    None,
}

impl From<OpenModeArg> for OpenMode {
    fn from(mode: OpenModeArg) -> Self {
        match mode {
            OpenModeArg::All => OpenMode::All,
            OpenModeArg::Input => OpenMode::Input,
            OpenModeArg::Output => OpenMode::Output,
            OpenModeArg::None => OpenMode::None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a script's spec block and report problems
    Check {
        /// Script file with a __DATA__ block
        script: PathBuf,
    },

    /// Print usage, help or man text for a script
    Render {
        /// Script file with a __DATA__ block
        script: PathBuf,

        /// What to render
        #[arg(long, value_enum, default_value = "usage")]
        view: ViewArg,
    },

    /// Print the compiled option and argument tables
    Dump {
        /// Script file with a __DATA__ block
        script: PathBuf,
    },

    /// Bind a command line against a script's spec and print the result
    Run {
        /// Script file with a __DATA__ block
        script: PathBuf,

        /// Override which file arguments are opened
        #[arg(long, value_enum)]
        open_mode: Option<OpenModeArg>,

        /// Command line for the script (after --)
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Bind a command line, then print input lines matching a pattern
    Filter {
        /// Script file with a __DATA__ block
        script: PathBuf,

        /// Regular expression lines must match
        #[arg(long, short = 'e')]
        pattern: String,

        /// Print lines that do not match instead
        #[arg(long)]
        invert: bool,

        /// Command line for the script (after --)
        #[arg(last = true)]
        args: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_trailing_args() {
        let cli = Cli::parse_from([
            "appspec", "run", "greet.pl", "--open-mode", "none", "--", "-name", "bob", "in.txt",
        ]);
        match cli.command {
            Command::Run {
                script,
                open_mode,
                args,
            } => {
                assert_eq!(script, PathBuf::from("greet.pl"));
                assert_eq!(open_mode, Some(OpenModeArg::None));
                assert_eq!(args, vec!["-name", "bob", "in.txt"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_effective_format() {
        let cli = Cli::parse_from(["appspec", "--json", "dump", "x"]);
        assert_eq!(cli.effective_format(), OutputFormat::Json);
        let cli = Cli::parse_from(["appspec", "dump", "x"]);
        assert_eq!(cli.effective_format(), OutputFormat::Human);
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["appspec", "-vv", "check", "x"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_render_view() {
        let cli = Cli::parse_from(["appspec", "render", "x", "--view", "man-dev"]);
        match cli.command {
            Command::Render { view, .. } => assert_eq!(View::from(view), View::ManDev),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
