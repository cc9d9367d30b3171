//! Run command - bind a command line and report what was bound

use anyhow::Result;
use appspec_core::{Hooks, RunConfig, RunContext};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

use super::load_app;
use crate::cli::{Cli, OutputFormat};
use crate::output::{colors, human, json};

/// Hooks that print the bound options and arguments
pub struct PrintHooks<W: Write> {
    format: OutputFormat,
    pretty: bool,
    out: W,
}

impl<W: Write> PrintHooks<W> {
    pub fn new(format: OutputFormat, pretty: bool, out: W) -> Self {
        Self {
            format,
            pretty,
            out,
        }
    }

    fn write_human(&mut self, ctx: &RunContext) -> io::Result<()> {
        writeln!(self.out, "{}", colors::header("Options"))?;
        for (name, value) in ctx.options.iter() {
            writeln!(self.out, "{}", human::format_option_value(name, value))?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "{}", colors::header("Arguments"))?;
        if ctx.arguments.is_empty() {
            writeln!(self.out, "  {}", colors::label("(none)"))?;
        }
        for (name, value) in ctx.arguments.iter() {
            let handle = ctx.arguments.handle(name);
            writeln!(self.out, "{}", human::format_argument_value(name, value, handle))?;
        }
        Ok(())
    }
}

impl<W: Write> Hooks for PrintHooks<W> {
    fn pre_run(&mut self, ctx: &mut RunContext) -> Result<()> {
        debug!(
            app = %ctx.app.name,
            debug_level = ctx.debug_level(),
            arguments = ctx.arguments.len(),
            "command line bound"
        );
        Ok(())
    }

    fn run(&mut self, ctx: &mut RunContext) -> Result<()> {
        match self.format {
            OutputFormat::Human => self.write_human(ctx)?,
            OutputFormat::Json => {
                let text = json::to_string(&json::format_context(ctx), self.pretty)?;
                writeln!(self.out, "{}", text)?;
            }
        }
        Ok(())
    }

    fn post_run(&mut self, _ctx: &mut RunContext) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

pub fn run(cli: &Cli, script: &Path, args: &[String], config: &RunConfig) -> Result<i32> {
    let app = load_app(script, config.clone())?;
    let mut hooks = PrintHooks::new(cli.effective_format(), cli.pretty, io::stdout());
    app.run(args, &mut hooks, &mut io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appspec_core::Application;

    const SCRIPT: &str = "__DATA__\n[OPTIONS]\n-n|'name'=s  Name [default=world]\n-loud  Shout\n[ARGS]\n* greeting=s  Greeting\n* rest=s*  More words\n";

    fn app() -> Application {
        Application::from_script("greet", SCRIPT, RunConfig::default()).unwrap()
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_human_report() {
        colored::control::set_override(false);
        let mut hooks = PrintHooks::new(OutputFormat::Human, false, Vec::new());
        let mut out = Vec::new();
        let code = app()
            .run(&argv(&["hello", "-loud", "big", "world"]), &mut hooks, &mut out)
            .unwrap();
        assert_eq!(code, 0);
        assert!(out.is_empty());

        let report = String::from_utf8(hooks.out).unwrap();
        assert!(report.contains("\"world\""));
        assert!(report.contains("loud"));
        assert!(report.contains("\"hello\""));
        assert!(report.contains("[\"big\", \"world\"]"));
    }

    #[test]
    fn test_json_report() {
        let mut hooks = PrintHooks::new(OutputFormat::Json, false, Vec::new());
        let mut out = Vec::new();
        app()
            .run(&argv(&["-name", "bob", "hi"]), &mut hooks, &mut out)
            .unwrap();

        let report: serde_json::Value = serde_json::from_slice(&hooks.out).unwrap();
        assert_eq!(report["options"]["name"], "bob");
        assert!(report["options"].get("loud").is_none());
        assert_eq!(report["arguments"]["greeting"], "hi");
        assert_eq!(report["arguments"]["rest"], serde_json::json!([]));
    }

    #[test]
    fn test_usage_error_goes_to_out() {
        let mut hooks = PrintHooks::new(OutputFormat::Human, false, Vec::new());
        let mut out = Vec::new();
        let code = app().run(&argv(&["-bogus"]), &mut hooks, &mut out).unwrap();
        assert_eq!(code, 1);
        assert!(hooks.out.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Error: Unknown option: bogus"));
        assert!(text.contains("Usage: greet"));
    }
}
