//! Application context and lifecycle hook dispatch
//!
//! An [`Application`] owns the compiled specs for one script. Each
//! invocation parses the command line into a [`RunContext`], then calls the
//! [`Hooks`] in order: `pre_run`, `run` (or per-line `filter_line` for the
//! filter personality), `post_run`.

use crate::binder::{bind_parsed, BoundArguments};
use crate::compile::{app_info, compile_sections};
use crate::errors::{SpecError, UsageError};
use crate::getopt::{parse_command_line, BoundOptions};
use crate::options::{with_builtins, OPT_DEBUG, OPT_HELP, OPT_MAN, OPT_MAN_DEV};
use crate::render::render;
use crate::sections::{extract_data_block, Sections};
use crate::types::{AppInfo, CliSpec, RunConfig, ValueKind, View};
use anyhow::{bail, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, info};

/// How the application runs its main step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Personality {
    /// Call `Hooks::run` once
    #[default]
    Script,
    /// Feed each line of the input files through `Hooks::filter_line`
    Filter,
}

/// Everything bound for one invocation
#[derive(Debug)]
pub struct RunContext {
    pub app: AppInfo,
    pub options: BoundOptions,
    pub arguments: BoundArguments,
}

impl RunContext {
    /// Look up a value by name: arguments, then options, then app fields
    pub fn field(&self, name: &str) -> Option<String> {
        if let Some(value) = self.arguments.get(name) {
            return Some(value.to_string());
        }
        if let Some(value) = self.options.get(name) {
            return Some(value.to_string());
        }
        self.app.field(name)
    }

    pub fn debug_level(&self) -> i64 {
        self.options.int(OPT_DEBUG).unwrap_or(0)
    }
}

/// User code called around a run. Every hook defaults to doing nothing.
pub trait Hooks {
    fn pre_run(&mut self, _ctx: &mut RunContext) -> Result<()> {
        Ok(())
    }

    fn run(&mut self, _ctx: &mut RunContext) -> Result<()> {
        Ok(())
    }

    fn post_run(&mut self, _ctx: &mut RunContext) -> Result<()> {
        Ok(())
    }

    /// Map one input line to an output line, or drop it with `None`
    fn filter_line(&mut self, _ctx: &RunContext, line: &str) -> Result<Option<String>> {
        Ok(Some(line.to_string()))
    }
}

/// Result of processing a command line
#[derive(Debug)]
pub enum Outcome {
    /// A help/man option was given; print this and exit successfully
    Show(String),
    Run(RunContext),
}

/// A script's compiled specs plus the settings to run them with
#[derive(Debug, Clone)]
pub struct Application {
    info: AppInfo,
    spec: CliSpec,
    config: RunConfig,
    personality: Personality,
}

impl Application {
    pub fn new(info: AppInfo, spec: CliSpec, config: RunConfig) -> Result<Self, SpecError> {
        let spec = if config.builtin_options {
            CliSpec {
                options: with_builtins(spec.options)?,
                arguments: spec.arguments,
            }
        } else {
            spec
        };
        Ok(Self {
            info,
            spec,
            config,
            personality: Personality::default(),
        })
    }

    /// Build from script text; the spec block follows `__DATA__`/`__END__`
    pub fn from_script(name: &str, script: &str, config: RunConfig) -> Result<Self, SpecError> {
        let sections = Sections::parse(extract_data_block(script));
        let spec = compile_sections(&sections)?;
        Self::new(app_info(name, &sections), spec, config)
    }

    /// Read and compile a script file. The file stem names the application.
    pub fn load(path: &Path, config: RunConfig) -> Result<Self, SpecError> {
        let script = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());
        let mut app = Self::from_script(&name, &script, config)?;
        app.info.progpath = Some(path.display().to_string());
        debug!(
            name = %app.info.name,
            options = app.spec.options.len(),
            arguments = app.spec.arguments.len(),
            "compiled script spec"
        );
        Ok(app)
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    pub fn spec(&self) -> &CliSpec {
        &self.spec
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn render(&self, view: View) -> String {
        render(&self.spec, &self.info, view)
    }

    pub fn usage(&self) -> String {
        self.render(View::Usage)
    }

    /// Parse and bind a command line (without the program name)
    pub fn process(&self, argv: &[String]) -> Result<Outcome, UsageError> {
        let parsed = parse_command_line(&self.spec.options, argv)
            .map_err(|e| e.with_exit_code(self.config.usage_exit_code))?;

        let view_flag = |name: &str| {
            self.spec
                .option(name)
                .is_some_and(|o| o.value_kind == ValueKind::Flag)
                && parsed.options.flag(name)
        };
        let view = if view_flag(OPT_MAN_DEV) {
            Some(View::ManDev)
        } else if view_flag(OPT_MAN) {
            Some(View::Man)
        } else if view_flag(OPT_HELP) {
            Some(View::Help)
        } else {
            None
        };
        if let Some(view) = view {
            return Ok(Outcome::Show(self.render(view)));
        }

        let (options, arguments) = bind_parsed(&self.spec, parsed, &self.config, &self.info)?;
        Ok(Outcome::Run(RunContext {
            app: self.info.clone(),
            options,
            arguments,
        }))
    }

    /// Process `argv` and dispatch the hooks.
    ///
    /// Help text and usage errors are written to `out`. Returns the exit
    /// code the process should end with.
    pub fn run<H: Hooks>(&self, argv: &[String], hooks: &mut H, out: &mut dyn Write) -> Result<i32> {
        let mut ctx = match self.process(argv) {
            Ok(Outcome::Show(text)) => {
                writeln!(out, "{}", text)?;
                return Ok(0);
            }
            Ok(Outcome::Run(ctx)) => ctx,
            Err(err) => {
                writeln!(out, "{}", err.report(&self.usage()))?;
                return Ok(err.exit_code());
            }
        };

        hooks.pre_run(&mut ctx)?;
        match self.personality {
            Personality::Script => hooks.run(&mut ctx)?,
            Personality::Filter => self.run_filter(&mut ctx, hooks, out)?,
        }
        hooks.post_run(&mut ctx)?;
        Ok(0)
    }

    fn run_filter<H: Hooks>(&self, ctx: &mut RunContext, hooks: &mut H, out: &mut dyn Write) -> Result<()> {
        let Some(input) = self.spec.arguments.iter().rev().find(|a| a.is_input_file()) else {
            bail!("Filter applications need an input file argument");
        };
        let Some(mut handles) = ctx.arguments.take_handle(&input.name) else {
            bail!(
                "Input file \"{}\" was not opened (open mode {:?})",
                input.name,
                self.config.open_mode
            );
        };

        let mut count = 0usize;
        for handle in handles.handles_mut() {
            let Some(reader) = handle.reader() else {
                continue;
            };
            for line in reader.lines() {
                let line = line?;
                if let Some(output) = hooks.filter_line(ctx, &line)? {
                    writeln!(out, "{}", output)?;
                    count += 1;
                }
            }
        }
        info!(lines = count, "filter finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpenMode;

    const SCRIPT: &str = "\
#!/usr/bin/env appspec
run-the-thing
__DATA__
[SUMMARY]
Greets files

[OPTIONS]
-n|'name'=s      Who to greet   [default=world]
-upper           Upper-case output

[ARGS]
* src=f@     Input files
";

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        greeting: Option<String>,
    }

    impl Hooks for Recorder {
        fn pre_run(&mut self, _ctx: &mut RunContext) -> Result<()> {
            self.calls.push("pre_run".to_string());
            Ok(())
        }

        fn run(&mut self, ctx: &mut RunContext) -> Result<()> {
            self.calls.push("run".to_string());
            self.greeting = ctx.field("name");
            Ok(())
        }

        fn post_run(&mut self, _ctx: &mut RunContext) -> Result<()> {
            self.calls.push("post_run".to_string());
            Ok(())
        }

        fn filter_line(&mut self, ctx: &RunContext, line: &str) -> Result<Option<String>> {
            if line.starts_with('#') {
                return Ok(None);
            }
            if ctx.options.flag("upper") {
                Ok(Some(line.to_uppercase()))
            } else {
                Ok(Some(line.to_string()))
            }
        }
    }

    fn app() -> Application {
        Application::from_script("greet", SCRIPT, RunConfig::default()).unwrap()
    }

    #[test]
    fn test_hooks_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x\n").unwrap();

        let mut hooks = Recorder::default();
        let mut out = Vec::new();
        let code = app()
            .run(&argv(&["-n", "bob", file.to_str().unwrap()]), &mut hooks, &mut out)
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(hooks.calls, vec!["pre_run", "run", "post_run"]);
        assert_eq!(hooks.greeting.as_deref(), Some("bob"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_usage_error_reports_and_skips_hooks() {
        let mut hooks = Recorder::default();
        let mut out = Vec::new();
        let code = app()
            .run(&argv(&["/definitely/not/here.txt"]), &mut hooks, &mut out)
            .unwrap();
        assert_eq!(code, 1);
        assert!(hooks.calls.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Error: Invalid input file \"src\""));
        assert!(text.contains("Usage: greet [options] <src>..."));
    }

    #[test]
    fn test_configured_exit_code() {
        let config = RunConfig {
            usage_exit_code: 2,
            ..RunConfig::default()
        };
        let app = Application::from_script("greet", SCRIPT, config).unwrap();
        let mut out = Vec::new();
        let code = app
            .run(&argv(&["-bogus"]), &mut Recorder::default(), &mut out)
            .unwrap();
        assert_eq!(code, 2);
    }

    #[test]
    fn test_help_options_short_circuit() {
        let app = app();
        match app.process(&argv(&["-help"])).unwrap() {
            Outcome::Show(text) => assert!(text.starts_with("greet - Greets files")),
            Outcome::Run(_) => panic!("expected help text"),
        }
        match app.process(&argv(&["-man"])).unwrap() {
            Outcome::Show(text) => {
                assert!(text.starts_with("NAME\n"));
                assert!(!text.contains("-man-dev"));
            }
            Outcome::Run(_) => panic!("expected man page"),
        }
        match app.process(&argv(&["-man-dev"])).unwrap() {
            Outcome::Show(text) => assert!(text.contains("-man-dev")),
            Outcome::Run(_) => panic!("expected developer man page"),
        }
    }

    #[test]
    fn test_builtin_options_can_be_disabled() {
        let config = RunConfig {
            builtin_options: false,
            ..RunConfig::default()
        };
        let app = Application::from_script("greet", SCRIPT, config).unwrap();
        assert!(app.spec().option(OPT_HELP).is_none());
        assert!(app.process(&argv(&["-help"])).is_err());
    }

    #[test]
    fn test_debug_level_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();
        match app().process(&argv(&["-debug", "3", file.to_str().unwrap()])).unwrap() {
            Outcome::Run(ctx) => assert_eq!(ctx.debug_level(), 3),
            Outcome::Show(_) => panic!("expected run"),
        }
    }

    #[test]
    fn test_filter_personality() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "one\n# skip\ntwo\n").unwrap();
        std::fs::write(&b, "three\n").unwrap();

        let app = app().with_personality(Personality::Filter);
        let mut hooks = Recorder::default();
        let mut out = Vec::new();
        let code = app
            .run(
                &argv(&["-upper", a.to_str().unwrap(), b.to_str().unwrap()]),
                &mut hooks,
                &mut out,
            )
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "ONE\nTWO\nTHREE\n");
        assert_eq!(hooks.calls, vec!["pre_run", "post_run"]);
    }

    #[test]
    fn test_filter_needs_opened_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "one\n").unwrap();
        let config = RunConfig {
            open_mode: OpenMode::None,
            ..RunConfig::default()
        };
        let app = Application::from_script("greet", SCRIPT, config)
            .unwrap()
            .with_personality(Personality::Filter);
        let result = app.run(&argv(&[a.to_str().unwrap()]), &mut Recorder::default(), &mut Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.sh");
        std::fs::write(&path, SCRIPT).unwrap();
        let app = Application::load(&path, RunConfig::default()).unwrap();
        assert_eq!(app.info().name, "tool");
        assert_eq!(app.info().progpath.as_deref(), path.to_str());
    }
}
