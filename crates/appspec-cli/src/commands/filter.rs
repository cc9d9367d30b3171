//! Filter command - grep the script's input files through the filter personality

use anyhow::{Context, Result};
use appspec_core::{Hooks, Personality, RunConfig, RunContext};
use regex::Regex;
use std::io;
use std::path::Path;
use tracing::info;

use super::load_app;

/// Keeps lines matching (or, inverted, not matching) a pattern
pub struct GrepHooks {
    pattern: Regex,
    invert: bool,
    matched: usize,
}

impl GrepHooks {
    pub fn new(pattern: &str, invert: bool) -> Result<Self> {
        let pattern =
            Regex::new(pattern).context(format!("Invalid filter pattern: {}", pattern))?;
        Ok(Self {
            pattern,
            invert,
            matched: 0,
        })
    }
}

impl Hooks for GrepHooks {
    fn filter_line(&mut self, _ctx: &RunContext, line: &str) -> Result<Option<String>> {
        if self.pattern.is_match(line) != self.invert {
            self.matched += 1;
            Ok(Some(line.to_string()))
        } else {
            Ok(None)
        }
    }

    fn post_run(&mut self, ctx: &mut RunContext) -> Result<()> {
        info!(app = %ctx.app.name, matched = self.matched, "filter done");
        Ok(())
    }
}

pub fn run(
    script: &Path,
    pattern: &str,
    invert: bool,
    args: &[String],
    config: &RunConfig,
) -> Result<i32> {
    let mut hooks = GrepHooks::new(pattern, invert)?;
    let app = load_app(script, config.clone())?.with_personality(Personality::Filter);
    app.run(args, &mut hooks, &mut io::stdout())
}
