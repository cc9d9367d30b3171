//! `$name` / `${name}` expansion over an ordered list of lookup tables

use crate::binder::BoundArguments;
use crate::getopt::BoundOptions;
use crate::types::{AppInfo, OptionValue};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Something variable names can be resolved against
pub trait VarSource {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl VarSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl VarSource for AppInfo {
    fn lookup(&self, name: &str) -> Option<String> {
        self.field(name)
    }
}

/// Process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl VarSource for Environment {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

fn var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(?:\{([A-Za-z_][\w-]*)\}|([A-Za-z_]\w*))").expect("variable regex is valid")
    })
}

/// Expand variable references in `text`.
///
/// Sources are tried in order and the first hit wins. Unresolved references
/// are left as written. Substituted text is not expanded again.
pub fn expand(text: &str, sources: &[&dyn VarSource]) -> String {
    if !text.contains('$') {
        return text.to_string();
    }
    var_regex()
        .replace_all(text, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            sources
                .iter()
                .find_map(|source| source.lookup(name))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Expand every string value of the bound arguments and options.
///
/// Lookups go arguments, then options, then application fields, then the
/// environment. All lookups see the values as they were before this pass.
pub fn expand_bound(arguments: &mut BoundArguments, options: &mut BoundOptions, app: &AppInfo) {
    let arg_vars: HashMap<String, String> = arguments
        .iter()
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();

    let mut opt_vars: HashMap<String, String> = HashMap::new();
    for (name, value) in options.iter() {
        opt_vars.insert(name.clone(), value.to_string());
        if name.contains('-') {
            opt_vars.insert(name.replace('-', "_"), value.to_string());
        }
    }

    let sources: [&dyn VarSource; 4] = [&arg_vars, &opt_vars, app, &Environment];

    for value in arguments.values_mut() {
        for item in value.items_mut() {
            *item = expand(item, &sources);
        }
    }

    for value in options.values_mut() {
        match value {
            OptionValue::Str(s) => *s = expand(s, &sources),
            OptionValue::List(items) => {
                for item in items.iter_mut() {
                    *item = expand(item, &sources);
                }
            }
            OptionValue::Map(map) => {
                for v in map.values_mut() {
                    *v = expand(v, &sources);
                }
            }
            OptionValue::Bool(_) | OptionValue::Int(_) | OptionValue::Float(_) => {}
        }
    }
}
