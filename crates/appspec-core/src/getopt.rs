//! Command-line option parsing against compiled option specs

use crate::errors::UsageError;
use crate::types::{OptionSpec, OptionValue, ValueKind};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

/// Parsed option values keyed by canonical name, seeded with defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundOptions {
    values: BTreeMap<String, OptionValue>,
}

impl BoundOptions {
    /// Seed a map with the declared defaults
    pub fn with_defaults(specs: &[OptionSpec]) -> Self {
        let values = specs
            .iter()
            .filter_map(|s| s.default.clone().map(|d| (s.canonical_name.clone(), d)))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Flag value; absent flags are false
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(OptionValue::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OptionValue::as_float)
    }

    /// Values of a repeatable option; empty when never given
    pub fn list(&self, name: &str) -> &[String] {
        self.get(name).and_then(OptionValue::as_list).unwrap_or(&[])
    }

    pub fn map(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.get(name).and_then(OptionValue::as_map)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut OptionValue> {
        self.values.values_mut()
    }
}

/// Options plus the positional tokens left for argument binding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCommandLine {
    pub options: BoundOptions,
    pub positionals: Vec<String>,
}

/// Parse `argv` (without the program name) against the option specs.
///
/// Accepts `-name`, `--name`, `-name=value` and `-name value`. Options and
/// positionals may be interleaved; `--` ends option processing.
pub fn parse_command_line(
    specs: &[OptionSpec],
    argv: &[String],
) -> Result<ParsedCommandLine, UsageError> {
    let table: HashMap<&str, usize> = specs
        .iter()
        .enumerate()
        .flat_map(|(idx, spec)| spec.aliases.iter().map(move |a| (a.as_str(), idx)))
        .collect();

    let mut options = BoundOptions::with_defaults(specs);
    let mut positionals = Vec::new();
    // Repeatable options drop their default on first use
    let mut given: HashSet<usize> = HashSet::new();

    let mut tokens = argv.iter();
    while let Some(token) = tokens.next() {
        if token == "--" {
            positionals.extend(tokens.by_ref().cloned());
            break;
        }
        if !is_option_token(token) {
            positionals.push(token.clone());
            continue;
        }

        let body = token
            .strip_prefix("--")
            .or_else(|| token.strip_prefix('-'))
            .unwrap_or(token);
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let (idx, negated) = lookup(&table, specs, name)
            .ok_or_else(|| UsageError::new(format!("Unknown option: {}", name)))?;
        let spec = &specs[idx];
        let key = spec.canonical_name.clone();
        trace!(option = %key, "matched option token");

        match spec.value_kind {
            ValueKind::Flag => {
                if inline.is_some() {
                    return Err(UsageError::new(format!(
                        "Option {} does not take an argument",
                        name
                    )));
                }
                options.insert(key, OptionValue::Bool(!negated));
            }
            ValueKind::String => {
                let value = next_value(inline, &mut tokens, name)?;
                options.insert(key, OptionValue::Str(value));
            }
            ValueKind::Int => {
                let value = next_value(inline, &mut tokens, name)?;
                let n = value.parse().map_err(|_| {
                    UsageError::new(format!(
                        "Value \"{}\" invalid for option {} (number expected)",
                        value, name
                    ))
                })?;
                options.insert(key, OptionValue::Int(n));
            }
            ValueKind::Float => {
                let value = next_value(inline, &mut tokens, name)?;
                let n = value.parse().map_err(|_| {
                    UsageError::new(format!(
                        "Value \"{}\" invalid for option {} (real number expected)",
                        value, name
                    ))
                })?;
                options.insert(key, OptionValue::Float(n));
            }
            ValueKind::MultiString => {
                let value = next_value(inline, &mut tokens, name)?;
                let mut items = taken_list(&mut options, &mut given, idx, &key);
                items.push(value);
                options.insert(key, OptionValue::List(items));
            }
            ValueKind::MultiKeyValue => {
                let value = next_value(inline, &mut tokens, name)?;
                let (k, v) = value.split_once('=').ok_or_else(|| {
                    UsageError::new(format!(
                        "Option {} expects key=value, got \"{}\"",
                        name, value
                    ))
                })?;
                let mut map = taken_map(&mut options, &mut given, idx, &key);
                map.insert(k.to_string(), v.to_string());
                options.insert(key, OptionValue::Map(map));
            }
        }
    }

    Ok(ParsedCommandLine {
        options,
        positionals,
    })
}

/// The value of a value-taking option: inline after `=`, else the next token
fn next_value<'a>(
    inline: Option<&str>,
    tokens: &mut impl Iterator<Item = &'a String>,
    name: &str,
) -> Result<String, UsageError> {
    match inline {
        Some(v) => Ok(v.to_string()),
        None => tokens
            .next()
            .cloned()
            .ok_or_else(|| UsageError::new(format!("Option {} requires an argument", name))),
    }
}

/// `-x` style tokens are options unless the text after `-` is a number
fn is_option_token(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => !is_numeric(rest),
        _ => false,
    }
}

fn is_numeric(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '.') && text.parse::<f64>().is_ok()
}

/// Find the spec for `name`, also trying `no<name>`/`no-<name>` negation
fn lookup(table: &HashMap<&str, usize>, specs: &[OptionSpec], name: &str) -> Option<(usize, bool)> {
    if let Some(&idx) = table.get(name) {
        return Some((idx, false));
    }
    let stem = name.strip_prefix("no-").or_else(|| name.strip_prefix("no"))?;
    let &idx = table.get(stem)?;
    specs[idx].negatable.then_some((idx, true))
}

fn taken_list(
    options: &mut BoundOptions,
    given: &mut HashSet<usize>,
    idx: usize,
    key: &str,
) -> Vec<String> {
    if !given.insert(idx) {
        if let Some(OptionValue::List(items)) = options.values.remove(key) {
            return items;
        }
    }
    Vec::new()
}

fn taken_map(
    options: &mut BoundOptions,
    given: &mut HashSet<usize>,
    idx: usize,
    key: &str,
) -> BTreeMap<String, String> {
    if !given.insert(idx) {
        if let Some(OptionValue::Map(map)) = options.values.remove(key) {
            return map;
        }
    }
    BTreeMap::new()
}
