//! Option spec compilation
//!
//! An option spec has the form `[dev:]<names>[!][=<type>[@|%]]` where names
//! are `|`-separated aliases. A quoted alias is the preferred (canonical)
//! name; otherwise the first alias is.

use crate::errors::SpecError;
use crate::parser::strip_quotes;
use crate::types::{OptionSpec, OptionValue, RawEntry, ValueKind};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const DEV_PREFIX: &str = "dev:";

pub const OPT_HELP: &str = "help";
pub const OPT_MAN: &str = "man";
pub const OPT_MAN_DEV: &str = "man-dev";
pub const OPT_DEBUG: &str = "debug";

/// Compile a single option entry
pub fn compile_option(entry: &RawEntry) -> Result<OptionSpec, SpecError> {
    let spec = entry.spec.trim();
    let (is_developer_only, body) = match spec.strip_prefix(DEV_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, spec),
    };

    let (names_part, type_part) = match body.split_once('=') {
        Some((names, kind)) => (names, Some(kind)),
        None => (body, None),
    };

    let (names_part, negatable) = match names_part.strip_suffix('!') {
        Some(names) => (names, true),
        None => (names_part, false),
    };

    if names_part.trim().is_empty() {
        return Err(SpecError::EmptyName(entry.spec.clone()));
    }

    let mut canonical: Option<String> = None;
    let mut aliases = Vec::new();
    for raw in names_part.split('|') {
        let raw = raw.trim();
        let name = strip_quotes(raw);
        if !is_valid_name(&name) {
            return Err(SpecError::InvalidName {
                name: raw.to_string(),
                spec: entry.spec.clone(),
            });
        }
        if name.len() != raw.len() && canonical.is_none() {
            canonical = Some(name.clone());
        }
        aliases.push(name);
    }

    let canonical = canonical.unwrap_or_else(|| aliases[0].clone());
    if let Some(pos) = aliases.iter().position(|a| *a == canonical) {
        let preferred = aliases.remove(pos);
        aliases.insert(0, preferred);
    }

    let value_kind = match type_part {
        None => ValueKind::Flag,
        Some(kind) => parse_value_kind(kind).ok_or_else(|| SpecError::InvalidOptionType {
            kind: kind.to_string(),
            spec: entry.spec.clone(),
        })?,
    };

    if negatable && value_kind != ValueKind::Flag {
        return Err(SpecError::InvalidOptionType {
            kind: format!("!={}", type_part.unwrap_or_default()),
            spec: entry.spec.clone(),
        });
    }

    let default = match &entry.default {
        Some(value) => Some(parse_default(&canonical, value_kind, value)?),
        None => None,
    };

    Ok(OptionSpec {
        canonical_name: canonical,
        aliases,
        value_kind,
        negatable,
        is_developer_only,
        default,
        summary: entry.summary.clone(),
        description: entry.description.clone(),
    })
}

/// Compile all option entries, rejecting aliases used twice
pub fn compile_options(entries: &[RawEntry]) -> Result<Vec<OptionSpec>, SpecError> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut options = Vec::with_capacity(entries.len());

    for entry in entries {
        let option = compile_option(entry)?;
        for alias in &option.aliases {
            if seen.insert(alias.clone(), entry.spec.clone()).is_some() {
                return Err(SpecError::DuplicateAlias {
                    alias: alias.clone(),
                    spec: entry.spec.clone(),
                });
            }
        }
        options.push(option);
    }

    Ok(options)
}

/// The standard options every application gets
pub fn builtin_entries() -> Vec<RawEntry> {
    let entry = |spec: &str, summary: &str, default: Option<&str>| RawEntry {
        spec: spec.to_string(),
        summary: summary.to_string(),
        description: String::new(),
        default: default.map(str::to_string),
    };
    vec![
        entry("h|'help'", "Print help text and exit", None),
        entry("man", "Print the full manual page and exit", None),
        entry(
            "dev:man-dev",
            "Print the full manual page including developer options and exit",
            None,
        ),
        entry("debug=i", "Set the debug level", Some("0")),
    ]
}

/// Append the standard options to `options`.
///
/// A standard option is left out when any of its aliases is already taken.
pub fn with_builtins(mut options: Vec<OptionSpec>) -> Result<Vec<OptionSpec>, SpecError> {
    for entry in builtin_entries() {
        let builtin = compile_option(&entry)?;
        let clash = options
            .iter()
            .any(|o| o.aliases.iter().any(|a| builtin.aliases.contains(a)));
        if clash {
            debug!(option = %builtin.canonical_name, "standard option overridden by script");
            continue;
        }
        options.push(builtin);
    }
    Ok(options)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '?')
}

fn parse_value_kind(kind: &str) -> Option<ValueKind> {
    let mut chars = kind.chars();
    let base = chars.next()?;
    if !matches!(base, 's' | 'i' | 'f') {
        return None;
    }
    match chars.as_str() {
        "" => Some(match base {
            's' => ValueKind::String,
            'i' => ValueKind::Int,
            _ => ValueKind::Float,
        }),
        "@" => Some(ValueKind::MultiString),
        "%" => Some(ValueKind::MultiKeyValue),
        _ => None,
    }
}

fn parse_default(name: &str, kind: ValueKind, value: &str) -> Result<OptionValue, SpecError> {
    let invalid = |reason: &str| SpecError::InvalidDefault {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    match kind {
        ValueKind::Flag => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(OptionValue::Bool(true)),
            "0" | "false" | "no" | "off" | "" => Ok(OptionValue::Bool(false)),
            _ => Err(invalid("expected a boolean")),
        },
        ValueKind::String => Ok(OptionValue::Str(value.to_string())),
        ValueKind::Int => value
            .trim()
            .parse()
            .map(OptionValue::Int)
            .map_err(|_| invalid("expected an integer")),
        ValueKind::Float => value
            .trim()
            .parse()
            .map(OptionValue::Float)
            .map_err(|_| invalid("expected a number")),
        ValueKind::MultiString => Ok(OptionValue::List(
            value.split(',').map(|s| s.trim().to_string()).collect(),
        )),
        ValueKind::MultiKeyValue => {
            let mut map = BTreeMap::new();
            for pair in value.split(',') {
                let (k, v) = pair
                    .split_once('=')
                    .ok_or_else(|| invalid("expected key=value pairs"))?;
                map.insert(k.trim().to_string(), v.trim().to_string());
            }
            Ok(OptionValue::Map(map))
        }
    }
}
