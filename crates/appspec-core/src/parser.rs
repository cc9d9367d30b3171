//! Entry parsing for `[OPTIONS]`, `[ARGS]` and `[NAMEARGS]` sections

use crate::types::RawEntry;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Marker at the left margin, spec token, then the rest of the line
fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(?:--?|\+|\*)\s*([\w'"|=:%@!+<>?*.,-]+)(?:\s+(.*?))?\s*$"#)
            .expect("entry regex is valid")
    })
}

fn default_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*?)\s*\[default=(.*)\]$").expect("default regex is valid")
    })
}

/// Parse the body of an entry section into ordered entries.
///
/// Entry lines start at the left margin. Other lines, including indented
/// `-`/`*` bullets, become description lines of the current entry; with no
/// current entry they are dropped.
pub fn parse_entries(section: &str) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut description: Vec<&str> = Vec::new();

    for line in section.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = entry_regex().captures(line) {
            if let Some(entry) = current.take() {
                entries.push(finish_entry(entry, &description));
            }
            description.clear();

            let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let (summary, default) = split_default(rest);
            current = Some(RawEntry {
                spec: caps[1].to_string(),
                summary,
                description: String::new(),
                default,
            });
        } else if current.is_some() {
            description.push(line.trim());
        } else {
            debug!(line = line.trim(), "dropping line outside any entry");
        }
    }

    if let Some(entry) = current.take() {
        entries.push(finish_entry(entry, &description));
    }

    entries
}

/// Parse a `[NAMEARGS]` body: whitespace separated `name:flags` tokens.
///
/// Produces entries whose spec is in the same `name=flags` form used by
/// `[ARGS]`, so both feed the same compiler.
pub fn parse_nameargs(section: &str) -> Vec<RawEntry> {
    section
        .split_whitespace()
        .map(|token| {
            let spec = match token.split_once(':') {
                Some((name, flags)) => format!("{}={}", name, flags),
                None => token.to_string(),
            };
            RawEntry {
                spec,
                ..RawEntry::default()
            }
        })
        .collect()
}

fn finish_entry(mut entry: RawEntry, description: &[&str]) -> RawEntry {
    entry.description = description.join("\n").trim().to_string();
    entry
}

fn split_default(rest: &str) -> (String, Option<String>) {
    match default_regex().captures(rest) {
        Some(caps) => (caps[1].trim().to_string(), Some(strip_quotes(caps[2].trim()))),
        None => (rest.trim().to_string(), None),
    }
}

/// Strip one layer of matching single or double quotes
pub fn strip_quotes(value: &str) -> String {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}
