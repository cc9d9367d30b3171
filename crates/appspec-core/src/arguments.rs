//! Positional argument spec compilation
//!
//! Argument specs are `name=flags` where flags is any mix of:
//!
//! | flag          | meaning                          |
//! |---------------|----------------------------------|
//! | `<` `i`       | input (default for files/dirs)   |
//! | `>` `o`       | output                           |
//! | `>>` `a`      | output, append                   |
//! | `b`           | binary transfer mode             |
//! | `f` `d` `s`   | file, directory, plain string    |
//! | `@` `*`       | one-or-more, zero-or-more        |
//! | `?`           | optional                         |

use crate::errors::SpecError;
use crate::types::{ArgKind, ArgumentSpec, Direction, Multiplicity, RawEntry};
use std::collections::HashSet;
use tracing::warn;

/// Compile a single `name=flags` argument entry
pub fn compile_argument(entry: &RawEntry) -> Result<ArgumentSpec, SpecError> {
    let spec = entry.spec.trim();
    let (name, flags) = match spec.split_once('=') {
        Some((name, flags)) => (name.trim(), flags),
        None => (spec, ""),
    };

    if !is_valid_name(name) {
        return Err(SpecError::InvalidName {
            name: name.to_string(),
            spec: entry.spec.clone(),
        });
    }

    let conflict = |detail: &str| SpecError::ConflictingArgumentFlags {
        spec: entry.spec.clone(),
        detail: detail.to_string(),
    };

    let mut direction: Option<Direction> = None;
    let mut append_mode = false;
    let mut binary_mode = false;
    let mut kind: Option<ArgKind> = None;
    let mut multiplicity: Option<Multiplicity> = None;
    let mut optional = false;

    let set_direction = |current: &mut Option<Direction>, dir: Direction| {
        match *current {
            Some(existing) if existing != dir => Err(conflict("both input and output")),
            _ => {
                *current = Some(dir);
                Ok(())
            }
        }
    };

    let mut chars = flags.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' | 'i' => set_direction(&mut direction, Direction::Input)?,
            '>' => {
                if chars.peek() == Some(&'>') {
                    chars.next();
                    append_mode = true;
                }
                set_direction(&mut direction, Direction::Output)?;
            }
            'o' => set_direction(&mut direction, Direction::Output)?,
            'a' => {
                append_mode = true;
                set_direction(&mut direction, Direction::Output)?;
            }
            'b' => binary_mode = true,
            'f' | 'd' | 's' => {
                let k = match c {
                    'f' => ArgKind::File,
                    'd' => ArgKind::Directory,
                    _ => ArgKind::String,
                };
                if kind.is_some_and(|existing| existing != k) {
                    return Err(conflict("more than one type"));
                }
                kind = Some(k);
            }
            '@' | '*' => {
                let m = if c == '@' {
                    Multiplicity::OneOrMore
                } else {
                    Multiplicity::ZeroOrMore
                };
                if multiplicity.is_some_and(|existing| existing != m) {
                    return Err(conflict("both '@' and '*'"));
                }
                multiplicity = Some(m);
            }
            '?' => optional = true,
            c if c.is_whitespace() => {}
            other => {
                return Err(SpecError::InvalidArgumentFlag {
                    flag: other,
                    spec: entry.spec.clone(),
                })
            }
        }
    }

    // Direction or binary flags without a type imply a file
    let kind = kind.unwrap_or(if direction.is_some() || binary_mode {
        ArgKind::File
    } else {
        ArgKind::String
    });

    if binary_mode && kind != ArgKind::File {
        warn!(argument = name, "binary mode only applies to file arguments");
    }

    Ok(ArgumentSpec {
        name: name.to_string(),
        kind,
        direction: direction.unwrap_or(Direction::Input),
        multiplicity: multiplicity.unwrap_or(Multiplicity::One),
        optional,
        append_mode,
        binary_mode,
        default: entry.default.clone(),
        summary: entry.summary.clone(),
        description: entry.description.clone(),
    })
}

/// Compile the ordered argument entries and check their ordering rules.
///
/// Nothing may follow a multi-valued argument, and once an argument may be
/// left out every later one must be optional too. A trailing `*` argument
/// is exempt from the latter since it can bind nothing.
pub fn compile_arguments(entries: &[RawEntry]) -> Result<Vec<ArgumentSpec>, SpecError> {
    let mut arguments: Vec<ArgumentSpec> = Vec::with_capacity(entries.len());
    let mut names: HashSet<String> = HashSet::new();
    let mut multi: Option<String> = None;
    let mut first_optional: Option<String> = None;

    for entry in entries {
        let arg = compile_argument(entry)?;

        if !names.insert(arg.name.clone()) {
            return Err(SpecError::DuplicateArgument(arg.name));
        }
        if let Some(previous) = &multi {
            return Err(SpecError::ArgumentAfterMulti {
                name: arg.name,
                previous: previous.clone(),
            });
        }
        if let Some(previous) = &first_optional {
            if !arg.may_be_absent() {
                return Err(SpecError::RequiredAfterOptional {
                    name: arg.name,
                    previous: previous.clone(),
                });
            }
        }

        if arg.may_be_absent() && first_optional.is_none() {
            first_optional = Some(arg.name.clone());
        }
        if arg.is_multi() {
            multi = Some(arg.name.clone());
        }
        arguments.push(arg);
    }

    Ok(arguments)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
