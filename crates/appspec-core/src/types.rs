//! Core type definitions for compiled specs and run configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One declarative entry block as read from a spec section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawEntry {
    pub spec: String,
    pub summary: String,
    pub description: String,
    pub default: Option<String>,
}

/// How an option takes its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Flag,
    String,
    Int,
    Float,
    MultiString,
    MultiKeyValue,
}

impl ValueKind {
    pub fn takes_value(self) -> bool {
        self != ValueKind::Flag
    }

    pub fn is_multi(self) -> bool {
        matches!(self, ValueKind::MultiString | ValueKind::MultiKeyValue)
    }
}

/// A parsed option value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(n) => Some(*n),
            OptionValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Float(n) => write!(f, "{}", n),
            OptionValue::Str(s) => write!(f, "{}", s),
            OptionValue::List(items) => write!(f, "{}", items.join(" ")),
            OptionValue::Map(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{}", pairs.join(" "))
            }
        }
    }
}

/// A compiled option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSpec {
    /// Key in the bound option map
    pub canonical_name: String,
    /// All names, canonical first
    pub aliases: Vec<String>,
    pub value_kind: ValueKind,
    /// `-no<name>` / `-no-<name>` clear the flag
    pub negatable: bool,
    pub is_developer_only: bool,
    pub default: Option<OptionValue>,
    pub summary: String,
    pub description: String,
}

impl OptionSpec {
    /// Display form used in usage tables, e.g. `name|n <arg>`
    pub fn template(&self) -> String {
        let names = self.aliases.join("|");
        if self.value_kind.takes_value() {
            format!("{} <arg>", names)
        } else {
            names
        }
    }
}

/// What a positional argument refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    File,
    Directory,
    String,
}

impl ArgKind {
    pub fn label(self) -> &'static str {
        match self {
            ArgKind::File => "file",
            ArgKind::Directory => "directory",
            ArgKind::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    One,
    ZeroOrMore,
    OneOrMore,
}

/// A compiled positional argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentSpec {
    pub name: String,
    pub kind: ArgKind,
    pub direction: Direction,
    pub multiplicity: Multiplicity,
    pub optional: bool,
    pub append_mode: bool,
    pub binary_mode: bool,
    pub default: Option<String>,
    pub summary: String,
    pub description: String,
}

impl ArgumentSpec {
    pub fn is_multi(&self) -> bool {
        self.multiplicity != Multiplicity::One
    }

    /// True when the argument may bind nothing at all
    pub fn may_be_absent(&self) -> bool {
        self.optional || self.default.is_some() || self.multiplicity == Multiplicity::ZeroOrMore
    }

    pub fn is_input_file(&self) -> bool {
        self.kind == ArgKind::File && self.direction == Direction::Input
    }

    /// Usage marker, e.g. `<src>`, `[<dst>]`, `<files>...`
    pub fn usage_marker(&self) -> String {
        let base = format!("<{}>", self.name);
        let base = if self.is_multi() {
            format!("{}...", base)
        } else {
            base
        };
        if self.may_be_absent() {
            format!("[{}]", base)
        } else {
            base
        }
    }
}

/// The compiled option and argument tables
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CliSpec {
    pub options: Vec<OptionSpec>,
    pub arguments: Vec<ArgumentSpec>,
}

impl CliSpec {
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.canonical_name == name)
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// Free-text application fields used for rendering and expansion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: Option<String>,
    pub summary: String,
    pub synopsis: String,
    pub description: String,
    /// Path of the script the spec came from
    pub progpath: Option<String>,
}

impl AppInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Field lookup used by variable expansion
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" | "progname" => Some(self.name.clone()),
            "version" => self.version.clone(),
            "summary" => Some(self.summary.clone()),
            "synopsis" => Some(self.synopsis.clone()),
            "progpath" => self.progpath.clone(),
            _ => None,
        }
    }
}

/// Which file arguments get opened while binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    #[default]
    All,
    #[serde(alias = "input_only")]
    Input,
    #[serde(alias = "output_only")]
    Output,
    None,
}

impl OpenMode {
    pub fn opens(self, direction: Direction) -> bool {
        match self {
            OpenMode::All => true,
            OpenMode::Input => direction == Direction::Input,
            OpenMode::Output => direction == Direction::Output,
            OpenMode::None => false,
        }
    }
}

/// Rendered view of the compiled specs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Usage,
    Help,
    Man,
    ManDev,
}

/// Configuration for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub open_mode: OpenMode,

    /// Exit code used for usage errors
    pub usage_exit_code: i32,

    /// Expand `$name` references in bound values
    pub expand_variables: bool,

    /// Add the standard help/man/debug options
    pub builtin_options: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            open_mode: OpenMode::All,
            usage_exit_code: crate::errors::USAGE_EXIT_CODE,
            expand_variables: true,
            builtin_options: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(name: &str, multiplicity: Multiplicity, optional: bool) -> ArgumentSpec {
        ArgumentSpec {
            name: name.to_string(),
            kind: ArgKind::File,
            direction: Direction::Input,
            multiplicity,
            optional,
            append_mode: false,
            binary_mode: false,
            default: None,
            summary: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn test_usage_markers() {
        assert_eq!(arg("src", Multiplicity::One, false).usage_marker(), "<src>");
        assert_eq!(arg("dst", Multiplicity::One, true).usage_marker(), "[<dst>]");
        assert_eq!(arg("files", Multiplicity::OneOrMore, false).usage_marker(), "<files>...");
        assert_eq!(arg("rest", Multiplicity::ZeroOrMore, false).usage_marker(), "[<rest>...]");
    }

    #[test]
    fn test_open_mode() {
        assert!(OpenMode::All.opens(Direction::Output));
        assert!(OpenMode::Input.opens(Direction::Input));
        assert!(!OpenMode::Input.opens(Direction::Output));
        assert!(!OpenMode::None.opens(Direction::Input));
    }

    #[test]
    fn test_run_config_partial_json() {
        let config: RunConfig = serde_json::from_str(r#"{"open_mode":"input_only"}"#).unwrap();
        assert_eq!(config.open_mode, OpenMode::Input);
        assert_eq!(config.usage_exit_code, 1);
        assert!(config.expand_variables);
    }

    #[test]
    fn test_option_value_display() {
        assert_eq!(OptionValue::Bool(true).to_string(), "1");
        assert_eq!(OptionValue::List(vec!["a".into(), "b".into()]).to_string(), "a b");
    }
}
