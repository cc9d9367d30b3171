//! Binding of command-line tokens to declared arguments
//!
//! Binding runs in phases: options are parsed, positional tokens are
//! assigned to arguments in declared order, variables are expanded, and
//! finally input paths are checked and files opened.

use crate::errors::UsageError;
use crate::expand::expand_bound;
use crate::getopt::{parse_command_line, BoundOptions, ParsedCommandLine};
use crate::types::{AppInfo, ArgKind, ArgumentSpec, CliSpec, Direction, OpenMode, RunConfig};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

/// Value bound to a trailing input-file argument when no tokens are given
pub const STDIN_SENTINEL: &str = "STDIN";

/// Token that stands for standard input/output on a file argument
const STD_STREAM_TOKEN: &str = "-";

/// Value bound to one argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    One(String),
    Many(Vec<String>),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::One(s) => Some(s),
            ArgValue::Many(_) => None,
        }
    }

    /// All values; a single value is a one-element slice
    pub fn items(&self) -> &[String] {
        match self {
            ArgValue::One(s) => std::slice::from_ref(s),
            ArgValue::Many(items) => items,
        }
    }

    pub(crate) fn items_mut(&mut self) -> &mut [String] {
        match self {
            ArgValue::One(s) => std::slice::from_mut(s),
            ArgValue::Many(items) => items,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.items().join(" "))
    }
}

#[derive(Debug)]
enum Stream {
    Stdin,
    Stdout,
    File(File),
}

/// An opened file argument
#[derive(Debug)]
pub struct ArgHandle {
    path: String,
    direction: Direction,
    binary: bool,
    stream: Stream,
}

impl ArgHandle {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self.stream, Stream::Stdin)
    }

    /// Buffered reader for input handles
    pub fn reader(&mut self) -> Option<Box<dyn BufRead + '_>> {
        if self.direction != Direction::Input {
            return None;
        }
        match &mut self.stream {
            Stream::Stdin => Some(Box::new(io::stdin().lock())),
            Stream::File(file) => Some(Box::new(BufReader::new(file))),
            Stream::Stdout => None,
        }
    }

    /// Writer for output handles
    pub fn writer(&mut self) -> Option<Box<dyn Write + '_>> {
        if self.direction != Direction::Output {
            return None;
        }
        match &mut self.stream {
            Stream::Stdout => Some(Box::new(io::stdout().lock())),
            Stream::File(file) => Some(Box::new(file)),
            Stream::Stdin => None,
        }
    }
}

/// Handle(s) for one argument, shaped like its value
#[derive(Debug)]
pub enum HandleValue {
    One(ArgHandle),
    Many(Vec<ArgHandle>),
}

impl HandleValue {
    pub fn handles(&self) -> &[ArgHandle] {
        match self {
            HandleValue::One(h) => std::slice::from_ref(h),
            HandleValue::Many(hs) => hs,
        }
    }

    pub fn handles_mut(&mut self) -> &mut [ArgHandle] {
        match self {
            HandleValue::One(h) => std::slice::from_mut(h),
            HandleValue::Many(hs) => hs,
        }
    }
}

/// Key under which an argument's handle is stored
pub fn handle_key(name: &str) -> String {
    format!("{}_handle", name)
}

/// Arguments bound for one invocation
#[derive(Debug, Default)]
pub struct BoundArguments {
    /// Declared arguments in order, then synthetic extras
    values: Vec<(String, ArgValue)>,
    handles: BTreeMap<String, HandleValue>,
    /// Arguments whose value is the stdin sentinel
    stdin_bound: HashSet<String>,
}

impl BoundArguments {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Single value of a one-valued argument
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    /// All values of an argument; empty when unbound
    pub fn values(&self, name: &str) -> &[String] {
        self.get(name).map(ArgValue::items).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArgValue)> {
        self.values.iter().map(|(n, v)| (n, v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Handle(s) opened for argument `name`
    pub fn handle(&self, name: &str) -> Option<&HandleValue> {
        self.handles.get(&handle_key(name))
    }

    pub fn handle_mut(&mut self, name: &str) -> Option<&mut HandleValue> {
        self.handles.get_mut(&handle_key(name))
    }

    /// Remove and return the handle(s) of argument `name`
    pub fn take_handle(&mut self, name: &str) -> Option<HandleValue> {
        self.handles.remove(&handle_key(name))
    }

    /// Handle keys (`<name>_handle`) in sorted order
    pub fn handle_keys(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut ArgValue> {
        self.values.iter_mut().map(|(_, v)| v)
    }

    fn push(&mut self, name: &str, value: ArgValue) {
        self.values.push((name.to_string(), value));
    }
}

/// Parse options and bind arguments for one invocation.
///
/// Usage errors carry `config.usage_exit_code`.
pub fn bind(
    spec: &CliSpec,
    argv: &[String],
    config: &RunConfig,
    app: &AppInfo,
) -> Result<(BoundOptions, BoundArguments), UsageError> {
    let parsed = parse_command_line(&spec.options, argv)
        .map_err(|e| e.with_exit_code(config.usage_exit_code))?;
    bind_parsed(spec, parsed, config, app)
}

/// Bind arguments for an already parsed command line
pub fn bind_parsed(
    spec: &CliSpec,
    parsed: ParsedCommandLine,
    config: &RunConfig,
    app: &AppInfo,
) -> Result<(BoundOptions, BoundArguments), UsageError> {
    let with_code = |e: UsageError| e.with_exit_code(config.usage_exit_code);

    let mut options = parsed.options;
    let mut arguments = assign(&spec.arguments, &parsed.positionals).map_err(with_code)?;

    if config.expand_variables {
        expand_bound(&mut arguments, &mut options, app);
    }

    check_and_open(&mut arguments, &spec.arguments, config.open_mode).map_err(with_code)?;
    Ok((options, arguments))
}

/// Bind positional tokens to arguments, check paths and open files
pub fn bind_arguments(
    specs: &[ArgumentSpec],
    positionals: &[String],
    open_mode: OpenMode,
) -> Result<BoundArguments, UsageError> {
    let mut bound = assign(specs, positionals)?;
    check_and_open(&mut bound, specs, open_mode)?;
    Ok(bound)
}

/// Assign tokens to arguments in declared order
fn assign(specs: &[ArgumentSpec], positionals: &[String]) -> Result<BoundArguments, UsageError> {
    let mut bound = BoundArguments::default();
    let mut pos = 0;

    for (idx, arg) in specs.iter().enumerate() {
        let is_last = idx + 1 == specs.len();

        if arg.is_multi() {
            let mut items: Vec<String> = positionals[pos..].to_vec();
            pos = positionals.len();

            if items.is_empty() {
                if let Some(default) = &arg.default {
                    items.push(default.clone());
                } else if is_last && arg.is_input_file() {
                    debug!(argument = %arg.name, "no files given, reading standard input");
                    bound.stdin_bound.insert(arg.name.clone());
                    items.push(STDIN_SENTINEL.to_string());
                } else if !arg.may_be_absent() {
                    return Err(missing(arg));
                }
            }
            bound.push(&arg.name, ArgValue::Many(items));
            continue;
        }

        match positionals.get(pos) {
            Some(token) => {
                pos += 1;
                bound.push(&arg.name, ArgValue::One(token.clone()));
            }
            None => match &arg.default {
                Some(default) => bound.push(&arg.name, ArgValue::One(default.clone())),
                None if arg.optional => {}
                None => return Err(missing(arg)),
            },
        }
    }

    // Leftover tokens get synthetic names
    let declared: HashSet<&str> = specs.iter().map(|a| a.name.as_str()).collect();
    let mut counter = 0;
    for token in &positionals[pos..] {
        let mut name = format!("arg{}", counter);
        while declared.contains(name.as_str()) {
            counter += 1;
            name = format!("arg{}", counter);
        }
        counter += 1;
        bound.push(&name, ArgValue::One(token.clone()));
    }

    Ok(bound)
}

fn missing(arg: &ArgumentSpec) -> UsageError {
    UsageError::new(format!(
        "Must specify {} {} \"{}\"",
        arg.direction.label(),
        arg.kind.label(),
        arg.name
    ))
}

/// Check input paths and open file arguments permitted by `open_mode`.
///
/// Handles opened before a failure are dropped, and so closed, with the
/// partially built table.
fn check_and_open(
    bound: &mut BoundArguments,
    specs: &[ArgumentSpec],
    open_mode: OpenMode,
) -> Result<(), UsageError> {
    let mut handles: BTreeMap<String, HandleValue> = BTreeMap::new();

    for arg in specs {
        let Some(value) = bound.get(&arg.name) else {
            continue;
        };
        let from_stdin = bound.stdin_bound.contains(&arg.name);

        if arg.direction == Direction::Input && arg.kind != ArgKind::String && !from_stdin {
            for path in value.items() {
                if path != STD_STREAM_TOKEN {
                    check_input_path(arg, path)?;
                }
            }
        }

        if arg.kind != ArgKind::File || !open_mode.opens(arg.direction) {
            continue;
        }

        let mut opened = Vec::with_capacity(value.items().len());
        for path in value.items() {
            opened.push(open_handle(arg, path, from_stdin)?);
        }

        let key = handle_key(&arg.name);
        match value {
            ArgValue::One(_) => {
                if let Some(handle) = opened.pop() {
                    handles.insert(key, HandleValue::One(handle));
                }
            }
            ArgValue::Many(_) => {
                handles.insert(key, HandleValue::Many(opened));
            }
        }
    }

    bound.handles = handles;
    Ok(())
}

fn check_input_path(arg: &ArgumentSpec, path: &str) -> Result<(), UsageError> {
    let p = Path::new(path);
    let label = arg.kind.label();
    if !p.exists() {
        return Err(UsageError::new(format!(
            "Invalid input {} \"{}\": {} does not exist",
            label, arg.name, path
        )));
    }
    let right_type = match arg.kind {
        ArgKind::File => !p.is_dir(),
        ArgKind::Directory => p.is_dir(),
        ArgKind::String => true,
    };
    if !right_type {
        return Err(UsageError::new(format!(
            "Invalid input {} \"{}\": {} is not a {}",
            label, arg.name, path, label
        )));
    }
    Ok(())
}

fn open_handle(arg: &ArgumentSpec, path: &str, from_stdin: bool) -> Result<ArgHandle, UsageError> {
    let std_stream = from_stdin || path == STD_STREAM_TOKEN;
    let stream = match (arg.direction, std_stream) {
        (Direction::Input, true) => Stream::Stdin,
        (Direction::Output, true) => Stream::Stdout,
        (Direction::Input, false) => Stream::File(File::open(path).map_err(|e| open_error(arg, path, e))?),
        (Direction::Output, false) => {
            let mut options = OpenOptions::new();
            options.create(true);
            if arg.append_mode {
                options.append(true);
            } else {
                options.write(true).truncate(true);
            }
            Stream::File(options.open(path).map_err(|e| open_error(arg, path, e))?)
        }
    };

    debug!(argument = %arg.name, path, binary = arg.binary_mode, "opened file argument");
    Ok(ArgHandle {
        path: path.to_string(),
        direction: arg.direction,
        binary: arg.binary_mode,
        stream,
    })
}

fn open_error(arg: &ArgumentSpec, path: &str, err: io::Error) -> UsageError {
    UsageError::new(format!(
        "Unable to open {} file \"{}\": {} ({})",
        arg.direction.label(),
        arg.name,
        path,
        err
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::compile_arguments;
    use crate::types::RawEntry;
    use std::io::Read;

    fn specs(list: &[&str]) -> Vec<ArgumentSpec> {
        let entries: Vec<RawEntry> = list
            .iter()
            .map(|s| RawEntry {
                spec: s.to_string(),
                ..RawEntry::default()
            })
            .collect();
        compile_arguments(&entries).unwrap()
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_required_argument() {
        let err = bind_arguments(&specs(&["src=f"]), &[], OpenMode::None).unwrap_err();
        assert_eq!(err.message(), "Must specify input file \"src\"");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_nonexistent_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let err = bind_arguments(
            &specs(&["file=f"]),
            &tokens(&[path.to_str().unwrap()]),
            OpenMode::All,
        )
        .unwrap_err();
        assert!(err.message().contains("input file"));
        assert!(err.message().contains("\"file\""));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_output_directory_needs_no_existence() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        std::fs::create_dir(&a).unwrap();
        let b = dir.path().join("b");
        let (a, b) = (a.to_str().unwrap(), b.to_str().unwrap());

        let args = specs(&["src=id", "dst=od"]);
        let bound = bind_arguments(&args, &tokens(&[a, b]), OpenMode::All).unwrap();
        assert_eq!(bound.value("src"), Some(a));
        assert_eq!(bound.value("dst"), Some(b));
        assert!(bound.handle("src").is_none());

        std::fs::remove_dir(a).unwrap();
        let err = bind_arguments(&args, &tokens(&[a, b]), OpenMode::All).unwrap_err();
        assert!(err.message().contains("input directory \"src\""));
    }

    #[test]
    fn test_wrong_path_type() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_str().unwrap();
        let err = bind_arguments(&specs(&["src=f"]), &tokens(&[d]), OpenMode::None).unwrap_err();
        assert!(err.message().contains("is not a file"));
    }

    #[test]
    fn test_trailing_multi_file_reads_stdin() {
        let bound = bind_arguments(&specs(&["array=f@"]), &[], OpenMode::All).unwrap();
        assert_eq!(bound.values("array"), &[STDIN_SENTINEL.to_string()]);
        let handles = bound.handle("array").unwrap().handles();
        assert_eq!(handles.len(), 1);
        assert!(handles[0].is_stdin());
        assert_eq!(bound.handle_keys().collect::<Vec<_>>(), vec!["array_handle"]);
    }

    #[test]
    fn test_stdin_without_open_mode() {
        let bound = bind_arguments(&specs(&["files=f*"]), &[], OpenMode::None).unwrap();
        assert_eq!(bound.values("files"), &[STDIN_SENTINEL.to_string()]);
        assert!(bound.handle("files").is_none());
    }

    #[test]
    fn test_zero_or_more_strings_bind_empty() {
        let bound = bind_arguments(&specs(&["words=s*"]), &[], OpenMode::All).unwrap();
        assert_eq!(bound.get("words"), Some(&ArgValue::Many(vec![])));
    }

    #[test]
    fn test_one_or_more_strings_required() {
        let err = bind_arguments(&specs(&["words=s@"]), &[], OpenMode::All).unwrap_err();
        assert_eq!(err.message(), "Must specify input string \"words\"");
    }

    #[test]
    fn test_multi_takes_remaining_tokens_in_order() {
        let bound =
            bind_arguments(&specs(&["cmd=s", "rest=s@"]), &tokens(&["go", "a", "b"]), OpenMode::All)
                .unwrap();
        assert_eq!(bound.value("cmd"), Some("go"));
        assert_eq!(bound.values("rest"), &["a".to_string(), "b".to_string()]);
        assert_eq!(bound.names().collect::<Vec<_>>(), vec!["cmd", "rest"]);
    }

    #[test]
    fn test_extra_tokens_get_synthetic_names() {
        let bound =
            bind_arguments(&specs(&["arg0=s"]), &tokens(&["x", "y", "z"]), OpenMode::All).unwrap();
        assert_eq!(bound.names().collect::<Vec<_>>(), vec!["arg0", "arg1", "arg2"]);
        assert_eq!(bound.value("arg1"), Some("y"));
    }

    #[test]
    fn test_optional_and_default() {
        let mut args = specs(&["a=s", "b=s?"]);
        let bound = bind_arguments(&args, &tokens(&["x"]), OpenMode::All).unwrap();
        assert!(!bound.contains("b"));

        args[1].default = Some("fallback".to_string());
        let bound = bind_arguments(&args, &tokens(&["x"]), OpenMode::All).unwrap();
        assert_eq!(bound.value("b"), Some("fallback"));
    }

    #[test]
    fn test_opens_input_and_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "hello\n").unwrap();
        let output = dir.path().join("out.txt");

        let args = specs(&["src=<bf", "dst=>f"]);
        let mut bound = bind_arguments(
            &args,
            &tokens(&[input.to_str().unwrap(), output.to_str().unwrap()]),
            OpenMode::All,
        )
        .unwrap();

        let src = &mut bound.handle_mut("src").unwrap().handles_mut()[0];
        assert!(src.is_binary());
        let mut text = String::new();
        src.reader().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello\n");
        assert!(src.writer().is_none());

        let dst = &mut bound.handle_mut("dst").unwrap().handles_mut()[0];
        dst.writer().unwrap().write_all(b"done").unwrap();
        drop(bound);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "done");
    }

    #[test]
    fn test_append_mode_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log.txt");
        std::fs::write(&log, "one\n").unwrap();

        let mut bound =
            bind_arguments(&specs(&["log=>>f"]), &tokens(&[log.to_str().unwrap()]), OpenMode::All)
                .unwrap();
        let handle = &mut bound.handle_mut("log").unwrap().handles_mut()[0];
        handle.writer().unwrap().write_all(b"two\n").unwrap();
        drop(bound);
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_open_mode_input_only_skips_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never.txt");
        let bound =
            bind_arguments(&specs(&["dst=>f"]), &tokens(&[out.to_str().unwrap()]), OpenMode::Input)
                .unwrap();
        assert!(bound.handle("dst").is_none());
        assert!(!out.exists());
    }

    #[test]
    fn test_output_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("no-such-dir").join("out.txt");
        let err = bind_arguments(&specs(&["dst=>f"]), &tokens(&[bad.to_str().unwrap()]), OpenMode::All)
            .unwrap_err();
        assert!(err.message().starts_with("Unable to open output file \"dst\""));
    }

    #[test]
    fn test_dash_binds_stdin() {
        let bound = bind_arguments(&specs(&["src=f"]), &tokens(&["-"]), OpenMode::All).unwrap();
        assert!(bound.handle("src").unwrap().handles()[0].is_stdin());
    }

    #[test]
    fn test_bind_expands_and_applies_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap().to_string();
        std::fs::write(dir.path().join("data.txt"), "x").unwrap();

        let spec = CliSpec {
            options: crate::options::compile_options(&[RawEntry {
                spec: "dir=s".to_string(),
                ..RawEntry::default()
            }])
            .unwrap(),
            arguments: specs(&["src=f"]),
        };
        let config = RunConfig {
            usage_exit_code: 4,
            ..RunConfig::default()
        };
        let app = AppInfo::new("demo");

        let argv = tokens(&["-dir", &base, "$dir/data.txt"]);
        let (options, arguments) = bind(&spec, &argv, &config, &app).unwrap();
        assert_eq!(options.string("dir"), Some(base.as_str()));
        assert_eq!(arguments.value("src"), Some(format!("{}/data.txt", base).as_str()));
        assert!(arguments.handle("src").is_some());

        let err = bind(&spec, &tokens(&["-dir", &base, "$dir/none.txt"]), &config, &app).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("input file \"src\""));
    }
}
