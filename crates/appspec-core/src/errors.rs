//! Error types for spec compilation and argument binding

use std::fmt;
use thiserror::Error;

/// Default exit code for usage errors
pub const USAGE_EXIT_CODE: i32 = 1;

/// Errors detected while compiling the embedded spec.
///
/// These are configuration mistakes made by the script author, so they are
/// reported verbatim and abort startup.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Option spec \"{0}\" has no name")]
    EmptyName(String),

    #[error("Invalid name \"{name}\" in spec \"{spec}\"")]
    InvalidName { name: String, spec: String },

    #[error("Invalid option type \"{kind}\" in spec \"{spec}\"")]
    InvalidOptionType { kind: String, spec: String },

    #[error("Option alias \"{alias}\" is declared more than once (spec \"{spec}\")")]
    DuplicateAlias { alias: String, spec: String },

    #[error("Unknown flag '{flag}' in argument spec \"{spec}\"")]
    InvalidArgumentFlag { flag: char, spec: String },

    #[error("Conflicting flags in argument spec \"{spec}\": {detail}")]
    ConflictingArgumentFlags { spec: String, detail: String },

    #[error("Argument \"{name}\" follows multi-valued argument \"{previous}\"")]
    ArgumentAfterMulti { name: String, previous: String },

    #[error("Required argument \"{name}\" follows optional argument \"{previous}\"")]
    RequiredAfterOptional { name: String, previous: String },

    #[error("Argument \"{0}\" is declared more than once")]
    DuplicateArgument(String),

    #[error("Invalid default \"{value}\" for \"{name}\": {reason}")]
    InvalidDefault {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A command-line usage error.
///
/// Carries the message shown after `Error:` and the exit code the process
/// should terminate with once usage has been printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    message: String,
    exit_code: i32,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: USAGE_EXIT_CODE,
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Full text printed to the user: the error line followed by usage
    pub fn report(&self, usage: &str) -> String {
        format!("Error: {}\n\n{}", self.message, usage)
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UsageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_report() {
        let err = UsageError::new("Must specify input file \"src\"");
        assert_eq!(err.exit_code(), 1);
        let text = err.report("Usage: demo <src>");
        assert!(text.starts_with("Error: Must specify input file \"src\"\n"));
        assert!(text.ends_with("Usage: demo <src>"));
    }

    #[test]
    fn test_usage_error_exit_code_override() {
        let err = UsageError::new("bad").with_exit_code(3);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "bad");
    }
}
