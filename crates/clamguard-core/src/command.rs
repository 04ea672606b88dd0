//! Command compiler
//!
//! Turns a `ScanOptions` into the exact argument list handed to `clamscan`.
//! Tokens come out in `OPTION_SCHEMA` order with the executable first:
//!
//! - a switch that is on becomes `--name`; off is omitted
//! - a set value becomes `--name=value`; unset is omitted
//! - a non-empty PUA list becomes `--name=a,b,c`; empty or unset is omitted
//!
//! Compilation is pure, so compiling the same options twice yields the same list.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::options::{OptionValue, ScanOptions, OPTION_SCHEMA};

/// Final argument telling clamscan to read the file body from stdin.
pub const STDIN_MARKER: &str = "-";

/// A compiled argument vector. The first token is the executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The argument list with `-` appended, for scanning a stream.
    pub fn with_stdin_marker(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.0.len() + 1);
        argv.extend(self.0.iter().cloned());
        argv.push(STDIN_MARKER.to_string());
        argv
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(tokens: Vec<String>) -> Self {
        CommandLine(tokens)
    }
}

impl Display for CommandLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Compile scanner options into a `clamscan` argument list.
pub fn compile(options: &ScanOptions) -> CommandLine {
    let mut tokens = Vec::with_capacity(OPTION_SCHEMA.len() + 1);
    tokens.push(options.command.clone());

    for spec in OPTION_SCHEMA {
        match spec.read(options) {
            OptionValue::Flag(true) => tokens.push(spec.flag_name()),
            OptionValue::Flag(false) | OptionValue::Value(None) => {}
            OptionValue::Value(Some(value)) => {
                tokens.push(format!("{}={}", spec.flag_name(), value))
            }
            OptionValue::List(items) => {
                if !items.is_empty() {
                    tokens.push(format!("{}={}", spec.flag_name(), items.join(",")));
                }
            }
        }
    }

    CommandLine(tokens)
}
