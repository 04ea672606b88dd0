//! Clamguard Core Library
//!
//! This crate provides the scanner option model, the command compiler that turns
//! it into a `clamscan`/`freshclam` argument list, configuration loading, and the
//! error types shared across all Clamguard components. Nothing in here spawns a
//! process; see `clamguard-services` for that.

pub mod command;
pub mod config;
pub mod error;
pub mod options;

// Re-export commonly used types
pub use command::{compile, CommandLine, STDIN_MARKER};
pub use config::{ScannerConfig, DEFAULT_CLAMCONF_COMMAND};
pub use error::{ErrorMetadata, LogLevel, ValidationError};
pub use options::{
    OptionKind, OptionSpec, OptionValue, PuaCategory, ScanOptions, SizeValue, SsnFormat, Statistics,
    SymlinkMode, UpdaterOptions, YesNo, OPTION_SCHEMA,
};
