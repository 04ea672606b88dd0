//! Error types module
//!
//! `ValidationError` is raised when a scanner configuration is built with a value
//! outside its declared domain. It is never retried: the caller that assembled the
//! configuration has to fix it. Runtime failures (spawning processes, talking to
//! `clamconf`) live in `clamguard-services`.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed database refresh
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Self-description of an error, used by binaries to decide how loudly to report it.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "INVALID_CHOICE")
    fn error_code(&self) -> &'static str;

    /// Whether the same call may succeed if simply repeated
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid {kind} '{value}': expected one of {allowed}")]
    InvalidChoice {
        kind: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("Invalid size '{0}': expected bytes or a number followed by K, k, M or m")]
    InvalidSize(String),

    #[error("Invalid number '{value}' for option '{option}'")]
    InvalidNumber { option: String, value: String },

    #[error("Unknown PUA category: {0}")]
    InvalidPuaCategory(String),

    #[error("Option '{option}' is out of range: {reason}")]
    OutOfRange {
        option: &'static str,
        reason: String,
    },

    #[error("Option '{0}' must not be empty")]
    EmptyValue(String),

    #[error("Unknown scanner option: {0}")]
    UnknownOption(String),

    #[error("Malformed option assignment '{0}': expected name=value")]
    MalformedAssignment(String),

    #[error("Invalid scanner options: {0}")]
    Json(#[source] serde_json::Error),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Json(err)
    }
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidChoice { .. } => "INVALID_CHOICE",
            ValidationError::InvalidSize(_) => "INVALID_SIZE",
            ValidationError::InvalidNumber { .. } => "INVALID_NUMBER",
            ValidationError::InvalidPuaCategory(_) => "INVALID_PUA_CATEGORY",
            ValidationError::OutOfRange { .. } => "OUT_OF_RANGE",
            ValidationError::EmptyValue(_) => "EMPTY_VALUE",
            ValidationError::UnknownOption(_) => "UNKNOWN_OPTION",
            ValidationError::MalformedAssignment(_) => "MALFORMED_ASSIGNMENT",
            ValidationError::Json(_) => "INVALID_OPTIONS",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}
