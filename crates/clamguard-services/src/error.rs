use clamguard_core::{ErrorMetadata, LogLevel};

/// Failure to run an external process to completion.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Cannot run an empty command line")]
    EmptyCommand,

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to stdin of '{program}': {source}")]
    Stdin {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ErrorMetadata for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::EmptyCommand => "EMPTY_COMMAND",
            ProcessError::Spawn { .. } => "PROCESS_SPAWN_FAILED",
            ProcessError::Stdin { .. } => "PROCESS_STDIN_FAILED",
            ProcessError::Wait { .. } => "PROCESS_WAIT_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ProcessError::Stdin { .. } | ProcessError::Wait { .. })
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Could not determine the signature database directory: {0}")]
    DatabaseLookup(String),
}

impl ErrorMetadata for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            EngineError::Process(err) => err.error_code(),
            EngineError::DatabaseLookup(_) => "DATABASE_LOOKUP_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            EngineError::Process(err) => err.is_recoverable(),
            EngineError::DatabaseLookup(_) => false,
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}
