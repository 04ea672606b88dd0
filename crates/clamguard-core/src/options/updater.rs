use serde::{Deserialize, Serialize};

use crate::command::CommandLine;
use crate::error::ValidationError;

/// Updater executable used when none is configured.
pub const DEFAULT_UPDATE_COMMAND: &str = "freshclam";

/// Options for the signature updater (`freshclam`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdaterOptions {
    pub command: String,
    pub verbose: bool,
    pub quiet: bool,
    /// Alternate `freshclam.conf`.
    pub config_file: Option<String>,
    /// Directory the databases are written to.
    pub datadir: Option<String>,
}

impl Default for UpdaterOptions {
    fn default() -> Self {
        Self {
            command: DEFAULT_UPDATE_COMMAND.to_string(),
            verbose: false,
            quiet: false,
            config_file: None,
            datadir: None,
        }
    }
}

impl UpdaterOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.command.trim().is_empty() {
            return Err(ValidationError::EmptyValue("updater command".to_string()));
        }
        for (name, value) in [("config_file", &self.config_file), ("datadir", &self.datadir)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ValidationError::EmptyValue(name.to_string()));
            }
        }
        Ok(())
    }

    /// `freshclam` argument list; the default is the bare executable.
    pub fn compile(&self) -> CommandLine {
        let mut tokens = vec![self.command.clone()];
        if self.verbose {
            tokens.push("--verbose".to_string());
        }
        if self.quiet {
            tokens.push("--quiet".to_string());
        }
        if let Some(config_file) = &self.config_file {
            tokens.push(format!("--config-file={}", config_file));
        }
        if let Some(datadir) = &self.datadir {
            tokens.push(format!("--datadir={}", datadir));
        }
        CommandLine::from(tokens)
    }
}
