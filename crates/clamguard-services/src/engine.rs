//! Scan engine
//!
//! Every scan runs the same steps in order: refresh the signature database if
//! it is due (a failed refresh is logged and the scan goes ahead), compile the
//! scanner command (once per engine), run clamscan with the payload on stdin and
//! `-` as its last argument, then interpret the exit status.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clamguard_core::{
    compile, CommandLine, ScanOptions, ScannerConfig, UpdaterOptions, DEFAULT_CLAMCONF_COMMAND,
};
use tokio::sync::OnceCell;

use crate::database::locate_database_dir;
use crate::error::EngineError;
use crate::freshness::{FreshnessCache, RefreshOutcome};
use crate::process::{ProcessRunner, TokioProcessRunner};
use crate::verdict::{interpret, ScanVerdict};

pub struct ScanEngine {
    options: Arc<ScanOptions>,
    updater: UpdaterOptions,
    clamconf_command: String,
    freshness: Arc<FreshnessCache>,
    runner: Arc<dyn ProcessRunner>,
    command: OnceCell<CommandLine>,
}

impl ScanEngine {
    /// Create an engine sharing `freshness` with every other engine in the process.
    pub fn new(options: ScanOptions, freshness: Arc<FreshnessCache>) -> Self {
        Self {
            options: Arc::new(options),
            updater: UpdaterOptions::default(),
            clamconf_command: DEFAULT_CLAMCONF_COMMAND.to_string(),
            freshness,
            runner: Arc::new(TokioProcessRunner),
            command: OnceCell::new(),
        }
    }

    pub fn from_config(config: &ScannerConfig, freshness: Arc<FreshnessCache>) -> Self {
        Self::new(config.options.clone(), freshness)
            .with_updater(config.updater.clone())
            .with_clamconf_command(config.clamconf_command.clone())
    }

    pub fn with_updater(mut self, updater: UpdaterOptions) -> Self {
        self.updater = updater;
        self
    }

    pub fn with_clamconf_command(mut self, clamconf_command: String) -> Self {
        self.clamconf_command = clamconf_command;
        self
    }

    /// Replace the process runner (tests substitute a fake).
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn freshness(&self) -> &Arc<FreshnessCache> {
        &self.freshness
    }

    /// The compiled scanner command, without the stdin marker.
    ///
    /// When no database is configured it is resolved through `clamconf` the
    /// first time. A failed lookup is not cached.
    pub async fn command(&self) -> Result<&CommandLine, EngineError> {
        self.command
            .get_or_try_init(|| async {
                let command = match self.options.database {
                    Some(_) => compile(&self.options),
                    None => {
                        let database =
                            locate_database_dir(self.runner.as_ref(), &self.clamconf_command)
                                .await?;
                        compile(&ScanOptions {
                            database: Some(database),
                            ..(*self.options).clone()
                        })
                    }
                };
                tracing::debug!(command = %command, "Compiled scanner command");
                Ok::<_, EngineError>(command)
            })
            .await
    }

    /// Scan `bytes`. `Err` means the scanner could not be run at all; a scanner
    /// that ran but failed yields `ScanVerdict::Error`.
    #[tracing::instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn scan(&self, bytes: &[u8]) -> Result<ScanVerdict, EngineError> {
        let start = Instant::now();

        self.update_database().await;

        let argv = self.command().await?.with_stdin_marker();
        let output = self.runner.run(&argv, Some(bytes)).await?;
        let verdict = interpret(&output);

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            clean = verdict.is_clean(),
            "Scan finished"
        );
        Ok(verdict)
    }

    /// `scan` bounded by `timeout`. On expiry the scanner is killed and the
    /// verdict is `ScanVerdict::Error`.
    pub async fn scan_with_timeout(
        &self,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<ScanVerdict, EngineError> {
        match tokio::time::timeout(timeout, self.scan(bytes)).await {
            Ok(result) => result,
            Err(_) => {
                let error_msg = format!("Scan timeout (exceeded {:?})", timeout);
                tracing::error!(error = %error_msg, "Scan timeout");
                Ok(ScanVerdict::Error(error_msg))
            }
        }
    }

    /// Run the updater if a refresh is due. Never fails the caller.
    pub async fn update_database(&self) -> RefreshOutcome {
        let argv = self.updater.compile();
        self.freshness
            .refresh_if_due(|| self.run_updater(&argv))
            .await
    }

    async fn run_updater(&self, argv: &CommandLine) -> Result<(), String> {
        tracing::info!(command = %argv, "Updating signature database");

        let output = self
            .runner
            .run(argv.as_slice(), None)
            .await
            .map_err(|e| e.to_string())?;

        if !output.stdout.trim().is_empty() {
            tracing::info!(stdout = %output.stdout.trim_end(), "Updater stdout");
        }
        if !output.stderr.trim().is_empty() {
            tracing::info!(stderr = %output.stderr.trim_end(), "Updater stderr");
        }

        if output.success() {
            Ok(())
        } else {
            Err(match output.code {
                Some(code) => format!("updater exited with code {}", code),
                None => "updater was terminated by a signal".to_string(),
            })
        }
    }
}
