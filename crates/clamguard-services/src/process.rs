//! Process invoker
//!
//! Runs an external command, streams a payload into its stdin and collects both
//! output streams. The child is owned by the call: if the future is dropped
//! (for example by a timeout) the child is killed.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::ProcessError;

/// What a finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The process exited before reading the whole payload.
    pub stdin_truncated: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `argv` to completion. `argv[0]` is the executable. With `stdin` set,
    /// the payload is written in full and the pipe closed; otherwise stdin is null.
    async fn run(&self, argv: &[String], stdin: Option<&[u8]>)
        -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        argv: &[String],
        stdin: Option<&[u8]>,
    ) -> Result<ProcessOutput, ProcessError> {
        let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;

        tracing::debug!(
            program = %program,
            args = ?args,
            payload_bytes = ?stdin.map(<[u8]>::len),
            "Spawning process"
        );

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        // stdin is fed concurrently with draining stdout/stderr.
        let pipe = child.stdin.take();
        let feed = async move {
            let (Some(mut pipe), Some(payload)) = (pipe, stdin) else {
                return Ok(false);
            };
            let written = pipe.write_all(payload).await;
            drop(pipe);
            match written {
                Ok(()) => Ok(false),
                Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(true),
                Err(err) => Err(err),
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|source| ProcessError::Wait {
            program: program.clone(),
            source,
        })?;
        let stdin_truncated = fed.map_err(|source| ProcessError::Stdin {
            program: program.clone(),
            source,
        })?;

        let result = ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            stdin_truncated,
        };

        tracing::debug!(
            program = %program,
            code = ?result.code,
            stdin_truncated = result.stdin_truncated,
            "Process finished"
        );

        Ok(result)
    }
}
