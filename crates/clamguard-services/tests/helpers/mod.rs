//! Test helpers: a scripted `ProcessRunner` that records every invocation.
//!
//! Run from workspace root: `cargo test -p clamguard-services`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use clamguard_services::{ProcessError, ProcessOutput, ProcessRunner};

pub const EICAR: &[u8] =
    br"X5O!P%@AP[4\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

pub const CLAMCONF_REPORT: &str = "Config file: freshclam.conf\n\
---------------------------\n\
DatabaseOwner = \"clamav\"\n\
DatabaseDirectory = \"/var/lib/clamav\"\n";

/// How the fake answers for one program.
#[derive(Clone)]
pub enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    /// The executable does not exist.
    Missing,
    /// Never finishes on its own.
    Hang,
    /// Succeeds with no output after the given delay.
    Slow(Duration),
}

impl Reply {
    pub fn exit(code: i32, stdout: &str) -> Self {
        Reply::Exit {
            code,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: &str) -> Self {
        Reply::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub argv: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

impl Call {
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }
}

pub struct FakeRunner {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRunner {
    /// A healthy installation: freshclam succeeds, clamconf reports
    /// `/var/lib/clamav`, clamscan finds nothing.
    pub fn new() -> Self {
        let replies = HashMap::from([
            ("freshclam".to_string(), Reply::exit(0, "Database updated\n")),
            ("clamconf".to_string(), Reply::exit(0, CLAMCONF_REPORT)),
            ("clamscan".to_string(), Reply::exit(0, "stdin: OK\n")),
        ]);
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, program: &str, reply: Reply) -> Self {
        self.set_reply(program, reply);
        self
    }

    pub fn set_reply(&self, program: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert(program.to_string(), reply);
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| call.program().to_string())
            .collect()
    }

    pub fn count(&self, program: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.program() == program)
            .count()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(
        &self,
        argv: &[String],
        stdin: Option<&[u8]>,
    ) -> Result<ProcessOutput, ProcessError> {
        let program = argv.first().cloned().ok_or(ProcessError::EmptyCommand)?;
        self.calls.lock().unwrap().push(Call {
            argv: argv.to_vec(),
            stdin: stdin.map(<[u8]>::to_vec),
        });

        let reply = self.replies.lock().unwrap().get(&program).cloned();
        match reply.unwrap_or(Reply::Missing) {
            Reply::Exit {
                code,
                stdout,
                stderr,
            } => Ok(ProcessOutput {
                code: Some(code),
                stdout,
                stderr,
                stdin_truncated: false,
            }),
            Reply::Missing => Err(ProcessError::Spawn {
                program,
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok(ProcessOutput::default())
            }
            Reply::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(ProcessOutput {
                    code: Some(0),
                    ..ProcessOutput::default()
                })
            }
        }
    }
}
