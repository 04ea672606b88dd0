//! Clamguard Services Layer
//!
//! Runs the external ClamAV tools on behalf of callers: `ScanEngine` refreshes
//! the signature database when due, runs `clamscan` over an in-memory payload
//! and turns its exit status into a `ScanVerdict`. Option handling and command
//! compilation live in `clamguard-core`.

pub mod database;
pub mod engine;
pub mod error;
pub mod freshness;
pub mod process;
pub mod verdict;

pub use database::{locate_database_dir, parse_database_dir};
pub use engine::ScanEngine;
pub use error::{EngineError, ProcessError};
pub use freshness::{Clock, FreshnessCache, RefreshOutcome, SystemClock};
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use verdict::{interpret, parse_signature, ScanVerdict};
