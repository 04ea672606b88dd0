//! End-to-end checks against a real ClamAV installation.
//!
//! Ignored by default; run with `cargo test -p clamguard-services -- --ignored`
//! on a host with `clamscan`, `clamconf` and a signature database.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use clamguard_core::ScanOptions;
use clamguard_services::{FreshnessCache, ScanEngine, ScanVerdict};
use helpers::EICAR;

fn engine() -> ScanEngine {
    let freshness = Arc::new(FreshnessCache::new(Some(Duration::from_secs(86_400))));
    ScanEngine::new(ScanOptions::default(), freshness)
}

#[tokio::test]
#[ignore] // Requires clamscan and clamconf on PATH
async fn test_benign_bytes_are_clean() {
    let verdict = engine().scan(b"hello").await.unwrap();
    assert_eq!(verdict, ScanVerdict::Clean);
}

#[tokio::test]
#[ignore] // Requires clamscan and clamconf on PATH
async fn test_eicar_is_infected() {
    let verdict = engine().scan(EICAR).await.unwrap();
    assert!(
        matches!(verdict, ScanVerdict::Infected(_)),
        "expected infected, got {:?}",
        verdict
    );
}

#[tokio::test]
#[ignore] // Requires clamconf on PATH
async fn test_default_options_compile_to_database_only() {
    let engine = engine();
    let command = engine.command().await.unwrap();
    assert_eq!(command.len(), 2);
    assert_eq!(command.program(), Some("clamscan"));
    assert!(command.args()[0].starts_with("--database="));
}
