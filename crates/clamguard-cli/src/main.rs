//! Clamguard CLI: scan a file or stdin with clamscan.
//!
//! Configuration comes from the environment (see `ScannerConfig::from_env`);
//! `--options` and `--set` adjust the scanner options on top of it. The exit
//! status mirrors clamscan: 0 clean, 1 infected, 2 error.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clamguard_cli::{
    exit_status, init_tracing, log_error, parse_assignment, ScanReport, UpdateReport,
    EXIT_CLEAN, EXIT_ERROR,
};
use clamguard_core::ScannerConfig;
use clamguard_services::{FreshnessCache, RefreshOutcome, ScanEngine};
use serde::Serialize;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "clamguard", about = "Scan content with ClamAV")]
struct Cli {
    /// JSON file with scanner options (replaces CLAMGUARD_OPTIONS_FILE)
    #[arg(long, global = true)]
    options: Option<PathBuf>,
    /// Override a scanner option, e.g. --set max-filesize=50M (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment, global = true)]
    overrides: Vec<(String, String)>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a file, or stdin when the path is `-`
    Scan {
        /// Path to the file to scan
        path: String,
    },
    /// Refresh the signature database with freshclam
    Update,
    /// Print the compiled clamscan command line
    Command,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize report")?;
    println!("{}", out);
    Ok(())
}

async fn read_input(path: &str) -> anyhow::Result<Vec<u8>> {
    if path == "-" {
        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .context("Failed to read stdin")?;
        Ok(bytes)
    } else {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path))
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ScannerConfig> {
    dotenvy::dotenv().ok();

    let options_file = cli
        .options
        .as_ref()
        .map(|path| path.to_string_lossy().to_string());
    let mut config = ScannerConfig::from_lookup(|key| match (key, &options_file) {
        ("CLAMGUARD_OPTIONS_FILE", Some(path)) => Some(path.clone()),
        _ => env::var(key).ok(),
    })?;

    if !cli.overrides.is_empty() {
        config.options = config.options.with_overrides(
            cli.overrides
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )?;
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = load_config(&cli)?;
    let freshness = Arc::new(FreshnessCache::new(config.refresh_interval));
    let engine = ScanEngine::from_config(&config, freshness);

    match cli.command {
        Commands::Scan { path } => {
            let bytes = read_input(&path).await?;
            let verdict = match config.scan_timeout {
                Some(timeout) => engine.scan_with_timeout(&bytes, timeout).await?,
                None => engine.scan(&bytes).await?,
            };
            print_json(&ScanReport::new(&path, &verdict))?;
            Ok(exit_status(&verdict))
        }
        Commands::Update => {
            let outcome = engine.update_database().await;
            print_json(&UpdateReport::new(&outcome))?;
            Ok(match outcome {
                RefreshOutcome::Failed(_) => EXIT_ERROR,
                _ => EXIT_CLEAN,
            })
        }
        Commands::Command => {
            let command = engine.command().await?;
            println!("{}", command);
            Ok(EXIT_CLEAN)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            log_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
