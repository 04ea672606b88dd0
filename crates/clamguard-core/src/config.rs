//! Configuration module
//!
//! Assembles everything a scan engine needs from the environment (and a `.env`
//! file when present). Scanner options can be supplied as a JSON file; the
//! individual variables below are applied on top of it.

use std::env;
use std::fs;
use std::time::Duration;

use anyhow::Context;

use crate::options::{ScanOptions, UpdaterOptions};

/// Executable that reports the installed ClamAV configuration.
pub const DEFAULT_CLAMCONF_COMMAND: &str = "clamconf";

/// Engine inputs resolved from the environment.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    pub options: ScanOptions,
    pub updater: UpdaterOptions,
    /// Executable queried for the default database directory.
    pub clamconf_command: String,
    /// Minimum time between database refreshes. `None` refreshes before every scan.
    pub refresh_interval: Option<Duration>,
    /// Caller-side limit on a single scan. `None` waits for the scanner.
    pub scan_timeout: Option<Duration>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            options: ScanOptions::default(),
            updater: UpdaterOptions::default(),
            clamconf_command: DEFAULT_CLAMCONF_COMMAND.to_string(),
            refresh_interval: None,
            scan_timeout: None,
        }
    }
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut options = match var("CLAMGUARD_OPTIONS_FILE") {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read scanner options from {}", path))?;
                ScanOptions::from_json(&json)
                    .with_context(|| format!("Invalid scanner options in {}", path))?
            }
            None => ScanOptions::default(),
        };
        if let Some(command) = var("CLAMSCAN_COMMAND") {
            options.command = command;
        }
        if let Some(database) = var("CLAMAV_DATABASE") {
            options.database = Some(database);
        }

        let mut updater = UpdaterOptions::default();
        if let Some(command) = var("FRESHCLAM_COMMAND") {
            updater.command = command;
        }
        updater.config_file = var("FRESHCLAM_CONFIG_FILE");
        updater.datadir = var("FRESHCLAM_DATADIR");

        let refresh_interval = match var("DATABASE_REFRESH_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    anyhow::anyhow!("DATABASE_REFRESH_INTERVAL_SECS must be a valid number")
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let scan_timeout = match var("SCAN_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("SCAN_TIMEOUT_SECS must be a valid number"))?;
                if secs == 0 {
                    return Err(anyhow::anyhow!("SCAN_TIMEOUT_SECS must be greater than 0"));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let config = Self {
            options,
            updater,
            clamconf_command: var("CLAMCONF_COMMAND")
                .unwrap_or_else(|| DEFAULT_CLAMCONF_COMMAND.to_string()),
            refresh_interval,
            scan_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.options.validate()?;
        self.updater.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = ScannerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.options, ScanOptions::default());
        assert_eq!(config.updater, UpdaterOptions::default());
        assert_eq!(config.clamconf_command, "clamconf");
        assert!(config.refresh_interval.is_none());
        assert!(config.scan_timeout.is_none());
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = ScannerConfig::from_lookup(lookup_from(&[
            ("CLAMSCAN_COMMAND", "/opt/clamav/bin/clamscan"),
            ("CLAMAV_DATABASE", "/srv/clamav"),
            ("FRESHCLAM_DATADIR", "/srv/clamav"),
            ("CLAMCONF_COMMAND", "/opt/clamav/bin/clamconf"),
            ("DATABASE_REFRESH_INTERVAL_SECS", "3600"),
            ("SCAN_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.options.command, "/opt/clamav/bin/clamscan");
        assert_eq!(config.options.database.as_deref(), Some("/srv/clamav"));
        assert_eq!(config.updater.datadir.as_deref(), Some("/srv/clamav"));
        assert_eq!(config.clamconf_command, "/opt/clamav/bin/clamconf");
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.scan_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_refresh_interval_means_every_scan() {
        let config =
            ScannerConfig::from_lookup(lookup_from(&[("DATABASE_REFRESH_INTERVAL_SECS", "0")]))
                .unwrap();
        assert!(config.refresh_interval.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(ScannerConfig::from_lookup(lookup_from(&[(
            "DATABASE_REFRESH_INTERVAL_SECS",
            "hourly"
        )]))
        .is_err());
        assert!(ScannerConfig::from_lookup(lookup_from(&[("SCAN_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"infected": true, "max_files": 50}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = ScannerConfig::from_lookup(lookup_from(&[
            ("CLAMGUARD_OPTIONS_FILE", path.as_str()),
            ("CLAMAV_DATABASE", "/srv/clamav"),
        ]))
        .unwrap();
        assert!(config.options.infected);
        assert_eq!(config.options.max_files, Some(50));
        assert_eq!(config.options.database.as_deref(), Some("/srv/clamav"));
    }

    #[test]
    fn test_missing_or_invalid_options_file() {
        assert!(ScannerConfig::from_lookup(lookup_from(&[(
            "CLAMGUARD_OPTIONS_FILE",
            "/nonexistent/clamguard.json"
        )]))
        .is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"follow_dir_symlinks": 7}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();
        assert!(
            ScannerConfig::from_lookup(lookup_from(&[("CLAMGUARD_OPTIONS_FILE", path.as_str())])).is_err()
        );
    }
}
