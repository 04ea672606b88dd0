use clamguard_core::{ErrorMetadata, LogLevel, ValidationError};
use clamguard_services::{EngineError, RefreshOutcome, ScanVerdict};
use serde::Serialize;

/// Process exit status for a clean scan (mirrors clamscan).
pub const EXIT_CLEAN: u8 = 0;
/// Process exit status for an infected scan.
pub const EXIT_INFECTED: u8 = 1;
/// Process exit status for anything that is neither clean nor infected.
pub const EXIT_ERROR: u8 = 2;

pub fn exit_status(verdict: &ScanVerdict) -> u8 {
    match verdict {
        ScanVerdict::Clean => EXIT_CLEAN,
        ScanVerdict::Infected(_) => EXIT_INFECTED,
        ScanVerdict::Error(_) => EXIT_ERROR,
    }
}

/// Parse a `--set name=value` argument.
pub fn parse_assignment(raw: &str) -> Result<(String, String), ValidationError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(ValidationError::MalformedAssignment(raw.to_string())),
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ScanReport<'a> {
    pub target: &'a str,
    pub verdict: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'a str>,
}

impl<'a> ScanReport<'a> {
    pub fn new(target: &'a str, verdict: &'a ScanVerdict) -> Self {
        let (label, signature, detail) = match verdict {
            ScanVerdict::Clean => ("clean", None, None),
            ScanVerdict::Infected(signature) => ("infected", signature.as_deref(), None),
            ScanVerdict::Error(detail) => ("error", None, Some(detail.as_str())),
        };
        Self {
            target,
            verdict: label,
            signature,
            detail,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct UpdateReport<'a> {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> UpdateReport<'a> {
    pub fn new(outcome: &'a RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Refreshed => Self {
                outcome: "refreshed",
                error: None,
            },
            RefreshOutcome::NotDue => Self {
                outcome: "not_due",
                error: None,
            },
            RefreshOutcome::Failed(error) => Self {
                outcome: "failed",
                error: Some(error.as_str()),
            },
        }
    }
}

/// Log an error at the level its type asks for.
pub fn log_error(err: &anyhow::Error) {
    let (code, level) = if let Some(e) = err.downcast_ref::<EngineError>() {
        (e.error_code(), e.log_level())
    } else if let Some(e) = err.downcast_ref::<ValidationError>() {
        (e.error_code(), e.log_level())
    } else {
        ("INTERNAL_ERROR", LogLevel::Error)
    };

    match level {
        LogLevel::Debug => tracing::debug!(error = %err, code, "clamguard failed"),
        LogLevel::Warn => tracing::warn!(error = %err, code, "clamguard failed"),
        LogLevel::Error => tracing::error!(error = %err, code, "clamguard failed"),
    }
}

/// Initialize tracing for CLI binaries. Logs go to stderr; stdout carries reports.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_mirrors_clamscan() {
        assert_eq!(exit_status(&ScanVerdict::Clean), 0);
        assert_eq!(exit_status(&ScanVerdict::Infected(None)), 1);
        assert_eq!(exit_status(&ScanVerdict::Error("boom".to_string())), 2);
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("exclude=^.*\\.log=old$").unwrap(),
            ("exclude".to_string(), "^.*\\.log=old$".to_string())
        );
        assert_eq!(
            parse_assignment("log=").unwrap(),
            ("log".to_string(), String::new())
        );
    }

    #[test]
    fn parse_assignment_rejects_missing_name() {
        assert!(parse_assignment("verbose").is_err());
        assert!(parse_assignment("=yes").is_err());
    }

    #[test]
    fn scan_report_json() {
        let verdict = ScanVerdict::Infected(Some("Win.Test.EICAR_HDB-1".to_string()));
        let json = serde_json::to_value(ScanReport::new("eicar.txt", &verdict)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "target": "eicar.txt",
                "verdict": "infected",
                "signature": "Win.Test.EICAR_HDB-1"
            })
        );

        let verdict = ScanVerdict::Clean;
        let json = serde_json::to_value(ScanReport::new("-", &verdict)).unwrap();
        assert_eq!(json, serde_json::json!({ "target": "-", "verdict": "clean" }));
    }

    #[test]
    fn update_report_json() {
        let outcome = RefreshOutcome::Failed("updater exited with code 1".to_string());
        let json = serde_json::to_value(UpdateReport::new(&outcome)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "outcome": "failed", "error": "updater exited with code 1" })
        );
    }
}
