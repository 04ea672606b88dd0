//! Interpretation of clamscan's exit status.
//!
//! 0 is clean, 1 is infected, anything else (including death by signal) is an
//! error that callers must treat as not clean. An exit of 0 after the scanner
//! stopped reading stdin early is also an error: it never saw the whole payload,
//! so the content is not reported clean.

use crate::process::ProcessOutput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    Clean,
    /// Signature name when clamscan reported one.
    Infected(Option<String>),
    Error(String),
}

impl ScanVerdict {
    /// Only `Clean` is clean; errors fail closed.
    pub fn is_clean(&self) -> bool {
        matches!(self, ScanVerdict::Clean)
    }
}

pub fn interpret(output: &ProcessOutput) -> ScanVerdict {
    if !output.stdout.trim().is_empty() {
        tracing::debug!(stdout = %output.stdout.trim_end(), "Scanner stdout");
    }
    if !output.stderr.trim().is_empty() {
        tracing::debug!(stderr = %output.stderr.trim_end(), "Scanner stderr");
    }

    match output.code {
        Some(0) if output.stdin_truncated => {
            tracing::error!("Scanner exited before reading the whole payload");
            ScanVerdict::Error("scanner exited before reading the whole payload".to_string())
        }
        Some(0) => {
            tracing::info!("File scan completed: clean");
            ScanVerdict::Clean
        }
        Some(1) => {
            let signature = parse_signature(&output.stdout);
            tracing::warn!(virus = ?signature, "File scan detected virus");
            ScanVerdict::Infected(signature)
        }
        code => {
            let detail = match (output.stderr.trim(), code) {
                (stderr, _) if !stderr.is_empty() => stderr.to_string(),
                (_, Some(code)) => format!("scanner exited with code {}", code),
                (_, None) => "scanner was terminated by a signal".to_string(),
            };
            tracing::error!(code = ?code, error = %detail, "Scanner failed");
            ScanVerdict::Error(detail)
        }
    }
}

/// Signature from a `<name>: <signature> FOUND` report line.
pub fn parse_signature(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let finding = line.trim_end().strip_suffix(" FOUND")?;
        let (_, signature) = finding.rsplit_once(": ")?;
        let signature = signature.trim();
        (!signature.is_empty()).then(|| signature.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(code: Option<i32>, stdout: &str, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            stdin_truncated: false,
        }
    }

    #[test]
    fn test_exit_zero_is_clean() {
        let verdict = interpret(&output(Some(0), "stdin: OK\n", ""));
        assert_eq!(verdict, ScanVerdict::Clean);
        assert!(verdict.is_clean());
    }

    #[test]
    fn test_exit_one_is_infected_with_signature() {
        let verdict = interpret(&output(
            Some(1),
            "stdin: Win.Test.EICAR_HDB-1 FOUND\n\n----------- SCAN SUMMARY -----------\n",
            "",
        ));
        assert_eq!(
            verdict,
            ScanVerdict::Infected(Some("Win.Test.EICAR_HDB-1".to_string()))
        );
        assert!(!verdict.is_clean());
    }

    #[test]
    fn test_exit_one_without_report_line() {
        let verdict = interpret(&output(Some(1), "", ""));
        assert_eq!(verdict, ScanVerdict::Infected(None));
    }

    #[test]
    fn test_other_exit_carries_stderr() {
        let verdict = interpret(&output(
            Some(2),
            "",
            "LibClamAV Error: cli_loaddbdir: No supported database files found\n",
        ));
        assert_eq!(
            verdict,
            ScanVerdict::Error(
                "LibClamAV Error: cli_loaddbdir: No supported database files found".to_string()
            )
        );
        assert!(!verdict.is_clean());
    }

    #[test]
    fn test_other_exit_without_stderr() {
        assert_eq!(
            interpret(&output(Some(40), "", "")),
            ScanVerdict::Error("scanner exited with code 40".to_string())
        );
        assert_eq!(
            interpret(&output(None, "", "")),
            ScanVerdict::Error("scanner was terminated by a signal".to_string())
        );
    }

    #[test]
    fn test_truncated_payload_is_not_clean() {
        let mut result = output(Some(0), "", "");
        result.stdin_truncated = true;
        assert!(matches!(interpret(&result), ScanVerdict::Error(_)));
    }

    #[test]
    fn test_parse_signature_with_colon_in_name() {
        assert_eq!(
            parse_signature("/tmp/a:b.txt: Eicar-Signature FOUND"),
            Some("Eicar-Signature".to_string())
        );
        assert_eq!(parse_signature("stdin: OK"), None);
    }
}
