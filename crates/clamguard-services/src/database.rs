//! Default signature database lookup via `clamconf`.

use regex::Regex;

use crate::error::EngineError;
use crate::process::ProcessRunner;

/// Ask `clamconf` where clamscan keeps its signature databases.
pub async fn locate_database_dir(
    runner: &dyn ProcessRunner,
    clamconf_command: &str,
) -> Result<String, EngineError> {
    let output = runner.run(&[clamconf_command.to_string()], None).await?;

    if !output.success() {
        let status = match output.code {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        };
        return Err(EngineError::DatabaseLookup(format!(
            "'{}' terminated with {}: {}",
            clamconf_command,
            status,
            output.stderr.trim()
        )));
    }

    let directory = parse_database_dir(&output.stdout)?;
    tracing::info!(database = %directory, "Resolved signature database directory");
    Ok(directory)
}

/// Extract the `DatabaseDirectory` value from a `clamconf` report.
pub fn parse_database_dir(report: &str) -> Result<String, EngineError> {
    let pattern = Regex::new(r#"DatabaseDirectory\s*=\s*"?([^"\n]+)"#)
        .map_err(|e| EngineError::DatabaseLookup(format!("invalid lookup pattern: {}", e)))?;

    pattern
        .captures(report)
        .and_then(|captures| captures.get(1))
        .map(|directory| directory.as_str().trim().to_string())
        .filter(|directory| !directory.is_empty())
        .ok_or_else(|| {
            EngineError::DatabaseLookup("no DatabaseDirectory in clamconf output".to_string())
        })
}
