//! Invocation of the external nmap binary.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio::time::timeout;

use crate::errors::ScanError;
use crate::types::ScanProfile;

/// Runs nmap as a child process and captures its XML report.
///
/// One child process per invocation, bounded by `timeout`. The XML report
/// goes to a named temporary file that is removed when the handle drops,
/// on every exit path.
pub struct NmapRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl NmapRunner {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Invoke nmap against `target` with the profile's argument set and
    /// return the raw XML report text.
    ///
    /// Launch failure, timeout, and non-zero exit all surface as
    /// [`ScanError::Invocation`] carrying the engine's diagnostic text.
    pub async fn invoke(&self, target: &str, profile: ScanProfile) -> Result<String, ScanError> {
        let report = NamedTempFile::new().map_err(|e| {
            ScanError::Invocation(format!("failed to create scan output file: {e}"))
        })?;

        let start = Instant::now();
        tracing::debug!(target, ?profile, binary = %self.binary.display(), "invoking nmap");

        let mut cmd = Command::new(&self.binary);
        cmd.args(profile.args())
            .arg("-oX")
            .arg(report.path())
            .arg(target)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ScanError::Invocation(format!(
                    "failed to launch {}: {e}. Is nmap installed?",
                    self.binary.display()
                )));
            }
            // kill_on_drop reaps the child when the output future is dropped.
            Err(_) => {
                return Err(ScanError::Invocation(format!(
                    "scan timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diag = stderr.trim();
            let msg = if diag.is_empty() {
                format!("nmap exited with {}", output.status)
            } else {
                diag.to_string()
            };
            return Err(ScanError::Invocation(msg));
        }

        tracing::debug!(target, elapsed_ms = start.elapsed().as_millis() as u64, "nmap finished");

        tokio::fs::read_to_string(report.path())
            .await
            .map_err(|e| ScanError::Invocation(format!("failed to read scan output: {e}")))
    }
}
