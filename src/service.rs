//! Orchestration of invocation and parsing into the response envelope.

use crate::errors::ScanError;
use crate::nmap::NmapRunner;
use crate::parser;
use crate::types::{ScanEnvelope, ScanProfile, ScanResult};

/// Turns a `(target, profile)` request into a [`ScanEnvelope`].
///
/// Every failure class collapses into an Error envelope here; nothing past
/// this layer sees a `ScanError`, and no failure is retried.
pub struct ScanService {
    runner: NmapRunner,
}

impl ScanService {
    pub fn new(runner: NmapRunner) -> Self {
        Self { runner }
    }

    pub async fn perform_scan(&self, target: &str, profile: ScanProfile) -> ScanEnvelope {
        match self.scan_inner(target, profile).await {
            Ok(result) => ScanEnvelope::success("Scan completed successfully", result),
            Err(err) => {
                tracing::warn!(target, ?profile, class = error_class(&err), error = %err, "scan failed");
                ScanEnvelope::error(err.to_string())
            }
        }
    }

    async fn scan_inner(&self, target: &str, profile: ScanProfile) -> Result<ScanResult, ScanError> {
        if target.trim().is_empty() {
            return Err(ScanError::EmptyTarget);
        }
        let raw = self.runner.invoke(target, profile).await?;
        parser::parse_scan_xml(&raw)
    }
}

fn error_class(err: &ScanError) -> &'static str {
    match err {
        ScanError::EmptyTarget => "validation",
        ScanError::Invocation(_) => "invocation",
        ScanError::Parse(_) => "parse",
    }
}
