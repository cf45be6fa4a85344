use thiserror::Error;

/// Failure classes for a scan request.
///
/// All of them collapse to the same Error envelope at the service boundary;
/// the variants stay distinguishable internally for logging.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Empty target, rejected before anything external runs.
    #[error("Target IP or hostname is required")]
    EmptyTarget,
    /// The engine could not be launched, timed out, or exited non-zero.
    /// Carries the engine's diagnostic text.
    #[error("{0}")]
    Invocation(String),
    /// The engine's XML output was structurally unusable.
    #[error("{0}")]
    Parse(String),
}
