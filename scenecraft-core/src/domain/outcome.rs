//! Execution outcome domain types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Why an execution attempt failed
///
/// Every failure the execution backend can produce is reported as one of
/// these values inside an [`ExecutionOutcome`]; none of them escape as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The safety validator rejected the code
    UnsafeCode,
    /// Another render was already running on the same backend
    LockContention,
    /// The render tool reported a failure through its own response
    ApplicationError,
    /// The render exceeded its wall-clock limit
    TimedOut,
    /// The engine ran but failed or produced no video
    RenderFailed,
    /// Local failure before or while starting the engine
    Internal,
}

/// Result of one execution attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub video_path: Option<PathBuf>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub failure: Option<FailureKind>,
}

impl ExecutionOutcome {
    /// Creates a successful outcome for a located video
    pub fn rendered(video_path: PathBuf, stdout: Option<String>) -> Self {
        Self {
            success: true,
            video_path: Some(video_path),
            stdout,
            stderr: None,
            failure: None,
        }
    }

    /// Creates a failed outcome
    pub fn failed(kind: FailureKind, stderr: impl Into<String>, stdout: Option<String>) -> Self {
        Self {
            success: false,
            video_path: None,
            stdout,
            stderr: Some(stderr.into()),
            failure: Some(kind),
        }
    }

    /// Error text fed back into the repair loop
    pub fn error_text(&self) -> String {
        match self.stderr.as_deref() {
            Some(stderr) if !stderr.trim().is_empty() => stderr.to_string(),
            _ => "Unknown error occurred".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_outcome() {
        let outcome = ExecutionOutcome::rendered(PathBuf::from("/tmp/a.mp4"), None);
        assert!(outcome.success);
        assert_eq!(outcome.failure, None);
        assert_eq!(outcome.video_path, Some(PathBuf::from("/tmp/a.mp4")));
    }

    #[test]
    fn test_failed_outcome_has_no_video() {
        let outcome = ExecutionOutcome::failed(FailureKind::TimedOut, "timed out", None);
        assert!(!outcome.success);
        assert!(outcome.video_path.is_none());
        assert_eq!(outcome.failure, Some(FailureKind::TimedOut));
        assert_eq!(outcome.error_text(), "timed out");
    }

    #[test]
    fn test_error_text_default() {
        let mut outcome = ExecutionOutcome::failed(FailureKind::RenderFailed, "", None);
        assert_eq!(outcome.error_text(), "Unknown error occurred");

        outcome.stderr = None;
        assert_eq!(outcome.error_text(), "Unknown error occurred");
    }

    #[test]
    fn test_failure_kind_serialization() {
        let json = serde_json::to_string(&FailureKind::LockContention).unwrap();
        assert_eq!(json, "\"lock_contention\"");
    }
}
