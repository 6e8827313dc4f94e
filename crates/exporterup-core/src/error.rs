use thiserror::Error;

/// Why an artifact could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFailure {
    DownloadFailed,
    ExtractFailed,
    NotFound,
}

impl ArtifactFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DownloadFailed => "download-failed",
            Self::ExtractFailed => "extract-failed",
            Self::NotFound => "not-found",
        }
    }
}

impl std::fmt::Display for ArtifactFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure taxonomy for a run.
///
/// `Config` and `Tooling` are always pre-mutation and never trigger
/// rollback. `Artifact` and `Deploy` trigger rollback only when a backup was
/// taken first; the controller then reports the consolidated `Rollback`
/// variant instead, which is fatal whether or not restoration succeeded.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("host tooling unavailable: {0}")]
    Tooling(String),

    #[error("artifact {reason}: {detail}")]
    Artifact {
        reason: ArtifactFailure,
        detail: String,
    },

    #[error("deployment failed during {step}: {detail}")]
    Deploy { step: String, detail: String },

    #[error(
        "update failed and rollback was attempted ({}); inspect backups with timestamp {timestamp}: {detail}",
        restore_note(.restore_failed)
    )]
    Rollback {
        timestamp: u64,
        detail: String,
        restore_failed: bool,
    },
}

fn restore_note(restore_failed: &bool) -> &'static str {
    if *restore_failed {
        "restore FAILED, manual recovery required"
    } else {
        "previous state restored"
    }
}

impl SetupError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }

    pub fn tooling(detail: impl Into<String>) -> Self {
        Self::Tooling(detail.into())
    }

    pub fn artifact(reason: ArtifactFailure, detail: impl Into<String>) -> Self {
        Self::Artifact {
            reason,
            detail: detail.into(),
        }
    }

    pub fn deploy(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Deploy {
            step: step.into(),
            detail: detail.into(),
        }
    }

    /// Stable process exit code per failure class, so operators can script
    /// against the outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Tooling(_) => 2,
            Self::Artifact { .. } => 3,
            Self::Deploy { .. } => 4,
            Self::Rollback { .. } => 5,
        }
    }
}
