use std::path::PathBuf;

use semver::Version;

use crate::arch::ArchTag;
use crate::settings::RunSettings;
use crate::version::parse_version_token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Update,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Update => "update",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "install" => Some(Self::Install),
            "update" => Some(Self::Update),
            _ => None,
        }
    }
}

/// What the operator asked for. Immutable once computed from flags,
/// environment, and the defaults file.
#[derive(Debug, Clone)]
pub struct DesiredState {
    pub action: Action,
    pub target_version: String,
    pub extra_flags: String,
    pub dry_run: bool,
    pub settings: RunSettings,
}

impl DesiredState {
    pub fn target(&self) -> Option<Version> {
        parse_version_token(&self.target_version)
    }
}

/// What the host looks like right now. Recomputed at the start of every run
/// and never cached across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedState {
    pub installed_version: Option<Version>,
    pub binary_present: bool,
    pub service_active: bool,
    pub architecture: ArchTag,
}

/// Derived decision flags. Invariant: `need_update` implies `need_install`;
/// a fresh install never needs the backup/rollback machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub need_install: bool,
    pub need_update: bool,
}

impl DeploymentPlan {
    pub fn compute(target: &Version, observed: &ObservedState) -> Self {
        let at_target = observed
            .installed_version
            .as_ref()
            .is_some_and(|installed| installed == target);
        let need_install = !observed.binary_present || !at_target;
        Self {
            need_install,
            need_update: need_install && observed.binary_present,
        }
    }
}

/// Backup taken before an update mutates the host. At most one per run;
/// records are never pruned automatically (operator housekeeping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub timestamp: u64,
    pub binary_backup: Option<PathBuf>,
    pub unit_backup: Option<PathBuf>,
    pub binary_sha256: Option<String>,
}

impl BackupRecord {
    pub fn is_empty(&self) -> bool {
        self.binary_backup.is_none() && self.unit_backup.is_none()
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub action: Action,
    pub installed_version: String,
    pub mutated: bool,
    pub dry_run: bool,
    pub backup: Option<BackupRecord>,
}
