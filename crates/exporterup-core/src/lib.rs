mod arch;
mod error;
mod plan;
mod settings;
mod unit;
mod version;

pub use arch::ArchTag;
pub use error::{ArtifactFailure, SetupError};
pub use plan::{Action, BackupRecord, DeploymentPlan, DesiredState, ObservedState, Summary};
pub use settings::{RunSettings, SettingsDefaults, SettingsOverrides};
pub use unit::render_unit;
pub use version::{extract_version, parse_version_token};
