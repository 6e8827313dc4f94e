use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_SERVICE_NAME: &str = "node_exporter";
pub const DEFAULT_USER: &str = "exporter";
pub const DEFAULT_GROUP: &str = "exporter";
pub const DEFAULT_INSTALL_DIR: &str = "/opt/exporter";
pub const DEFAULT_BINARY_DIR: &str = "/usr/local/bin";
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";
pub const DEFAULT_DOWNLOAD_BASE: &str =
    "https://github.com/prometheus/node_exporter/releases/download";

/// Fully resolved settings for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub service_name: String,
    pub user: String,
    pub group: String,
    pub install_dir: PathBuf,
    pub binary_dir: PathBuf,
    pub unit_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub download_base: String,
}

/// Optional values from the TOML defaults file (lowest precedence).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsDefaults {
    pub service_name: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub install_dir: Option<PathBuf>,
    pub binary_dir: Option<PathBuf>,
    pub unit_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub download_base: Option<String>,
}

/// Optional values from flags and environment (highest precedence).
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub service_name: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub install_dir: Option<PathBuf>,
    pub binary_dir: Option<PathBuf>,
    pub unit_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub download_base: Option<String>,
}

impl SettingsDefaults {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse defaults file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read defaults file: {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid defaults file: {}", path.display()))
    }
}

impl RunSettings {
    /// Resolve flags/env over the defaults file over the built-in values.
    /// An unset backup dir lands under the resolved install dir.
    pub fn resolve(overrides: SettingsOverrides, defaults: SettingsDefaults) -> Self {
        let install_dir = overrides
            .install_dir
            .or(defaults.install_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_DIR));
        let backup_dir = overrides
            .backup_dir
            .or(defaults.backup_dir)
            .unwrap_or_else(|| install_dir.join("backups"));

        Self {
            service_name: overrides
                .service_name
                .or(defaults.service_name)
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            user: overrides
                .user
                .or(defaults.user)
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            group: overrides
                .group
                .or(defaults.group)
                .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            install_dir,
            binary_dir: overrides
                .binary_dir
                .or(defaults.binary_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY_DIR)),
            unit_dir: overrides
                .unit_dir
                .or(defaults.unit_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UNIT_DIR)),
            backup_dir,
            download_base: overrides
                .download_base
                .or(defaults.download_base)
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE.to_string()),
        }
    }

    pub fn binary_path(&self) -> PathBuf {
        self.binary_dir.join(&self.service_name)
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{}.service", self.service_name))
    }

    pub fn owner(&self) -> String {
        format!("{}:{}", self.user, self.group)
    }
}
