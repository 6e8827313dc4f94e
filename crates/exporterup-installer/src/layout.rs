use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use exporterup_core::RunSettings;
use exporterup_system::{CommandSpec, Executor};

/// The on-disk locations one run touches, resolved once from settings.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    pub install_dir: PathBuf,
    pub binary_path: PathBuf,
    pub unit_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl InstallLayout {
    pub fn from_settings(settings: &RunSettings) -> Self {
        Self {
            install_dir: settings.install_dir.clone(),
            binary_path: settings.binary_path(),
            unit_path: settings.unit_path(),
            backup_dir: settings.backup_dir.clone(),
        }
    }

    /// Create the directories a run writes into. Safe to call every run.
    pub fn ensure_base_dirs(&self) -> Result<()> {
        let binary_dir = self
            .binary_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/"));
        let unit_dir = self
            .unit_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/"));

        for dir in [&self.install_dir, &self.backup_dir, &binary_dir, &unit_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Hand the install and backup dirs to the service account. The binary
    /// and unit dirs are system locations and stay root-owned.
    pub fn ensure_ownership(&self, executor: &Executor<'_>, owner: &str) -> Result<()> {
        for dir in [&self.install_dir, &self.backup_dir] {
            executor.execute(
                &CommandSpec::new("chown")
                    .arg(owner)
                    .arg(dir.display().to_string()),
                "failed to set directory ownership",
            )?;
        }
        Ok(())
    }

    /// Parent for per-run scratch directories. Lives under the install dir
    /// so downloads land on the same filesystem as the final paths.
    pub fn scratch_root(&self) -> PathBuf {
        self.install_dir.join("scratch")
    }
}
