use anyhow::{bail, Result};

use crate::exec::{CommandSpec, Executor};
use crate::tools::ToolProbe;

/// Supported package managers, probed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Zypper,
    Pacman,
}

impl PackageManager {
    pub fn detect(tools: &dyn ToolProbe) -> Option<Self> {
        [
            Self::Apt,
            Self::Dnf,
            Self::Yum,
            Self::Zypper,
            Self::Pacman,
        ]
        .into_iter()
        .find(|manager| tools.find(manager.program()).is_some())
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Zypper => "zypper",
            Self::Pacman => "pacman",
        }
    }

    pub fn install_spec(self, package: &str) -> CommandSpec {
        match self {
            Self::Apt => CommandSpec::new("apt-get").args(["install", "-y", package]),
            Self::Dnf => CommandSpec::new("dnf").args(["install", "-y", package]),
            Self::Yum => CommandSpec::new("yum").args(["install", "-y", package]),
            Self::Zypper => {
                CommandSpec::new("zypper").args(["--non-interactive", "install", package])
            }
            Self::Pacman => CommandSpec::new("pacman").args(["-S", "--noconfirm", package]),
        }
    }
}

/// Make sure a download utility (curl or wget) and tar are available,
/// installing through the detected package manager when missing. Runs
/// before any backup is taken; a failure here aborts with nothing changed.
pub fn ensure_prerequisites(executor: &Executor<'_>, tools: &dyn ToolProbe) -> Result<()> {
    let mut missing = Vec::new();
    if tools.find("curl").is_none() && tools.find("wget").is_none() {
        missing.push("curl");
    }
    if tools.find("tar").is_none() {
        missing.push("tar");
    }

    if missing.is_empty() {
        return Ok(());
    }

    let Some(manager) = PackageManager::detect(tools) else {
        bail!(
            "no supported package manager found to install: {}",
            missing.join(", ")
        );
    };

    for package in missing {
        executor.execute(
            &manager.install_spec(package),
            "failed to install prerequisite",
        )?;
    }

    Ok(())
}
