use std::path::Path;

use semver::Version;

use exporterup_core::{extract_version, ArchTag, ObservedState};

use crate::exec::{CommandRunner, CommandSpec};
use crate::service;

/// Map `uname -m` onto the closed architecture set. Any probe failure falls
/// back to amd64, mirroring the unrecognized-string policy.
pub fn detect_architecture(runner: &dyn CommandRunner) -> ArchTag {
    match runner.run(&CommandSpec::new("uname").arg("-m")) {
        Ok(output) if output.success => ArchTag::from_machine(&output.stdout),
        _ => ArchTag::Amd64,
    }
}

/// Ask the installed binary for its version. Absence, a non-executable
/// file, a failing invocation, or an unparseable banner all yield `None`;
/// this probe never fails the run.
pub fn detect_installed_version(
    runner: &dyn CommandRunner,
    binary_path: &Path,
) -> Option<Version> {
    if !is_executable_file(binary_path) {
        return None;
    }

    let spec = CommandSpec::new(binary_path.display().to_string()).arg("--version");
    let output = runner.run(&spec).ok()?;
    if !output.success {
        return None;
    }

    // Older exporters print the version banner on stderr.
    extract_version(&output.stdout).or_else(|| extract_version(&output.stderr))
}

/// Recompute the full observed state. Called at the start of every run;
/// results are never cached across runs.
pub fn observe(
    runner: &dyn CommandRunner,
    binary_path: &Path,
    service_name: &str,
) -> ObservedState {
    ObservedState {
        installed_version: detect_installed_version(runner, binary_path),
        binary_present: binary_path.exists(),
        service_active: service::is_active(runner, service_name),
        architecture: detect_architecture(runner),
    }
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
