use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use exporterup_system::{CommandSpec, Executor};

/// Put the new binary in place: copy into a staging file next to the
/// destination, mark it executable, then rename over the old binary so the
/// path never holds a half-written file. Ownership goes to the service
/// account.
pub fn install_binary(
    executor: &Executor<'_>,
    source: &Path,
    dest: &Path,
    owner: &str,
) -> Result<()> {
    let staging = dest.with_extension("staged");
    fs::copy(source, &staging)
        .with_context(|| format!("failed to stage binary at: {}", staging.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&staging, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to mark executable: {}", staging.display()))?;
    }

    fs::rename(&staging, dest)
        .with_context(|| format!("failed to install binary at: {}", dest.display()))?;

    executor.execute(
        &CommandSpec::new("chown")
            .arg(owner)
            .arg(dest.display().to_string()),
        "failed to set binary ownership",
    )?;

    tracing::info!(path = %dest.display(), "binary installed");
    Ok(())
}

/// Write the unit file through a staging file and rename, same discipline as
/// the binary.
pub fn install_unit(unit_path: &Path, contents: &str) -> Result<()> {
    let staging = unit_path.with_extension("staged");
    fs::write(&staging, contents)
        .with_context(|| format!("failed to stage unit file at: {}", staging.display()))?;
    fs::rename(&staging, unit_path)
        .with_context(|| format!("failed to install unit file at: {}", unit_path.display()))?;

    tracing::info!(path = %unit_path.display(), "unit file installed");
    Ok(())
}
