use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use exporterup_core::BackupRecord;
use exporterup_system::{Clock, CommandSpec, Executor};

use crate::layout::InstallLayout;

pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read for checksum: {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Copy the current binary and unit file aside under one shared timestamp.
/// Files that do not exist are simply not backed up; a fresh host yields an
/// empty record. The binary's checksum is captured so a later restore can
/// detect a damaged backup before putting it in place.
pub fn take_backup(clock: &dyn Clock, layout: &InstallLayout) -> Result<BackupRecord> {
    let timestamp = clock.epoch_secs();
    let mut record = BackupRecord {
        timestamp,
        binary_backup: None,
        unit_backup: None,
        binary_sha256: None,
    };

    if layout.binary_path.is_file() {
        let dest = layout
            .backup_dir
            .join(format!("{}-{timestamp}", file_name(&layout.binary_path)));
        fs::copy(&layout.binary_path, &dest).with_context(|| {
            format!("failed to back up binary to: {}", dest.display())
        })?;
        record.binary_sha256 = Some(file_sha256(&dest)?);
        record.binary_backup = Some(dest);
    }

    if layout.unit_path.is_file() {
        let dest = layout
            .backup_dir
            .join(format!("{}-{timestamp}", file_name(&layout.unit_path)));
        fs::copy(&layout.unit_path, &dest).with_context(|| {
            format!("failed to back up unit file to: {}", dest.display())
        })?;
        record.unit_backup = Some(dest);
    }

    tracing::info!(
        timestamp,
        binary = record.binary_backup.is_some(),
        unit = record.unit_backup.is_some(),
        "backup taken"
    );
    Ok(record)
}

/// Put the backed-up files back in place. Fields the backup never captured
/// are skipped. The binary copy is checksum-verified against the record and
/// re-marked executable; ownership is handed back to the service account.
pub fn restore_backup(
    executor: &Executor<'_>,
    record: &BackupRecord,
    layout: &InstallLayout,
    owner: &str,
) -> Result<()> {
    if let Some(backup) = &record.binary_backup {
        if let Some(expected) = &record.binary_sha256 {
            let actual = file_sha256(backup)?;
            if &actual != expected {
                bail!(
                    "backup checksum mismatch for {}: expected {expected}, got {actual}",
                    backup.display()
                );
            }
        }
        restore_file(backup, &layout.binary_path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&layout.binary_path, fs::Permissions::from_mode(0o755))
                .with_context(|| {
                    format!("failed to mark executable: {}", layout.binary_path.display())
                })?;
        }
        executor.execute(
            &CommandSpec::new("chown")
                .arg(owner)
                .arg(layout.binary_path.display().to_string()),
            "failed to restore binary ownership",
        )?;
    }

    if let Some(backup) = &record.unit_backup {
        restore_file(backup, &layout.unit_path)?;
    }

    Ok(())
}

fn restore_file(backup: &Path, dest: &Path) -> Result<()> {
    let staging = dest.with_extension("restore");
    fs::copy(backup, &staging)
        .with_context(|| format!("failed to stage restore of: {}", backup.display()))?;
    fs::rename(&staging, dest)
        .with_context(|| format!("failed to restore: {}", dest.display()))?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}
