use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use exporterup_core::{ArchTag, ArtifactFailure, SetupError};
use exporterup_system::{CommandSpec, Executor, ToolProbe};

use crate::layout::InstallLayout;

const DOWNLOAD_TIMEOUT_SECS: u32 = 300;
const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Release archive stem, e.g. `node_exporter-1.8.2.linux-amd64`.
pub fn artifact_file_name(service: &str, version: &str, arch: ArchTag) -> String {
    format!("{service}-{version}.linux-{arch}")
}

pub fn artifact_url(base: &str, version: &str, file_name: &str) -> String {
    format!("{base}/v{version}/{file_name}.tar.gz")
}

/// Per-run download/extract workspace, removed on drop so failed runs leave
/// nothing behind.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create(root: &Path) -> Result<Self> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or(0);
        let path = root.join(format!("run-{}-{nanos}", std::process::id()));
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create scratch dir: {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_dir_all(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                %error,
                "failed to remove scratch dir"
            );
        }
    }
}

/// Download and unpack the release archive, returning the path of the
/// extracted binary inside the scratch dir. Nothing outside the scratch dir
/// is touched.
pub fn fetch_binary(
    executor: &Executor<'_>,
    tools: &dyn ToolProbe,
    download_base: &str,
    service: &str,
    version: &str,
    arch: ArchTag,
    scratch: &ScratchDir,
) -> Result<PathBuf, SetupError> {
    let file_name = artifact_file_name(service, version, arch);
    let url = artifact_url(download_base, version, &file_name);
    let archive = scratch.path().join(format!("{file_name}.tar.gz"));

    download(executor, tools, &url, &archive)?;
    extract(executor, &archive, scratch.path())?;

    let binary = scratch.path().join(&file_name).join(service);
    if !binary.is_file() {
        return Err(SetupError::artifact(
            ArtifactFailure::NotFound,
            format!("archive did not contain {file_name}/{service}"),
        ));
    }
    verify_elf(&binary)?;

    Ok(binary)
}

/// Fetch to a `.part` file and rename only on success, so an interrupted
/// download never looks like a finished one.
fn download(
    executor: &Executor<'_>,
    tools: &dyn ToolProbe,
    url: &str,
    dest: &Path,
) -> Result<(), SetupError> {
    let part = dest.with_extension("gz.part");
    let part_str = part.display().to_string();
    let timeout = DOWNLOAD_TIMEOUT_SECS.to_string();

    let spec = if tools.find("curl").is_some() {
        CommandSpec::new("curl").args([
            "-fL",
            "--retry",
            "2",
            "--max-time",
            timeout.as_str(),
            "-o",
            part_str.as_str(),
            url,
        ])
    } else if tools.find("wget").is_some() {
        CommandSpec::new("wget").args([
            "--timeout",
            timeout.as_str(),
            "-O",
            part_str.as_str(),
            url,
        ])
    } else {
        return Err(SetupError::artifact(
            ArtifactFailure::DownloadFailed,
            "neither curl nor wget is available",
        ));
    };

    tracing::info!(%url, "downloading release archive");
    if let Err(error) = executor.execute(&spec, "failed to download archive") {
        let detail = format!("{error:#}");
        let reason = if detail.contains("404") {
            ArtifactFailure::NotFound
        } else {
            ArtifactFailure::DownloadFailed
        };
        return Err(SetupError::artifact(reason, detail));
    }

    fs::rename(&part, dest).map_err(|error| {
        SetupError::artifact(
            ArtifactFailure::DownloadFailed,
            format!("failed to finalize download {}: {error}", dest.display()),
        )
    })
}

fn extract(executor: &Executor<'_>, archive: &Path, dest: &Path) -> Result<(), SetupError> {
    let archive_str = archive.display().to_string();
    let dest_str = dest.display().to_string();
    let spec = CommandSpec::new("tar").args(["-xzf", archive_str.as_str(), "-C", dest_str.as_str()]);
    executor
        .execute(&spec, "failed to extract archive")
        .map_err(|error| {
            SetupError::artifact(ArtifactFailure::ExtractFailed, format!("{error:#}"))
        })?;
    Ok(())
}

/// Cheap sanity check that the extracted file is a Linux executable rather
/// than an error page or text file that slipped through.
fn verify_elf(binary: &Path) -> Result<(), SetupError> {
    use std::io::Read;

    let mut magic = [0u8; 4];
    let read = fs::File::open(binary)
        .and_then(|mut file| file.read(&mut magic))
        .map_err(|error| {
            SetupError::artifact(
                ArtifactFailure::ExtractFailed,
                format!("failed to inspect {}: {error}", binary.display()),
            )
        })?;
    if read != 4 || magic != ELF_MAGIC {
        return Err(SetupError::artifact(
            ArtifactFailure::ExtractFailed,
            format!("{} is not an ELF executable", binary.display()),
        ));
    }
    Ok(())
}
