//! Replacing the running `kdk` executable with a released build.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tempfile::{NamedTempFile, TempDir};
use tracing::{info, warn};

use kdk_core::platform::Platform;

use super::reconciler::BinaryInstaller;
use super::release;

/// Installs published release archives over the running executable.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseInstaller {
    platform: Platform,
}

impl ReleaseInstaller {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl BinaryInstaller for ReleaseInstaller {
    fn install(&self, version: &str) -> Result<()> {
        let exe = std::env::current_exe().context("Failed to locate the running kdk executable")?;
        let exe = fs::canonicalize(&exe).unwrap_or(exe);
        update_binary(version, &self.platform, &exe)
    }
}

/// File name of the executable inside release archives.
pub fn binary_name(platform: &Platform) -> &'static str {
    if platform.is_windows() {
        "kdk.exe"
    } else {
        "kdk"
    }
}

/// Download the release archive for `version` and install it over `exe`.
pub fn update_binary(version: &str, platform: &Platform, exe: &Path) -> Result<()> {
    let workdir = TempDir::new().context("Failed to create download directory")?;
    let archive = workdir.path().join(release::archive_name(version, platform));

    release::download(&release::archive_url(version, platform), &archive)?;
    let new_binary = extract_binary(&archive, workdir.path(), binary_name(platform))?;
    replace_executable(&new_binary, exe)
}

/// Unpack `archive` into `dest` and return the path of `name` inside it.
pub fn extract_binary(archive: &Path, dest: &Path, name: &str) -> Result<PathBuf> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open {}", archive.display()))?;
    tar::Archive::new(GzDecoder::new(file))
        .unpack(dest)
        .with_context(|| format!("Failed to extract {}", archive.display()))?;

    let direct = dest.join(name);
    if direct.is_file() {
        return Ok(direct);
    }
    // Some archives wrap the binary in a single top-level directory.
    for entry in fs::read_dir(dest)? {
        let candidate = entry?.path().join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    anyhow::bail!("{} not found in {}", name, archive.display())
}

/// Swap `new_binary` in at `exe`.
///
/// The current executable is moved aside to `<exe>.old`, the new one is
/// written to a temporary file in the same directory and renamed into place.
/// On failure the old executable is put back.
pub fn replace_executable(new_binary: &Path, exe: &Path) -> Result<()> {
    let dir = exe
        .parent()
        .with_context(|| format!("{} has no parent directory", exe.display()))?;
    let backup = backup_path(exe);

    fs::rename(exe, &backup).with_context(|| {
        format!("Failed to move {} aside to {}", exe.display(), backup.display())
    })?;

    match install(new_binary, dir, exe) {
        Ok(()) => {
            info!("Installed {} (previous kept at {})", exe.display(), backup.display());
            Ok(())
        }
        Err(e) => {
            warn!("Install failed, restoring {}", exe.display());
            if let Err(restore) = fs::rename(&backup, exe) {
                warn!("Failed to restore {}: {}", exe.display(), restore);
            }
            Err(e)
        }
    }
}

pub fn backup_path(exe: &Path) -> PathBuf {
    let mut name = exe.as_os_str().to_owned();
    name.push(".old");
    PathBuf::from(name)
}

fn install(new_binary: &Path, dir: &Path, exe: &Path) -> Result<()> {
    let mut source = File::open(new_binary)
        .with_context(|| format!("Failed to open {}", new_binary.display()))?;
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
    io::copy(&mut source, staged.as_file_mut()).context("Failed to stage new binary")?;
    staged.as_file_mut().flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o755))
            .context("Failed to mark new binary executable")?;
    }

    staged
        .persist(exe)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move new binary to {}", exe.display()))?;
    Ok(())
}
