//! Filesystem layout of the KDK config root.
//!
//! Everything the tool persists lives under a single directory:
//! - `$KDK_CONFIG_DIR` when set
//! - `~/.kdk` otherwise
//!
//! ```text
//! <root>/ssh/id_rsa            private key (0600)
//! <root>/ssh/id_rsa.pub        authorized-key line
//! <root>/<name>/config.yaml    one environment's configuration (0600)
//! <root>/keybase               mirror target on Windows
//! <root>/keybase-mirror.cmd    mirror launcher on Windows
//! ```

use crate::error::{KdkError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the config root.
pub const CONFIG_DIR_ENV: &str = "KDK_CONFIG_DIR";

/// Get the user's home directory.
#[must_use = "home directory path should be used"]
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| KdkError::Filesystem("Could not determine home directory".to_string()))
}

/// Resolved locations of every file the tool reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdkPaths {
    root: PathBuf,
}

impl KdkPaths {
    /// Resolve the config root from `KDK_CONFIG_DIR` or the home directory.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Ok(Self::at(PathBuf::from(dir))),
            _ => Ok(Self::at(home_dir()?.join(".kdk"))),
        }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ssh_dir(&self) -> PathBuf {
        self.root.join("ssh")
    }

    #[must_use = "private key path should be used"]
    pub fn private_key(&self) -> PathBuf {
        self.ssh_dir().join("id_rsa")
    }

    #[must_use = "public key path should be used"]
    pub fn public_key(&self) -> PathBuf {
        self.ssh_dir().join("id_rsa.pub")
    }

    pub fn environment_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    #[must_use = "configuration path should be used"]
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.environment_dir(name).join("config.yaml")
    }

    pub fn keybase_dir(&self) -> PathBuf {
        self.root.join("keybase")
    }

    /// Present once the Windows mirror has populated the keybase directory.
    pub fn keybase_sentinel(&self) -> PathBuf {
        self.keybase_dir().join("private")
    }

    pub fn mirror_script(&self) -> PathBuf {
        self.root.join("keybase-mirror.cmd")
    }
}

/// Create `path` (and parents) if missing.
///
/// "Already exists" is not an error; any other failure is. On Unix `mode` is
/// applied only when this call created the directory; existing directories
/// keep whatever permissions their owner gave them.
pub fn ensure_dir(path: &Path, mode: Option<u32>) -> Result<()> {
    if path.is_dir() {
        debug!("Directory {} already exists", path.display());
        return Ok(());
    }
    match fs::create_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => return Ok(()),
        Err(e) => {
            return Err(KdkError::Filesystem(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            )))
        }
    }
    debug!("Created directory {}", path.display());

    match mode {
        Some(mode) => set_mode(path, mode),
        None => Ok(()),
    }
}

/// Restrict a directory the tool owns to its owner (0700), even if it already existed.
pub fn restrict_dir(path: &Path) -> Result<()> {
    set_mode(path, 0o700)
}

/// Restrict a file to its owner (0600). No-op off Unix.
pub fn restrict_file(path: &Path) -> Result<()> {
    set_mode(path, 0o600)
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| {
            KdkError::Filesystem(format!(
                "Failed to set permissions on {}: {}",
                path.display(),
                e
            ))
        })?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let paths = KdkPaths::at("/home/dev/.kdk");
        assert_eq!(paths.private_key(), PathBuf::from("/home/dev/.kdk/ssh/id_rsa"));
        assert_eq!(
            paths.public_key(),
            PathBuf::from("/home/dev/.kdk/ssh/id_rsa.pub")
        );
        assert_eq!(
            paths.config_file("work"),
            PathBuf::from("/home/dev/.kdk/work/config.yaml")
        );
        assert_eq!(
            paths.keybase_sentinel(),
            PathBuf::from("/home/dev/.kdk/keybase/private")
        );
    }

    #[test]
    #[serial]
    fn test_from_env_prefers_override() {
        let temp = TempDir::new().unwrap();
        std::env::set_var(CONFIG_DIR_ENV, temp.path());
        let paths = KdkPaths::from_env().unwrap();
        std::env::remove_var(CONFIG_DIR_ENV);
        assert_eq!(paths.root(), temp.path());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");
        ensure_dir(&dir, Some(0o700)).unwrap();
        ensure_dir(&dir, Some(0o700)).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_ensure_dir_fails_when_path_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        fs::write(&file, "x").unwrap();
        let err = ensure_dir(&file, None).unwrap_err();
        assert!(matches!(err, KdkError::Filesystem(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_dir_leaves_existing_mode_alone() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let existing = temp.path().join("project");
        fs::create_dir(&existing).unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o755)).unwrap();

        ensure_dir(&existing, Some(0o700)).unwrap();
        let mode = fs::metadata(&existing).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);

        let created = existing.join("fresh");
        ensure_dir(&created, Some(0o700)).unwrap();
        let mode = fs::metadata(&created).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn test_restrict_file_sets_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("secret");
        fs::write(&file, "x").unwrap();
        restrict_file(&file).unwrap();
        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
