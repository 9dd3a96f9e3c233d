//! SSH keypair used to log into every KDK.

use tracing::info;

use kdk_core::command_stream::{capture_command, require_tool};
use kdk_core::error::Result;
use kdk_core::user_paths::{ensure_dir, restrict_dir, restrict_file, KdkPaths};
use kdk_core::kdk_println;
use kdk_messages::{msg, MESSAGES};

const KEY_BITS: &str = "4096";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPairStatus {
    Generated,
    AlreadyPresent,
}

/// Make sure `<configRoot>/ssh/id_rsa[.pub]` exist, generating them with `ssh-keygen` if not.
pub fn ensure(paths: &KdkPaths) -> Result<KeyPairStatus> {
    ensure_dir(paths.root(), Some(0o700))?;
    ensure_dir(&paths.ssh_dir(), Some(0o700))?;
    restrict_dir(&paths.ssh_dir())?;

    let private_key = paths.private_key();
    if private_key.exists() {
        info!("SSH keypair exists at {}", private_key.display());
        return Ok(KeyPairStatus::AlreadyPresent);
    }

    require_tool("ssh-keygen")?;
    kdk_println!("{}", MESSAGES.config.keypair_generating);
    let key_path = private_key.to_string_lossy().to_string();
    capture_command(
        "ssh-keygen",
        &[
            "-q", "-t", "rsa", "-b", KEY_BITS, "-m", "PEM", "-N", "", "-C", "kdk", "-f", key_path.as_str(),
        ],
    )?;
    restrict_file(&private_key)?;

    info!("Generated SSH keypair at {}", private_key.display());
    kdk_println!(
        "{}",
        msg!(MESSAGES.config.keypair_generated, path = private_key.display())
    );
    Ok(KeyPairStatus::Generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_existing_key_is_kept() {
        let temp = TempDir::new().unwrap();
        let paths = KdkPaths::at(temp.path().join("kdk-root"));
        fs::create_dir_all(paths.ssh_dir()).unwrap();
        fs::write(paths.private_key(), "existing").unwrap();

        assert_eq!(ensure(&paths).unwrap(), KeyPairStatus::AlreadyPresent);
        assert_eq!(fs::read_to_string(paths.private_key()).unwrap(), "existing");
    }

    #[cfg(unix)]
    #[test]
    fn test_directories_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let paths = KdkPaths::at(temp.path().join("kdk-root"));
        fs::create_dir_all(paths.ssh_dir()).unwrap();
        fs::write(paths.private_key(), "existing").unwrap();

        ensure(&paths).unwrap();
        let mode = fs::metadata(paths.ssh_dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
