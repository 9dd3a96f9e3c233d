// Common test utilities and fixtures
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated config root with a pre-made keypair so `ssh-keygen` is never needed.
pub struct KdkFixture {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl KdkFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().join("kdk-root");
        let ssh_dir = root.join("ssh");
        fs::create_dir_all(&ssh_dir).expect("create ssh dir");
        fs::write(ssh_dir.join("id_rsa"), "test-private-key").expect("write private key");
        fs::write(ssh_dir.join("id_rsa.pub"), "ssh-rsa AAAA kdk").expect("write public key");

        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join("config.yaml")
    }

    /// `kdk` with logging, the release check and the real config root switched off.
    pub fn kdk(&self) -> Command {
        let mut cmd = Command::cargo_bin("kdk").expect("kdk binary");
        cmd.env("KDK_CONFIG_DIR", &self.root)
            .env("KDK_TEST_MODE", "1")
            .env("KDK_SKIP_UPDATE_CHECK", "1");
        cmd
    }

    /// `kdk init` with every question answered by flags.
    pub fn init(&self, name: &str) -> Command {
        let mut cmd = self.kdk();
        cmd.args([
            "init",
            "--name",
            name,
            "--port",
            "2222",
            "--image-repository",
            "ciscosso/kdk",
            "--image-tag",
            "debian-latest",
            "--dotfiles-repo",
            "https://example.org/dotfiles.git",
            "--shell",
            "/bin/zsh",
            "--socks-port",
            "8000",
        ]);
        cmd
    }
}
