//! SSH access to a running KDK.
//!
//! The container runs sshd on 2022/tcp, published on localhost at the
//! configured port. Host keys change whenever the container is recreated, so
//! host key checking is disabled.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use kdk_config::EnvironmentConfig;
use kdk_core::command_stream::require_tool;
use kdk_core::error::{KdkError, Result};
use kdk_core::user_paths::KdkPaths;

/// Options shared by `ssh` and `scp`.
const SSH_OPTIONS: [&str; 4] = [
    "-o",
    "StrictHostKeyChecking=no",
    "-o",
    "UserKnownHostsFile=/dev/null",
];

#[derive(Debug, Clone)]
pub struct SshSession {
    user: String,
    port: String,
    key: PathBuf,
    socks_port: Option<String>,
}

impl SshSession {
    pub fn new(cfg: &EnvironmentConfig, paths: &KdkPaths, username: &str) -> Self {
        Self {
            user: username.to_string(),
            port: cfg.port().to_string(),
            key: paths.private_key(),
            socks_port: cfg.app_config.socks_port().map(str::to_string),
        }
    }

    fn destination(&self) -> String {
        format!("{}@localhost", self.user)
    }

    /// Arguments for an interactive login, or a remote command when `remote` is set.
    pub fn ssh_args(&self, remote: Option<&str>) -> Vec<String> {
        let mut args = vec![
            self.destination(),
            "-A".to_string(),
            "-p".to_string(),
            self.port.clone(),
            "-i".to_string(),
            self.key.to_string_lossy().to_string(),
        ];
        args.extend(SSH_OPTIONS.iter().map(|s| s.to_string()));
        if let Some(socks) = &self.socks_port {
            args.push("-D".to_string());
            args.push(socks.clone());
        }
        if let Some(remote) = remote {
            args.push(remote.to_string());
        }
        args
    }

    pub fn scp_args(&self, local: &str, remote: &str) -> Vec<String> {
        let mut args = vec![
            "-P".to_string(),
            self.port.clone(),
            "-i".to_string(),
            self.key.to_string_lossy().to_string(),
        ];
        args.extend(SSH_OPTIONS.iter().map(|s| s.to_string()));
        args.push(local.to_string());
        args.push(format!("{}:{}", self.destination(), remote));
        args
    }

    /// Hand the terminal to an interactive SSH session until it exits.
    pub fn connect(&self) -> Result<()> {
        info!("Opening SSH session on port {}", self.port);
        run_attached("ssh", &self.ssh_args(None))
    }

    pub fn exec(&self, remote: &str) -> Result<()> {
        info!("Running remote command: {}", remote);
        run_attached("ssh", &self.ssh_args(Some(remote)))
    }

    pub fn scp_to(&self, local: &str, remote: &str) -> Result<()> {
        info!("Copying {} to {}", local, remote);
        run_attached("scp", &self.scp_args(local, remote))
    }
}

fn run_attached(program: &str, args: &[String]) -> Result<()> {
    require_tool(program)?;
    debug!("Executing: {} {}", program, args.join(" "));

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| KdkError::Command(format!("Failed to start {}: {}", program, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(KdkError::Command(format!("{} exited with {}", program, status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdk_config::AppConfig;

    fn session(socks_port: Option<&str>) -> SshSession {
        let cfg = EnvironmentConfig::build(
            AppConfig {
                name: "kdk".into(),
                port: "2222".into(),
                image_repository: "ciscosso/kdk".into(),
                image_tag: "debian-latest".into(),
                dotfiles_repo: "https://example.org/dots.git".into(),
                shell: "/bin/bash".into(),
                socks_port: socks_port.map(String::from),
            },
            "dev",
            Vec::new(),
        );
        SshSession::new(&cfg, &KdkPaths::at("/home/dev/.kdk"), "dev")
    }

    #[test]
    fn test_interactive_args() {
        assert_eq!(
            session(None).ssh_args(None).join(" "),
            "dev@localhost -A -p 2222 -i /home/dev/.kdk/ssh/id_rsa \
             -o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null"
        );
    }

    #[test]
    fn test_socks_forwarding() {
        let args = session(Some("8000")).ssh_args(None);
        assert_eq!(&args[args.len() - 2..], &["-D", "8000"]);
        // Older configs stored an empty port for "disabled".
        assert!(!session(Some("")).ssh_args(None).contains(&"-D".to_string()));
    }

    #[test]
    fn test_remote_command_is_last() {
        let args = session(None).ssh_args(Some("mkdir -p ~/.kube"));
        assert_eq!(args.last().map(String::as_str), Some("mkdir -p ~/.kube"));
    }

    #[test]
    fn test_scp_uses_uppercase_port_flag() {
        let args = session(None).scp_args("/home/dev/.kube/config", ".kube/docker-for-desktop.example.org");
        assert_eq!(&args[..2], &["-P", "2222"]);
        assert_eq!(
            args.last().map(String::as_str),
            Some("dev@localhost:.kube/docker-for-desktop.example.org")
        );
    }
}
