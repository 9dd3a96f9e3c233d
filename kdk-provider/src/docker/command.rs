//! Docker command abstraction and builder utilities.
//!
//! Every call into the `docker` CLI goes through [`DockerCommand`] so errors
//! and debug logging look the same across operations.

use std::process::{Command, Output, Stdio};
use tracing::debug;

use kdk_config::{ContainerSpec, HostSpec};
use kdk_core::error::{KdkError, Result};

/// Builder for Docker commands with fluent interface and consistent error handling.
#[derive(Debug, Clone, Default)]
pub struct DockerCommand {
    subcommand: Option<String>,
    args: Vec<String>,
}

impl DockerCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Docker subcommand (e.g., "ps", "exec", "commit").
    pub fn subcommand<S: Into<String>>(mut self, cmd: S) -> Self {
        self.subcommand = Some(cmd.into());
        self
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full argument vector, subcommand first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        if let Some(sub) = &self.subcommand {
            argv.push(sub.clone());
        }
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Run with the terminal attached; only the exit status matters.
    pub fn execute(self) -> Result<()> {
        let argv = self.argv();
        debug!("Executing: docker {}", argv.join(" "));

        let status = Command::new("docker")
            .args(&argv)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(spawn_error)?;

        if status.success() {
            Ok(())
        } else {
            Err(KdkError::Provider(format!(
                "docker {} failed with status: {}",
                self.subcommand.as_deref().unwrap_or_default(),
                status
            )))
        }
    }

    /// Run and return stdout; stderr becomes the error on failure.
    pub fn execute_with_output(self) -> Result<String> {
        let output = self.execute_raw()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
        }
    }

    /// Run and return the raw output, whatever the exit status.
    pub fn execute_raw(self) -> Result<Output> {
        let argv = self.argv();
        debug!("Executing (captured): docker {}", argv.join(" "));
        Command::new("docker")
            .args(&argv)
            .output()
            .map_err(spawn_error)
    }
}

fn spawn_error(e: std::io::Error) -> KdkError {
    if e.kind() == std::io::ErrorKind::NotFound {
        KdkError::Dependency("docker was not found in PATH".to_string())
    } else {
        KdkError::Provider(format!("Failed to execute docker: {}", e))
    }
}

/// Map well-known daemon failures to their dedicated errors.
pub fn classify_failure(stderr: &str) -> KdkError {
    let lower = stderr.to_lowercase();
    if lower.contains("permission denied") && lower.contains("docker") {
        KdkError::DockerPermission
    } else if lower.contains("cannot connect to the docker daemon")
        || lower.contains("is the docker daemon running")
    {
        KdkError::DockerNotRunning
    } else {
        KdkError::Provider(stderr.trim().to_string())
    }
}

/// Arguments for `docker create` reproducing the stored container and host specs.
pub fn create_args(name: &str, container: &ContainerSpec, host: &HostSpec) -> Vec<String> {
    let mut args = vec!["--name".to_string(), name.to_string()];

    if !container.hostname.is_empty() {
        args.push("--hostname".into());
        args.push(container.hostname.clone());
    }
    if container.tty {
        args.push("--tty".into());
    }
    if host.privileged {
        args.push("--privileged".into());
    }
    for env in &container.env {
        args.push("--env".into());
        args.push(env.clone());
    }
    for port in container.exposed_ports.keys() {
        args.push("--expose".into());
        args.push(port.clone());
    }
    for (container_port, bindings) in &host.port_bindings {
        for binding in bindings {
            let publish = if binding.host_ip.is_empty() {
                format!("{}:{}", binding.host_port, container_port)
            } else {
                format!("{}:{}:{}", binding.host_ip, binding.host_port, container_port)
            };
            args.push("--publish".into());
            args.push(publish);
        }
    }
    for mount in &host.mounts {
        let mut spec = format!(
            "type={},source={},target={}",
            mount.kind.as_str(),
            mount.source,
            mount.target
        );
        if mount.read_only {
            spec.push_str(",readonly");
        }
        args.push("--mount".into());
        args.push(spec);
    }
    // Anonymous volumes not already provided by a mount.
    for target in container.volumes.keys() {
        if !host.mounts.iter().any(|m| &m.target == target) {
            args.push("--volume".into());
            args.push(target.clone());
        }
    }
    for (key, value) in &container.labels {
        args.push("--label".into());
        args.push(format!("{}={}", key, value));
    }

    args.push(container.image.clone());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdk_config::{AppConfig, EnvironmentConfig, MountSpec};

    #[test]
    fn test_docker_command_chaining() {
        let cmd = DockerCommand::new()
            .subcommand("exec")
            .arg("kdk")
            .args(["echo", "hello"]);
        assert_eq!(cmd.argv(), vec!["exec", "kdk", "echo", "hello"]);
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?"),
            KdkError::DockerNotRunning
        ));
        assert!(matches!(
            classify_failure("Got permission denied while trying to connect to the Docker daemon socket"),
            KdkError::DockerPermission
        ));
        assert!(matches!(
            classify_failure("No such container: kdk"),
            KdkError::Provider(_)
        ));
    }

    #[test]
    fn test_create_args_from_config() {
        let cfg = EnvironmentConfig::build(
            AppConfig {
                name: "kdk".into(),
                port: "2022".into(),
                image_repository: "ciscosso/kdk".into(),
                image_tag: "debian-latest".into(),
                dotfiles_repo: "https://example.org/dots.git".into(),
                shell: "/bin/bash".into(),
                socks_port: None,
            },
            "dev",
            vec![MountSpec::bind("/home/dev/.kdk/ssh/id_rsa.pub", "/tmp/id_rsa.pub", true)],
        );

        let args = create_args("kdk", &cfg.container_config, &cfg.host_config);
        let joined = args.join(" ");

        assert_eq!(&args[..2], &["--name", "kdk"]);
        assert!(joined.contains("--privileged"));
        assert!(joined.contains("--tty"));
        assert!(joined.contains("--publish 2022:2022/tcp"));
        assert!(joined.contains("--expose 2022/tcp"));
        assert!(joined.contains(
            "--mount type=bind,source=/home/dev/.kdk/ssh/id_rsa.pub,target=/tmp/id_rsa.pub,readonly"
        ));
        assert!(joined.contains("--env KDK_USERNAME=dev"));
        assert!(joined.contains(&format!("--label kdk={}", kdk_core::KDK_VERSION)));
        // The mount already provides this target.
        assert!(!joined.contains("--volume"));
        assert_eq!(args.last().map(String::as_str), Some("ciscosso/kdk:debian-latest"));
    }
}
