// Docker runtime backed by the `docker` CLI

pub mod command;

pub use command::{create_args, DockerCommand};

// External crates
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

// Internal imports
use crate::{ContainerInfo, ContainerRuntime, ContainerState, ImageInfo};
use kdk_config::{ContainerSpec, HostSpec};
use kdk_core::command_stream::{require_tool, stream_command_visible};
use kdk_core::error::{KdkError, Result};

/// Verify the CLI is installed and the daemon answers.
pub fn validate_docker_environment() -> Result<()> {
    require_tool("docker")?;

    let output = DockerCommand::new().subcommand("info").execute_raw()?;
    if output.status.success() {
        return Ok(());
    }
    match command::classify_failure(&String::from_utf8_lossy(&output.stderr)) {
        KdkError::Provider(_) => Err(KdkError::DockerNotRunning),
        other => Err(other),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerInspect {
    id: String,
    name: String,
    state: ContainerInspectState,
    image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerInspectState {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageInspect {
    id: String,
    #[serde(default)]
    repo_tags: Option<Vec<String>>,
    #[serde(default)]
    config: Option<ImageInspectConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageInspectConfig {
    #[serde(default)]
    labels: Option<IndexMap<String, String>>,
}

impl From<ContainerInspect> for ContainerInfo {
    fn from(c: ContainerInspect) -> Self {
        ContainerInfo {
            id: c.id,
            names: vec![c.name],
            state: ContainerState::parse(&c.state.status),
            image_id: c.image,
        }
    }
}

impl From<ImageInspect> for ImageInfo {
    fn from(i: ImageInspect) -> Self {
        ImageInfo {
            id: i.id,
            repo_tags: i.repo_tags.unwrap_or_default(),
            labels: i.config.and_then(|c| c.labels).unwrap_or_default(),
        }
    }
}

fn unique_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn parse_container_inspect(json: &str) -> Result<Vec<ContainerInfo>> {
    let parsed: Vec<ContainerInspect> = serde_json::from_str(json)?;
    Ok(parsed.into_iter().map(Into::into).collect())
}

fn parse_image_inspect(json: &str) -> Result<Vec<ImageInfo>> {
    let parsed: Vec<ImageInspect> = serde_json::from_str(json)?;
    Ok(parsed.into_iter().map(Into::into).collect())
}

/// Run an inspect command, tolerating objects that vanished since listing.
fn inspect(subcommand: &[&str], ids: &[String]) -> Result<String> {
    let output = DockerCommand::new()
        .args(subcommand.iter().copied())
        .args(ids.iter().cloned())
        .execute_raw()?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if output.status.success() || stdout.trim_start().starts_with('[') {
        Ok(stdout)
    } else {
        Err(command::classify_failure(&String::from_utf8_lossy(
            &output.stderr,
        )))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DockerRuntime;

impl DockerRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl ContainerRuntime for DockerRuntime {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn list_containers(&self, all: bool) -> Result<Vec<ContainerInfo>> {
        let mut ps = DockerCommand::new().subcommand("ps");
        if all {
            ps = ps.arg("-a");
        }
        let ids = unique_ids(&ps.args(["-q", "--no-trunc"]).execute_with_output()?);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        parse_container_inspect(&inspect(&["inspect"], &ids)?)
    }

    fn create_container(
        &self,
        name: &str,
        container: &ContainerSpec,
        host: &HostSpec,
    ) -> Result<String> {
        info!("Creating container {} from {}", name, container.image);
        let id = DockerCommand::new()
            .subcommand("create")
            .args(create_args(name, container, host))
            .execute_with_output()?;
        Ok(id.trim().to_string())
    }

    fn start_container(&self, id: &str) -> Result<()> {
        debug!("Starting container {}", id);
        DockerCommand::new()
            .subcommand("start")
            .arg(id)
            .execute_with_output()
            .map(|_| ())
    }

    fn remove_container(&self, id: &str, force: bool) -> Result<()> {
        let mut rm = DockerCommand::new().subcommand("rm");
        if force {
            rm = rm.arg("-f");
        }
        rm.arg(id).execute_with_output().map(|_| ())
    }

    fn commit_container(&self, container: &str, reference: &str) -> Result<String> {
        let id = DockerCommand::new()
            .subcommand("commit")
            .args([container, reference])
            .execute_with_output()?;
        Ok(id.trim().to_string())
    }

    fn exec(&self, container: &str, cmd: &[String]) -> Result<()> {
        DockerCommand::new()
            .subcommand("exec")
            .arg(container)
            .args(cmd.iter().cloned())
            .execute()
    }

    fn list_images(&self) -> Result<Vec<ImageInfo>> {
        let ids = unique_ids(
            &DockerCommand::new()
                .subcommand("images")
                .args(["-q", "--no-trunc"])
                .execute_with_output()?,
        );
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        parse_image_inspect(&inspect(&["image", "inspect"], &ids)?)
    }

    fn pull_image(&self, reference: &str) -> Result<()> {
        info!("Pulling image {}", reference);
        stream_command_visible("docker", &["pull", reference])
    }

    fn remove_image(&self, id: &str, force: bool) -> Result<()> {
        let mut rmi = DockerCommand::new().subcommand("rmi");
        if force {
            rmi = rmi.arg("-f");
        }
        rmi.arg(id).execute_with_output().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_dedupes_and_skips_blanks() {
        let raw = "sha256:aaa\n\nsha256:bbb\nsha256:aaa\n";
        assert_eq!(unique_ids(raw), vec!["sha256:aaa", "sha256:bbb"]);
    }

    #[test]
    fn test_parse_container_inspect() {
        let json = r#"[{
            "Id": "0123456789abcdef",
            "Name": "/kdk",
            "State": {"Status": "exited", "ExitCode": 0},
            "Image": "sha256:feed",
            "Config": {"Hostname": "kdk"}
        }]"#;
        let containers = parse_container_inspect(json).unwrap();
        assert_eq!(containers.len(), 1);
        assert!(containers[0].has_name("kdk"));
        assert_eq!(containers[0].state, ContainerState::Exited);
        assert_eq!(containers[0].image_id, "sha256:feed");
        assert_eq!(containers[0].short_id(), "0123456789ab");
    }

    #[test]
    fn test_parse_image_inspect_with_null_fields() {
        let json = r#"[
            {"Id": "sha256:one", "RepoTags": ["ciscosso/kdk:debian-latest", "ciscosso/kdk:v1.2.0"],
             "Config": {"Labels": {"kdk": "v1.2.0"}}},
            {"Id": "sha256:two", "RepoTags": null, "Config": {"Labels": null}}
        ]"#;
        let images = parse_image_inspect(json).unwrap();
        assert!(images[0].is_kdk_owned());
        assert!(images[0].has_reference("ciscosso/kdk:v1.2.0"));
        assert_eq!(images[0].tags().collect::<Vec<_>>(), vec!["debian-latest", "v1.2.0"]);
        assert!(!images[1].is_kdk_owned());
        assert!(images[1].repo_tags.is_empty());
    }
}
