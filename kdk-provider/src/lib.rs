//! Container runtime abstraction and environment lifecycle.
//!
//! The runtime is consumed through the narrow [`ContainerRuntime`] trait so
//! the lifecycle logic can be exercised against an in-memory fake. The
//! Docker implementation drives the `docker` CLI.

// External crates
use indexmap::IndexMap;
use kdk_core::error::Result;

// Internal imports
use kdk_config::{ContainerSpec, HostSpec};
use kdk_core::KDK_LABEL;

pub mod lifecycle;
pub mod mirror;
pub mod snapshot;

#[cfg(feature = "docker")]
pub mod docker;

// When the `test-helpers` feature is enabled, include the fake runtime.
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use lifecycle::{
    DestroyOutcome, LifecycleController, PruneOutcome, PullOutcome, UpOutcome,
};
pub use mirror::{KeybaseMirror, MirrorBridge};
pub use snapshot::SnapshotName;

/// Runtime-reported container state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Exited,
    Created,
    Paused,
    Restarting,
    Dead,
    Other(String),
}

impl ContainerState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            "created" => ContainerState::Created,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "dead" => ContainerState::Dead,
            other => ContainerState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Exited => "exited",
            ContainerState::Created => "created",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Dead => "dead",
            ContainerState::Other(s) => s.as_str(),
        }
    }
}

/// One container as observed from the runtime. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    /// Runtime form, e.g. `/kdk`.
    pub names: Vec<String>,
    pub state: ContainerState,
    pub image_id: String,
}

impl ContainerInfo {
    /// Exact match on `/name` or `name`.
    pub fn has_name(&self, name: &str) -> bool {
        self.names
            .iter()
            .any(|n| n.strip_prefix('/').unwrap_or(n) == name)
    }

    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }

    /// Paused or restarting; `docker start` cannot bring these back.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self.state,
            ContainerState::Paused | ContainerState::Restarting
        )
    }

    pub fn short_id(&self) -> &str {
        let id = self.id.strip_prefix("sha256:").unwrap_or(&self.id);
        &id[..id.len().min(12)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInfo {
    pub id: String,
    /// Full references, e.g. `ciscosso/kdk:debian-latest`.
    pub repo_tags: Vec<String>,
    pub labels: IndexMap<String, String>,
}

impl ImageInfo {
    /// Images created or pulled for KDK carry the `kdk` label.
    pub fn is_kdk_owned(&self) -> bool {
        self.labels.contains_key(KDK_LABEL)
    }

    pub fn has_reference(&self, reference: &str) -> bool {
        self.repo_tags.iter().any(|t| t == reference)
    }

    /// Tag parts of every reference.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.repo_tags.iter().filter_map(|r| split_reference(r).1)
    }

    pub fn short_id(&self) -> &str {
        let id = self.id.strip_prefix("sha256:").unwrap_or(&self.id);
        &id[..id.len().min(12)]
    }
}

/// Split `repo[:tag]`, ignoring a registry port such as `host:5000/repo`.
pub fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.rfind(':') {
        Some(idx) if !reference[idx + 1..].contains('/') => {
            (&reference[..idx], Some(&reference[idx + 1..]))
        }
        _ => (reference, None),
    }
}

/// Derived state of a named environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentState {
    /// No container with the exact name.
    Absent,
    Running(ContainerInfo),
    /// Paused or restarting.
    Unavailable(ContainerInfo),
    /// Present in any other state.
    Exited(ContainerInfo),
}

impl EnvironmentState {
    /// Derive the state of `name` from a container listing.
    pub fn from_containers(name: &str, containers: &[ContainerInfo]) -> Self {
        let mut stopped = None;
        for container in containers.iter().filter(|c| c.has_name(name)) {
            if container.is_running() {
                return EnvironmentState::Running(container.clone());
            }
            if stopped.is_none() {
                stopped = Some(container.clone());
            }
        }
        match stopped {
            Some(c) if c.is_unavailable() => EnvironmentState::Unavailable(c),
            Some(c) => EnvironmentState::Exited(c),
            None => EnvironmentState::Absent,
        }
    }
}

/// The operations KDK needs from a container runtime.
pub trait ContainerRuntime {
    /// Get the name of the runtime (e.g., "docker").
    fn name(&self) -> &'static str;

    /// List containers; `all` includes stopped ones.
    fn list_containers(&self, all: bool) -> Result<Vec<ContainerInfo>>;

    /// Create (but do not start) a container; returns its id.
    fn create_container(&self, name: &str, container: &ContainerSpec, host: &HostSpec)
        -> Result<String>;

    fn start_container(&self, id: &str) -> Result<()>;

    fn remove_container(&self, id: &str, force: bool) -> Result<()>;

    /// Commit a container to an image reference; returns the new image id.
    fn commit_container(&self, container: &str, reference: &str) -> Result<String>;

    /// Run a command inside a running container.
    fn exec(&self, container: &str, cmd: &[String]) -> Result<()>;

    fn list_images(&self) -> Result<Vec<ImageInfo>>;

    /// Pull an image, streaming progress. May block for a long time.
    fn pull_image(&self, reference: &str) -> Result<()>;

    fn remove_image(&self, id: &str, force: bool) -> Result<()>;
}
