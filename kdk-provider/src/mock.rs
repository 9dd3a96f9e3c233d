//! In-memory container runtime for exercising the lifecycle without Docker.

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::{ContainerInfo, ContainerRuntime, ContainerState, ImageInfo};
use kdk_config::{ContainerSpec, HostSpec};
use kdk_core::error::{KdkError, Result};
use kdk_core::KDK_LABEL;

/// Runtime operation, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeOp {
    ListContainers,
    CreateContainer,
    StartContainer,
    RemoveContainer,
    CommitContainer,
    Exec,
    ListImages,
    PullImage,
    RemoveImage,
}

/// Every call the fake receives, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    ListContainers { all: bool },
    CreateContainer { name: String, image: String },
    StartContainer { id: String },
    RemoveContainer { id: String, force: bool },
    CommitContainer { container: String, reference: String },
    Exec { container: String, cmd: Vec<String> },
    ListImages,
    PullImage { reference: String },
    RemoveImage { id: String, force: bool },
}

impl RuntimeCall {
    /// Calls that change runtime state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            RuntimeCall::ListContainers { .. } | RuntimeCall::ListImages
        )
    }
}

#[derive(Debug, Default)]
struct FakeState {
    containers: Vec<ContainerInfo>,
    images: Vec<ImageInfo>,
    calls: Vec<RuntimeCall>,
    failures: Vec<RuntimeOp>,
    next_id: usize,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn check(&self, op: RuntimeOp) -> Result<()> {
        if self.failures.contains(&op) {
            Err(KdkError::Provider(format!("injected failure: {:?}", op)))
        } else {
            Ok(())
        }
    }

    fn container_mut(&mut self, id_or_name: &str) -> Result<&mut ContainerInfo> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id_or_name || c.has_name(id_or_name))
            .ok_or_else(|| KdkError::Provider(format!("No such container: {}", id_or_name)))
    }
}

#[derive(Debug, Default)]
pub struct FakeRuntime {
    state: RefCell<FakeState>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, name: &str, state: ContainerState, image_id: &str) -> Self {
        {
            let mut s = self.state.borrow_mut();
            let id = s.next_id("fake-container");
            s.containers.push(ContainerInfo {
                id,
                names: vec![format!("/{}", name)],
                state,
                image_id: image_id.to_string(),
            });
        }
        self
    }

    /// Add an image; `labeled` marks it as KDK-owned.
    pub fn with_image(self, id: &str, tags: &[&str], labeled: bool) -> Self {
        let mut labels = IndexMap::new();
        if labeled {
            labels.insert(KDK_LABEL.to_string(), kdk_core::KDK_VERSION.to_string());
        }
        self.state.borrow_mut().images.push(ImageInfo {
            id: id.to_string(),
            repo_tags: tags.iter().map(|t| t.to_string()).collect(),
            labels,
        });
        self
    }

    pub fn fail_on(self, op: RuntimeOp) -> Self {
        self.state.borrow_mut().failures.push(op);
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state.borrow().calls.clone()
    }

    pub fn mutations(&self) -> Vec<RuntimeCall> {
        self.calls().into_iter().filter(|c| c.is_mutation()).collect()
    }

    pub fn containers(&self) -> Vec<ContainerInfo> {
        self.state.borrow().containers.clone()
    }

    pub fn images(&self) -> Vec<ImageInfo> {
        self.state.borrow().images.clone()
    }

    fn record(&self, call: RuntimeCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl ContainerRuntime for FakeRuntime {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn list_containers(&self, all: bool) -> Result<Vec<ContainerInfo>> {
        self.record(RuntimeCall::ListContainers { all });
        let s = self.state.borrow();
        s.check(RuntimeOp::ListContainers)?;
        Ok(s.containers
            .iter()
            .filter(|c| all || c.is_running())
            .cloned()
            .collect())
    }

    fn create_container(
        &self,
        name: &str,
        container: &ContainerSpec,
        _host: &HostSpec,
    ) -> Result<String> {
        self.record(RuntimeCall::CreateContainer {
            name: name.to_string(),
            image: container.image.clone(),
        });
        let mut s = self.state.borrow_mut();
        s.check(RuntimeOp::CreateContainer)?;
        if s.containers.iter().any(|c| c.has_name(name)) {
            return Err(KdkError::Provider(format!(
                "Conflict. The container name \"/{}\" is already in use",
                name
            )));
        }
        let image_id = s
            .images
            .iter()
            .find(|i| i.has_reference(&container.image))
            .map(|i| i.id.clone())
            .unwrap_or_else(|| container.image.clone());
        let id = s.next_id("fake-container");
        s.containers.push(ContainerInfo {
            id: id.clone(),
            names: vec![format!("/{}", name)],
            state: ContainerState::Created,
            image_id,
        });
        Ok(id)
    }

    fn start_container(&self, id: &str) -> Result<()> {
        self.record(RuntimeCall::StartContainer { id: id.to_string() });
        let mut s = self.state.borrow_mut();
        s.check(RuntimeOp::StartContainer)?;
        s.container_mut(id)?.state = ContainerState::Running;
        Ok(())
    }

    fn remove_container(&self, id: &str, force: bool) -> Result<()> {
        self.record(RuntimeCall::RemoveContainer {
            id: id.to_string(),
            force,
        });
        let mut s = self.state.borrow_mut();
        s.check(RuntimeOp::RemoveContainer)?;
        if s.container_mut(id)?.is_running() && !force {
            return Err(KdkError::Provider(format!(
                "You cannot remove a running container {}",
                id
            )));
        }
        s.containers.retain(|c| c.id != id && !c.has_name(id));
        Ok(())
    }

    fn commit_container(&self, container: &str, reference: &str) -> Result<String> {
        self.record(RuntimeCall::CommitContainer {
            container: container.to_string(),
            reference: reference.to_string(),
        });
        let mut s = self.state.borrow_mut();
        s.check(RuntimeOp::CommitContainer)?;
        let source_image = s.container_mut(container)?.image_id.clone();
        let labels = s
            .images
            .iter()
            .find(|i| i.id == source_image)
            .map(|i| i.labels.clone())
            .unwrap_or_default();
        let id = format!("sha256:{}", s.next_id("fake-image"));
        s.images.push(ImageInfo {
            id: id.clone(),
            repo_tags: vec![reference.to_string()],
            labels,
        });
        Ok(id)
    }

    fn exec(&self, container: &str, cmd: &[String]) -> Result<()> {
        self.record(RuntimeCall::Exec {
            container: container.to_string(),
            cmd: cmd.to_vec(),
        });
        let mut s = self.state.borrow_mut();
        s.check(RuntimeOp::Exec)?;
        if !s.container_mut(container)?.is_running() {
            return Err(KdkError::Provider(format!(
                "Container {} is not running",
                container
            )));
        }
        Ok(())
    }

    fn list_images(&self) -> Result<Vec<ImageInfo>> {
        self.record(RuntimeCall::ListImages);
        let s = self.state.borrow();
        s.check(RuntimeOp::ListImages)?;
        Ok(s.images.clone())
    }

    fn pull_image(&self, reference: &str) -> Result<()> {
        self.record(RuntimeCall::PullImage {
            reference: reference.to_string(),
        });
        let mut s = self.state.borrow_mut();
        s.check(RuntimeOp::PullImage)?;
        if s.images.iter().any(|i| i.has_reference(reference)) {
            return Ok(());
        }
        let mut labels = IndexMap::new();
        labels.insert(KDK_LABEL.to_string(), kdk_core::KDK_VERSION.to_string());
        let id = format!("sha256:{}", s.next_id("fake-image"));
        s.images.push(ImageInfo {
            id,
            repo_tags: vec![reference.to_string()],
            labels,
        });
        Ok(())
    }

    fn remove_image(&self, id: &str, force: bool) -> Result<()> {
        self.record(RuntimeCall::RemoveImage {
            id: id.to_string(),
            force,
        });
        let mut s = self.state.borrow_mut();
        s.check(RuntimeOp::RemoveImage)?;
        let before = s.images.len();
        s.images.retain(|i| i.id != id);
        if s.images.len() == before {
            return Err(KdkError::Provider(format!("No such image: {}", id)));
        }
        Ok(())
    }
}
