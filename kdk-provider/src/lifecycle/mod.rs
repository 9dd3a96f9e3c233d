//! Environment lifecycle management.
//!
//! [`LifecycleController`] decides what to do for each command from the
//! persisted configuration, the container and image state observed from the
//! runtime right now, and the user's answers. Nothing observed is cached
//! between calls.

// Internal imports
use crate::mirror::MirrorBridge;
use crate::{ContainerRuntime, EnvironmentState};
use kdk_config::detector::KEYBASE_TARGET;
use kdk_config::{ConfigStore, EnvironmentConfig};
use kdk_core::error::Result;
use kdk_core::prompt::Prompter;

mod destroy;
mod prune;
mod pull;
mod snapshot;
mod up;


/// Result of [`LifecycleController::up`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpOutcome {
    AlreadyRunning,
    /// An existing stopped container was started again.
    Restarted,
    Created,
    /// No valid answer for a stopped container; nothing was touched.
    Cancelled,
}

impl UpOutcome {
    /// Whether the container came up during this call.
    pub fn started(self) -> bool {
        matches!(self, UpOutcome::Restarted | UpOutcome::Created)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    NothingToDestroy,
    Destroyed(usize),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    NothingStale,
    Pruned(usize),
    /// Stopped at the first declined image.
    Cancelled { removed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Pulled,
    AlreadyPresent,
}

/// Drives one environment through the runtime. Built once per invocation.
pub struct LifecycleController<'a> {
    runtime: &'a dyn ContainerRuntime,
    prompter: &'a dyn Prompter,
    store: &'a ConfigStore,
    mirror: Option<&'a dyn MirrorBridge>,
}

impl<'a> LifecycleController<'a> {
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        prompter: &'a dyn Prompter,
        store: &'a ConfigStore,
    ) -> Self {
        Self {
            runtime,
            prompter,
            store,
            mirror: None,
        }
    }

    /// Attach the host mirror that must run before containers mounting it are created.
    pub fn with_mirror(mut self, mirror: &'a dyn MirrorBridge) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn runtime(&self) -> &dyn ContainerRuntime {
        self.runtime
    }

    /// Observe the environment's container state.
    pub fn state(&self, cfg: &EnvironmentConfig) -> Result<EnvironmentState> {
        let containers = self.runtime.list_containers(true)?;
        Ok(EnvironmentState::from_containers(cfg.name(), &containers))
    }

    pub fn is_running(&self, cfg: &EnvironmentConfig) -> Result<bool> {
        Ok(matches!(self.state(cfg)?, EnvironmentState::Running(_)))
    }

    /// Bring the environment up if needed: pull a missing image, start or
    /// create the container and provision the user.
    pub fn ensure_running(&self, cfg: &EnvironmentConfig) -> Result<bool> {
        if self.is_running(cfg)? {
            return Ok(true);
        }

        self.pull(cfg, false)?;
        if self.up(cfg)?.started() {
            self.provision(cfg)?;
        }
        self.is_running(cfg)
    }

    fn mirror_for(&self, cfg: &EnvironmentConfig) -> Option<&'a dyn MirrorBridge> {
        let mounts_keybase = cfg
            .host_config
            .mounts
            .iter()
            .any(|m| m.target == KEYBASE_TARGET);
        self.mirror.filter(|_| mounts_keybase)
    }
}
