//! Snapshots and snapshot-based restart
use super::LifecycleController;
use crate::snapshot::SnapshotName;
use crate::EnvironmentState;
use kdk_config::{EnvironmentConfig, OverwritePolicy};
use kdk_core::error::{KdkError, Result};
use kdk_core::kdk_println;
use kdk_messages::{msg, MESSAGES};
use tracing::info;

impl<'a> LifecycleController<'a> {
    /// Commit the environment's container to a timestamped tag of its repository.
    pub fn snapshot(&self, cfg: &EnvironmentConfig, username: &str) -> Result<SnapshotName> {
        let name = cfg.name();
        let container = match self.state(cfg)? {
            EnvironmentState::Running(c)
            | EnvironmentState::Unavailable(c)
            | EnvironmentState::Exited(c) => c,
            EnvironmentState::Absent => {
                return Err(KdkError::Provider(format!(
                    "No container named '{}' to snapshot",
                    name
                )))
            }
        };

        kdk_println!("{}", msg!(MESSAGES.env.snapshot_progress, name = name));
        let snapshot = SnapshotName::now(&cfg.app_config.image_repository, username, name);
        let image_id = self
            .runtime
            .commit_container(&container.id, &snapshot.reference())?;
        info!("Committed {} to {} ({})", container.short_id(), snapshot, image_id);
        kdk_println!("{}", msg!(MESSAGES.env.snapshot_success, snapshot = &snapshot));
        Ok(snapshot)
    }

    /// Recreate the container from a fresh snapshot of itself.
    ///
    /// The configuration is switched to the snapshot tag and saved before the
    /// new container is brought up. A failed commit leaves everything in place.
    pub fn restart(&self, cfg: &mut EnvironmentConfig, username: &str) -> Result<bool> {
        let snapshot = self.snapshot(cfg, username)?;

        kdk_println!(
            "{}",
            msg!(MESSAGES.env.restart_progress, name = cfg.name(), snapshot = &snapshot)
        );
        self.destroy(cfg, true)?;

        cfg.retag(&snapshot.tag);
        self.store.save(cfg, OverwritePolicy::Always, self.prompter)?;
        info!("Environment '{}' now uses {}", cfg.name(), cfg.image_coordinates());

        let running = self.ensure_running(cfg)?;
        if running {
            kdk_println!(
                "{}",
                msg!(MESSAGES.env.restart_success, name = cfg.name(), snapshot = &snapshot)
            );
        }
        Ok(running)
    }
}
