//! Image pulls and in-container provisioning
use super::{LifecycleController, PullOutcome};
use kdk_config::EnvironmentConfig;
use kdk_core::error::Result;
use kdk_core::kdk_println;
use kdk_messages::{msg, MESSAGES};
use tracing::info;

/// Creates the user account inside a fresh container.
pub const PROVISION_COMMAND: &str = "/usr/local/bin/provision-user";

impl<'a> LifecycleController<'a> {
    /// Pull the configured image unless a KDK image already carries the reference.
    pub fn pull(&self, cfg: &EnvironmentConfig, force: bool) -> Result<PullOutcome> {
        let reference = cfg.image_coordinates();
        let present = self
            .runtime
            .list_images()?
            .iter()
            .any(|i| i.is_kdk_owned() && i.has_reference(&reference));

        if present && !force {
            info!("Image {} already present", reference);
            kdk_println!("{}", msg!(MESSAGES.env.pull_already_present, image = &reference));
            return Ok(PullOutcome::AlreadyPresent);
        }

        kdk_println!("{}", msg!(MESSAGES.env.pull_progress, image = &reference));
        self.runtime.pull_image(&reference)?;
        kdk_println!("{}", msg!(MESSAGES.env.pull_success, image = &reference));
        Ok(PullOutcome::Pulled)
    }

    pub fn provision(&self, cfg: &EnvironmentConfig) -> Result<()> {
        kdk_println!("{}", msg!(MESSAGES.env.provision_progress, name = cfg.name()));
        self.runtime
            .exec(cfg.name(), &[PROVISION_COMMAND.to_string()])
    }
}
