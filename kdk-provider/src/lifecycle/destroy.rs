//! Removing an environment's container
use super::{DestroyOutcome, LifecycleController};
use kdk_config::EnvironmentConfig;
use kdk_core::error::Result;
use kdk_core::kdk_println;
use kdk_core::prompt::{confirm, Confirmation};
use kdk_messages::{msg, MESSAGES};
use tracing::info;

impl<'a> LifecycleController<'a> {
    /// Remove every container named exactly like the environment.
    ///
    /// All matches are confirmed before anything is removed; one decline
    /// cancels the whole batch.
    pub fn destroy(&self, cfg: &EnvironmentConfig, skip_confirm: bool) -> Result<DestroyOutcome> {
        let name = cfg.name();
        let matches: Vec<_> = self
            .runtime
            .list_containers(true)?
            .into_iter()
            .filter(|c| c.has_name(name))
            .collect();

        if matches.is_empty() {
            kdk_println!("{}", msg!(MESSAGES.env.destroy_none, name = name));
            return Ok(DestroyOutcome::NothingToDestroy);
        }

        if !skip_confirm {
            for container in &matches {
                let question = msg!(
                    MESSAGES.env.destroy_confirm,
                    container = container.short_id(),
                    names = container.names.join(", "),
                    state = container.state.as_str()
                );
                if confirm(self.prompter, &question)? == Confirmation::Declined {
                    info!("Destroy of '{}' declined at {}", name, container.short_id());
                    kdk_println!("{}", MESSAGES.env.destroy_cancelled);
                    return Ok(DestroyOutcome::Cancelled);
                }
            }
        }

        for container in &matches {
            kdk_println!(
                "{}",
                msg!(MESSAGES.env.destroy_progress, container = container.short_id())
            );
            self.runtime.remove_container(&container.id, true)?;
            info!("Removed container {}", container.id);
        }

        kdk_println!("{}", MESSAGES.env.destroy_success);
        Ok(DestroyOutcome::Destroyed(matches.len()))
    }
}
