//! Removing stale KDK images
use std::collections::HashSet;

use super::{LifecycleController, PruneOutcome};
use crate::ImageInfo;
use kdk_core::error::Result;
use kdk_core::kdk_println;
use kdk_core::prompt::{confirm, Confirmation};
use kdk_messages::{msg, MESSAGES};
use tracing::{debug, info};

impl<'a> LifecycleController<'a> {
    /// KDK-owned images that no running container uses.
    pub fn stale_images(&self) -> Result<Vec<ImageInfo>> {
        let in_use: HashSet<String> = self
            .runtime
            .list_containers(true)?
            .into_iter()
            .filter(|c| c.is_running())
            .map(|c| c.image_id)
            .collect();
        debug!("{} image(s) back running containers", in_use.len());

        Ok(self
            .runtime
            .list_images()?
            .into_iter()
            .filter(|i| i.is_kdk_owned() && !in_use.contains(&i.id))
            .collect())
    }

    /// Remove stale images one confirmation at a time; the first decline stops.
    pub fn prune(&self) -> Result<PruneOutcome> {
        let stale = self.stale_images()?;
        if stale.is_empty() {
            kdk_println!("{}", MESSAGES.env.prune_none);
            return Ok(PruneOutcome::NothingStale);
        }

        let mut removed = 0;
        for image in &stale {
            let tags = if image.repo_tags.is_empty() {
                "<none>".to_string()
            } else {
                image.repo_tags.join(", ")
            };
            let question = msg!(
                MESSAGES.env.prune_confirm,
                image = image.short_id(),
                tags = tags
            );
            if confirm(self.prompter, &question)? == Confirmation::Declined {
                kdk_println!("{}", msg!(MESSAGES.env.prune_cancelled, count = removed));
                return Ok(PruneOutcome::Cancelled { removed });
            }
            self.runtime.remove_image(&image.id, true)?;
            info!("Removed stale image {}", image.id);
            removed += 1;
        }

        kdk_println!("{}", msg!(MESSAGES.env.prune_success, count = removed));
        Ok(PruneOutcome::Pruned(removed))
    }
}
