//! Starting an environment
use super::{LifecycleController, UpOutcome};
use crate::{ContainerInfo, ContainerState, EnvironmentState};
use kdk_config::EnvironmentConfig;
use kdk_core::error::{KdkError, Result};
use kdk_core::kdk_println;
use kdk_core::prompt::{restart_or_delete, Prompt};
use kdk_messages::{msg, MESSAGES};
use tracing::{info, warn};

const EXITED_PROMPT_ATTEMPTS: u32 = 3;

/// What to do with a stopped container.
enum ExitedChoice {
    Restart,
    Delete,
}

impl<'a> LifecycleController<'a> {
    /// Make the environment's container run.
    ///
    /// A stopped container is restarted or deleted and recreated at the
    /// user's choice. A paused or restarting one is left alone and reported.
    /// Partially created containers are not cleaned up on error.
    pub fn up(&self, cfg: &EnvironmentConfig) -> Result<UpOutcome> {
        let name = cfg.name();
        match self.state(cfg)? {
            EnvironmentState::Running(container) => {
                info!("Container {} is already running", container.short_id());
                kdk_println!("{}", msg!(MESSAGES.env.up_already_running, name = name));
                Ok(UpOutcome::AlreadyRunning)
            }
            EnvironmentState::Exited(container) => match self.ask_exited(name)? {
                Some(ExitedChoice::Restart) => {
                    kdk_println!("{}", msg!(MESSAGES.env.up_restarting, name = name));
                    self.runtime.start_container(&container.id)?;
                    info!("Restarted container {}", container.short_id());
                    kdk_println!("{}", msg!(MESSAGES.env.up_restarted, name = name));
                    Ok(UpOutcome::Restarted)
                }
                Some(ExitedChoice::Delete) => {
                    self.delete_stopped(name, &container)?;
                    self.create(cfg)
                }
                None => {
                    warn!("No valid choice for stopped container {}", container.short_id());
                    kdk_println!("{}", msg!(MESSAGES.env.up_cancelled, name = name));
                    Ok(UpOutcome::Cancelled)
                }
            },
            EnvironmentState::Unavailable(container) => {
                warn!(
                    "Container {} is {}; not touching it",
                    container.short_id(),
                    container.state.as_str()
                );
                let hint = match container.state {
                    ContainerState::Paused => format!("run `docker unpause {}`", name),
                    _ => "wait for it to settle".to_string(),
                };
                Err(KdkError::Provider(format!(
                    "Container '{}' is {}; {} or remove it with `kdk destroy --name {}`",
                    name,
                    container.state.as_str(),
                    hint,
                    name
                )))
            }
            EnvironmentState::Absent => self.create(cfg),
        }
    }

    fn ask_exited(&self, name: &str) -> Result<Option<ExitedChoice>> {
        let answer = Prompt::new(msg!(MESSAGES.env.up_exited_prompt, name = name))
            .attempts(EXITED_PROMPT_ATTEMPTS)
            .validator(restart_or_delete)
            .run(self.prompter)?;

        Ok(answer.map(|a| match a.to_ascii_lowercase().as_str() {
            "r" | "restart" => ExitedChoice::Restart,
            _ => ExitedChoice::Delete,
        }))
    }

    fn delete_stopped(&self, name: &str, container: &ContainerInfo) -> Result<()> {
        kdk_println!("{}", msg!(MESSAGES.env.up_deleting, name = name));
        self.runtime.remove_container(&container.id, true)?;
        info!("Removed stopped container {}", container.short_id());
        Ok(())
    }

    fn create(&self, cfg: &EnvironmentConfig) -> Result<UpOutcome> {
        if let Some(mirror) = self.mirror_for(cfg) {
            mirror.ensure_started()?;
        }

        let name = cfg.name();
        let image = &cfg.container_config.image;
        kdk_println!("{}", msg!(MESSAGES.env.up_creating, name = name, image = image));

        let id = self
            .runtime
            .create_container(name, &cfg.container_config, &cfg.host_config)?;
        info!("Created container {} for '{}'", id, name);
        self.runtime.start_container(&id)?;

        kdk_println!(
            "{}",
            msg!(
                MESSAGES.env.up_created,
                name = name,
                image = image,
                port = cfg.host_port().unwrap_or_else(|| cfg.port())
            )
        );
        Ok(UpOutcome::Created)
    }
}
